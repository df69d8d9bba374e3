//! Transaction service - authorizes purchases and records every decision.
//!
//! This service handles:
//! - Request validation (amount, card ownership)
//! - The authorization decision (see [`super::authorization`])
//! - Atomic balance debit together with the transaction row
//!
//! # Atomicity Guarantees
//!
//! The balance debit and the transaction insert share one database
//! transaction: both are committed or neither is. The debit itself is a
//! conditional `UPDATE ... WHERE balance_cents >= amount`, so two concurrent
//! purchases can never overdraw the account. The transaction takes the write
//! lock before reading the balance, so purchases on the same account queue
//! behind each other instead of failing.

use crate::{
    db::{self, DbPool},
    error::AppError,
    models::transaction::Transaction,
    services::{
        account_service,
        authorization::{self, Decision, RejectionReason},
    },
};

const TRANSACTION_COLUMNS: &str = "id, account_id, card_id, amount_cents, merchant, mcc, is_approved, rejection_reason, created_at";

/// Authorize a purchase and record the outcome.
///
/// # Process
///
/// 1. Validate the amount
/// 2. Start a write transaction (`BEGIN IMMEDIATE`)
/// 3. Load the account balance and check the card, if one is given
/// 4. Decide (merchant category first, then funds)
/// 5. Debit the balance when approved
/// 6. Record the transaction, approved or declined
/// 7. Commit (or rollback on error)
///
/// A declined purchase is a successful call: it returns the stored record with
/// `is_approved = false` and a `rejection_reason`.
///
/// # Errors
///
/// Nothing is written when an error is returned.
///
/// - `InvalidRequest`: Amount is zero or negative, or the card is unknown,
///   inactive, or belongs to another account
/// - `AccountNotFound`: Account doesn't exist
/// - `Database`: Database error occurred
pub async fn authorize_and_record(
    pool: &DbPool,
    account_id: i64,
    card_id: Option<i64>,
    merchant: &str,
    mcc: &str,
    amount_cents: i64,
) -> Result<Transaction, AppError> {
    if amount_cents <= 0 {
        return Err(AppError::InvalidRequest("Amount must be > 0".to_string()));
    }

    let mut tx = db::begin_write(pool).await?;

    let balance_cents: i64 = sqlx::query_scalar("SELECT balance_cents FROM accounts WHERE id = ?")
        .bind(account_id)
        .fetch_optional(&mut *tx)
        .await?
        .ok_or(AppError::AccountNotFound)?;

    if let Some(card_id) = card_id {
        let usable: bool = sqlx::query_scalar(
            "SELECT EXISTS(SELECT 1 FROM cards WHERE id = ? AND account_id = ? AND is_active = 1)",
        )
        .bind(card_id)
        .bind(account_id)
        .fetch_one(&mut *tx)
        .await?;

        if !usable {
            return Err(AppError::InvalidRequest(
                "Card not found or inactive".to_string(),
            ));
        }
    }

    let mut decision = authorization::decide(balance_cents, mcc, amount_cents);

    if decision.is_approved() {
        let debited = sqlx::query(
            r#"
            UPDATE accounts
            SET balance_cents = balance_cents - ?
            WHERE id = ? AND balance_cents >= ?
            "#,
        )
        .bind(amount_cents)
        .bind(account_id)
        .bind(amount_cents)
        .execute(&mut *tx)
        .await?
        .rows_affected();

        // The balance moved between the read and the write
        if debited == 0 {
            decision = Decision::Declined(RejectionReason::InsufficientFunds);
        }
    }

    let transaction = sqlx::query_as::<_, Transaction>(&format!(
        r#"
        INSERT INTO transactions (
            account_id,
            card_id,
            amount_cents,
            merchant,
            mcc,
            is_approved,
            rejection_reason
        )
        VALUES (?, ?, ?, ?, ?, ?, ?)
        RETURNING {TRANSACTION_COLUMNS}
        "#
    ))
    .bind(account_id)
    .bind(card_id)
    .bind(amount_cents)
    .bind(merchant)
    .bind(mcc)
    .bind(decision.is_approved())
    .bind(decision.rejection_reason().map(|reason| reason.as_str()))
    .fetch_one(&mut *tx)
    .await?;

    tx.commit().await?;

    match decision {
        Decision::Approved => tracing::info!(
            account_id,
            transaction_id = transaction.id,
            amount_cents,
            mcc,
            "purchase approved"
        ),
        Decision::Declined(reason) => tracing::info!(
            account_id,
            transaction_id = transaction.id,
            amount_cents,
            mcc,
            %reason,
            "purchase declined"
        ),
    }

    Ok(transaction)
}

/// List an account's transactions, most recent first.
pub async fn list_transactions(
    pool: &DbPool,
    account_id: i64,
) -> Result<Vec<Transaction>, AppError> {
    account_service::ensure_account_exists(pool, account_id).await?;

    let transactions = sqlx::query_as::<_, Transaction>(&format!(
        "SELECT {TRANSACTION_COLUMNS} FROM transactions WHERE account_id = ? ORDER BY id DESC"
    ))
    .bind(account_id)
    .fetch_all(pool)
    .await?;

    Ok(transactions)
}
