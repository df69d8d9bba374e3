//! Account service - creation, lookup, deposits and removal.
//!
//! Balance increments are single conditional statements, so concurrent
//! deposits to the same account never lose an update.

use crate::{
    db::{self, DbPool},
    error::AppError,
    models::account::Account,
};

const ACCOUNT_COLUMNS: &str = "id, email, name, balance_cents, created_at";

/// Create an account, or return the one already registered for this email.
///
/// # Idempotency
///
/// Email is the natural key. A second call with the same email returns the
/// stored account unchanged (the supplied name is ignored) instead of failing.
/// The domain part is compared case-insensitively: it is stored lowercased,
/// while the local part is kept as given.
///
/// # Errors
///
/// - `InvalidRequest`: malformed email or blank name
/// - `Database`: Database error occurred
pub async fn create_account(pool: &DbPool, email: &str, name: &str) -> Result<Account, AppError> {
    let email = normalize_email(email.trim())?;
    let name = name.trim();
    if name.is_empty() {
        return Err(AppError::InvalidRequest("Name must not be empty".to_string()));
    }

    let mut tx = db::begin_write(pool).await?;

    let inserted = sqlx::query(
        "INSERT INTO accounts (email, name, balance_cents) VALUES (?, ?, 0) ON CONFLICT(email) DO NOTHING",
    )
    .bind(&email)
    .bind(name)
    .execute(&mut *tx)
    .await?
    .rows_affected();

    let account = sqlx::query_as::<_, Account>(&format!(
        "SELECT {ACCOUNT_COLUMNS} FROM accounts WHERE email = ?"
    ))
    .bind(&email)
    .fetch_one(&mut *tx)
    .await?;

    tx.commit().await?;

    if inserted == 1 {
        tracing::info!(account_id = account.id, "account created");
    } else {
        tracing::debug!(account_id = account.id, "account already exists for email");
    }

    Ok(account)
}

/// Get account by ID.
///
/// # Errors
///
/// - `AccountNotFound`: no account with this id
pub async fn get_account(pool: &DbPool, account_id: i64) -> Result<Account, AppError> {
    sqlx::query_as::<_, Account>(&format!(
        "SELECT {ACCOUNT_COLUMNS} FROM accounts WHERE id = ?"
    ))
    .bind(account_id)
    .fetch_optional(pool)
    .await?
    .ok_or(AppError::AccountNotFound)
}

/// Add money to an account.
///
/// Deposits are unconditional: no business ceiling and no approval step.
///
/// # Errors
///
/// - `InvalidRequest`: Amount is zero or negative
/// - `AccountNotFound`: Account doesn't exist
/// - `InvalidRequest`: the new balance would not fit in an i64
/// - `Database`: Database error occurred
pub async fn deposit(pool: &DbPool, account_id: i64, amount_cents: i64) -> Result<Account, AppError> {
    if amount_cents <= 0 {
        return Err(AppError::InvalidRequest("Amount must be > 0".to_string()));
    }

    // Read-modify-write happens inside one statement. SQLite silently turns an
    // overflowing integer sum into a REAL, so the ceiling is checked here.
    let updated = sqlx::query_as::<_, Account>(&format!(
        "UPDATE accounts SET balance_cents = balance_cents + ? WHERE id = ? AND balance_cents <= ? RETURNING {ACCOUNT_COLUMNS}"
    ))
    .bind(amount_cents)
    .bind(account_id)
    .bind(i64::MAX - amount_cents)
    .fetch_optional(pool)
    .await?;

    let account = match updated {
        Some(account) => account,
        None => {
            ensure_account_exists(pool, account_id).await?;
            return Err(AppError::InvalidRequest(
                "Deposit would overflow the balance".to_string(),
            ));
        }
    };

    tracing::info!(
        account_id,
        amount_cents,
        balance_cents = account.balance_cents,
        "deposit applied"
    );

    Ok(account)
}

/// Delete an account together with its cards and transactions.
///
/// The cascade is performed by the store's foreign keys.
pub async fn delete_account(pool: &DbPool, account_id: i64) -> Result<(), AppError> {
    let deleted = sqlx::query("DELETE FROM accounts WHERE id = ?")
        .bind(account_id)
        .execute(pool)
        .await?
        .rows_affected();

    if deleted == 0 {
        return Err(AppError::AccountNotFound);
    }

    tracing::info!(account_id, "account deleted");
    Ok(())
}

/// Fail with `AccountNotFound` unless the account exists.
pub async fn ensure_account_exists(pool: &DbPool, account_id: i64) -> Result<(), AppError> {
    let exists: bool = sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM accounts WHERE id = ?)")
        .bind(account_id)
        .fetch_one(pool)
        .await?;

    if exists {
        Ok(())
    } else {
        Err(AppError::AccountNotFound)
    }
}

/// Minimal shape check: one `@` with something on both sides, a dot in the
/// domain, and no whitespace.
/// Check the address shape and lowercase its domain.
fn normalize_email(email: &str) -> Result<String, AppError> {
    let invalid = || AppError::InvalidRequest("Invalid email address".to_string());

    if email.chars().any(char::is_whitespace) {
        return Err(invalid());
    }

    let (local, domain) = email.split_once('@').ok_or_else(invalid)?;
    if local.is_empty() || domain.contains('@') {
        return Err(invalid());
    }

    match domain.split_once('.') {
        Some((host, tld)) if !host.is_empty() && !tld.is_empty() && !domain.ends_with('.') => {
            Ok(format!("{local}@{}", domain.to_ascii_lowercase()))
        }
        _ => Err(invalid()),
    }
}
