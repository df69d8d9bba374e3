//! Card issuance and card listing.
//!
//! Card numbers are drawn at random and checked against the cards already
//! stored. This keeps collisions unlikely, not impossible: the search gives up
//! after [`MAX_CARD_NUMBER_ATTEMPTS`] draws, and the `UNIQUE` constraint on
//! `cards.card_number` rejects a number that races in between.

use rand::Rng;
use sqlx::SqliteConnection;

use crate::{
    db::{self, DbPool},
    error::AppError,
    models::card::Card,
    services::account_service,
};

/// How many random card numbers are tried before giving up.
pub const MAX_CARD_NUMBER_ATTEMPTS: usize = 128;

const CARD_NUMBER_DIGITS: usize = 16;

const CARD_COLUMNS: &str = "id, account_id, card_number, last4_digits, token, is_active, created_at";

/// Issue a new active card for an account.
///
/// # Errors
///
/// - `AccountNotFound`: Account doesn't exist
/// - `CardNumberExhausted`: every drawn number was already in use
/// - `Database`: Database error occurred
pub async fn issue_card(pool: &DbPool, account_id: i64) -> Result<Card, AppError> {
    issue_card_with(pool, account_id, generate_card_number).await
}

/// Issue a card, drawing candidate numbers from `next_number`.
async fn issue_card_with<F>(
    pool: &DbPool,
    account_id: i64,
    mut next_number: F,
) -> Result<Card, AppError>
where
    F: FnMut() -> String,
{
    let mut tx = db::begin_write(pool).await?;

    let account_exists: bool =
        sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM accounts WHERE id = ?)")
            .bind(account_id)
            .fetch_one(&mut *tx)
            .await?;
    if !account_exists {
        return Err(AppError::AccountNotFound);
    }

    let card_number = find_unused_card_number(&mut *tx, &mut next_number).await?;
    let last4_digits = last_four(&card_number).to_string();

    let card = sqlx::query_as::<_, Card>(&format!(
        r#"
        INSERT INTO cards (account_id, card_number, last4_digits, token, is_active)
        VALUES (?, ?, ?, ?, 1)
        RETURNING {CARD_COLUMNS}
        "#
    ))
    .bind(account_id)
    .bind(&card_number)
    .bind(&last4_digits)
    .bind(generate_token())
    .fetch_one(&mut *tx)
    .await?;

    tx.commit().await?;

    tracing::info!(
        account_id,
        card_id = card.id,
        last4 = %card.last4_digits,
        "card issued"
    );

    Ok(card)
}

/// List an account's cards, most recently issued first.
pub async fn list_cards(pool: &DbPool, account_id: i64) -> Result<Vec<Card>, AppError> {
    account_service::ensure_account_exists(pool, account_id).await?;

    let cards = sqlx::query_as::<_, Card>(&format!(
        "SELECT {CARD_COLUMNS} FROM cards WHERE account_id = ? ORDER BY id DESC"
    ))
    .bind(account_id)
    .fetch_all(pool)
    .await?;

    Ok(cards)
}

/// Remove a card from an account.
///
/// Transactions made with the card are kept; their `card_id` becomes NULL.
///
/// # Errors
///
/// - `AccountNotFound`: Account doesn't exist
/// - `CardNotFound`: no such card on this account
pub async fn delete_card(pool: &DbPool, account_id: i64, card_id: i64) -> Result<(), AppError> {
    let deleted = sqlx::query("DELETE FROM cards WHERE id = ? AND account_id = ?")
        .bind(card_id)
        .bind(account_id)
        .execute(pool)
        .await?
        .rows_affected();

    if deleted == 0 {
        account_service::ensure_account_exists(pool, account_id).await?;
        return Err(AppError::CardNotFound);
    }

    tracing::info!(account_id, card_id, "card deleted");
    Ok(())
}

/// Draw a uniformly random 16-digit number. Leading zeros are kept.
fn generate_card_number() -> String {
    let mut rng = rand::rng();
    (0..CARD_NUMBER_DIGITS)
        .map(|_| char::from(b'0' + rng.random_range(0..10u8)))
        .collect()
}

/// Trailing four characters, or the whole string when it is shorter.
fn last_four(card_number: &str) -> &str {
    let start = card_number
        .char_indices()
        .rev()
        .nth(3)
        .map_or(0, |(index, _)| index);
    &card_number[start..]
}

/// 16 bytes from the thread-local CSPRNG, hex encoded (32 characters).
fn generate_token() -> String {
    let bytes: [u8; 16] = rand::random();
    hex::encode(bytes)
}

async fn find_unused_card_number<F>(
    conn: &mut SqliteConnection,
    next_number: &mut F,
) -> Result<String, AppError>
where
    F: FnMut() -> String,
{
    for attempt in 1..=MAX_CARD_NUMBER_ATTEMPTS {
        let candidate = next_number();

        let taken: bool =
            sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM cards WHERE card_number = ?)")
                .bind(&candidate)
                .fetch_one(&mut *conn)
                .await?;

        if !taken {
            return Ok(candidate);
        }

        tracing::debug!(attempt, "card number collision, drawing again");
    }

    Err(AppError::CardNumberExhausted)
}
