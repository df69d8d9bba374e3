//! Card HTTP handlers.
//!
//! - POST /accounts/{id}/cards - Issue a card
//! - GET /accounts/{id}/cards - List cards, newest first
//! - DELETE /accounts/{id}/cards/{card_id} - Remove a card

use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};

use crate::db::DbPool;
use crate::error::AppError;
use crate::models::card::CardResponse;
use crate::services::card_service;

/// Issue a new card for the account.
///
/// # Response (200)
///
/// ```json
/// {
///   "id": 3,
///   "account_id": 1,
///   "card_number": "0412883910275501",
///   "last4_digits": "5501",
///   "token": "9f86d081884c7d659a2feaa0c55ad015",
///   "is_active": true,
///   "created_at": "2025-12-21T16:00:00Z"
/// }
/// ```
///
/// Returns 404 if the account does not exist and 500 if no unused card
/// number could be found.
pub async fn issue_card(
    State(pool): State<DbPool>,
    Path(account_id): Path<i64>,
) -> Result<Json<CardResponse>, AppError> {
    let card = card_service::issue_card(&pool, account_id).await?;

    Ok(Json(card.into()))
}

/// List the account's cards, most recently issued first.
pub async fn list_cards(
    State(pool): State<DbPool>,
    Path(account_id): Path<i64>,
) -> Result<Json<Vec<CardResponse>>, AppError> {
    let cards = card_service::list_cards(&pool, account_id).await?;

    Ok(Json(cards.into_iter().map(Into::into).collect()))
}

/// Delete a card.
///
/// Past transactions made with the card stay, with `card_id` set to null.
pub async fn delete_card(
    State(pool): State<DbPool>,
    Path((account_id, card_id)): Path<(i64, i64)>,
) -> Result<StatusCode, AppError> {
    card_service::delete_card(&pool, account_id, card_id).await?;

    Ok(StatusCode::NO_CONTENT)
}
