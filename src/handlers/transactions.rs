//! Transaction HTTP handlers.
//!
//! This module implements transaction-related API endpoints:
//! - POST /accounts/{id}/transactions - Authorize a purchase
//! - GET /accounts/{id}/transactions - Authorization history, newest first

use crate::{
    db::DbPool,
    error::AppError,
    models::transaction::{CreateTransactionRequest, TransactionResponse},
    services::transaction_service,
};
use axum::{
    Json,
    extract::{Path, State},
};

/// Authorize a purchase.
///
/// # Request Body
///
/// ```json
/// {
///   "card_id": 3,
///   "merchant": "Corner Pharmacy",
///   "mcc": "5912",
///   "amount_cents": 1250
/// }
/// ```
///
/// # Response (200)
///
/// Both approved and declined purchases answer 200 with the stored record:
///
/// ```json
/// {
///   "id": 13,
///   "account_id": 1,
///   "card_id": 3,
///   "amount_cents": 1250,
///   "merchant": "Cinema",
///   "mcc": "7832",
///   "is_approved": false,
///   "rejection_reason": "Non-qualified expense",
///   "created_at": "2025-12-21T16:00:00Z"
/// }
/// ```
///
/// # Errors
///
/// - 400: amount is not positive, or the card is unknown, inactive or
///   belongs to another account
/// - 404: account not found
pub async fn create_transaction(
    State(pool): State<DbPool>,
    Path(account_id): Path<i64>,
    Json(request): Json<CreateTransactionRequest>,
) -> Result<Json<TransactionResponse>, AppError> {
    let transaction = transaction_service::authorize_and_record(
        &pool,
        account_id,
        request.card_id,
        &request.merchant,
        &request.mcc,
        request.amount_cents,
    )
    .await?;

    Ok(Json(transaction.into()))
}

/// List the account's transactions, most recent first.
pub async fn list_transactions(
    State(pool): State<DbPool>,
    Path(account_id): Path<i64>,
) -> Result<Json<Vec<TransactionResponse>>, AppError> {
    let transactions = transaction_service::list_transactions(&pool, account_id).await?;

    Ok(Json(transactions.into_iter().map(Into::into).collect()))
}
