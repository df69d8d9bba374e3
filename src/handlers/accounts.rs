//! Account HTTP handlers.
//!
//! This module implements the account-related API endpoints:
//! - POST /accounts - Create account (or return the existing one for the email)
//! - GET /accounts/{id} - Get account by ID
//! - POST /accounts/{id}/deposit - Add funds
//! - DELETE /accounts/{id} - Remove account, its cards and transactions

use crate::{
    db::DbPool,
    error::AppError,
    models::account::{AccountResponse, CreateAccountRequest, DepositRequest},
    services::account_service,
};
use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};

/// Create an account.
///
/// # Endpoint
///
/// `POST /accounts`
///
/// # Request Body
///
/// ```json
/// {
///   "email": "jane@example.com",
///   "name": "Jane Doe"
/// }
/// ```
///
/// # Response
///
/// - **Success (200 OK)**: the new account, or the account already registered
///   for this email (unchanged)
/// - **Error (400)**: malformed email or blank name
pub async fn create_account(
    State(pool): State<DbPool>,
    Json(request): Json<CreateAccountRequest>,
) -> Result<Json<AccountResponse>, AppError> {
    let account = account_service::create_account(&pool, &request.email, &request.name).await?;

    Ok(Json(account.into()))
}

/// Get a specific account by ID.
///
/// # Response
///
/// - **Success (200 OK)**: Returns account details
/// - **Error (404)**: Account not found
pub async fn get_account(
    State(pool): State<DbPool>,
    Path(account_id): Path<i64>,
) -> Result<Json<AccountResponse>, AppError> {
    let account = account_service::get_account(&pool, account_id).await?;

    Ok(Json(account.into()))
}

/// Deposit funds.
///
/// # Endpoint
///
/// `POST /accounts/{id}/deposit` with body `{"amount_cents": 5000}`
///
/// # Response
///
/// - **Success (200 OK)**: the account with its new balance
/// - **Error (400)**: amount is zero or negative
/// - **Error (404)**: Account not found
pub async fn deposit(
    State(pool): State<DbPool>,
    Path(account_id): Path<i64>,
    Json(request): Json<DepositRequest>,
) -> Result<Json<AccountResponse>, AppError> {
    let account = account_service::deposit(&pool, account_id, request.amount_cents).await?;

    Ok(Json(account.into()))
}

/// Delete an account.
///
/// Returns 204 No Content, or 404 if the account does not exist.
pub async fn delete_account(
    State(pool): State<DbPool>,
    Path(account_id): Path<i64>,
) -> Result<StatusCode, AppError> {
    account_service::delete_account(&pool, account_id).await?;

    Ok(StatusCode::NO_CONTENT)
}
