//! Account data models and API request/response types.
//!
//! This module defines:
//! - `Account`: Database entity representing an account
//! - `CreateAccountRequest`, `DepositRequest`: Request bodies
//! - `AccountResponse`: Response body returned to clients

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Represents an account record from the database.
///
/// # Balance Storage
///
/// Balances are stored as `i64` cents to avoid floating-point precision issues.
/// The balance never drops below zero: debits only happen through an approved
/// authorization, which checks funds first. Deposits are unbounded.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct Account {
    /// Unique identifier for this account
    pub id: i64,

    /// Owner email, unique across accounts
    pub email: String,

    /// Display name
    pub name: String,

    /// Current balance in cents (not dollars)
    pub balance_cents: i64,

    /// Timestamp when account was created
    pub created_at: DateTime<Utc>,
}

/// Request body for creating an account.
///
/// # JSON Example
///
/// ```json
/// {
///   "email": "jane@example.com",
///   "name": "Jane Doe"
/// }
/// ```
///
/// Creating an account for an email that already has one returns the
/// existing account unchanged.
#[derive(Debug, Deserialize)]
pub struct CreateAccountRequest {
    pub email: String,
    pub name: String,
}

/// Request body for `POST /accounts/{id}/deposit`.
#[derive(Debug, Deserialize)]
pub struct DepositRequest {
    /// Amount to add in cents, must be positive
    pub amount_cents: i64,
}

/// Response body for account endpoints.
///
/// # JSON Example
///
/// ```json
/// {
///   "id": 1,
///   "email": "jane@example.com",
///   "name": "Jane Doe",
///   "balance_cents": 10000,
///   "created_at": "2025-12-20T10:00:00Z"
/// }
/// ```
#[derive(Debug, Serialize)]
pub struct AccountResponse {
    pub id: i64,
    pub email: String,
    pub name: String,
    pub balance_cents: i64,
    pub created_at: DateTime<Utc>,
}

impl From<Account> for AccountResponse {
    fn from(account: Account) -> Self {
        Self {
            id: account.id,
            email: account.email,
            name: account.name,
            balance_cents: account.balance_cents,
            created_at: account.created_at,
        }
    }
}
