//! Transaction data models and API request/response types.
//!
//! A transaction is the record of one authorization decision. Approved and
//! declined attempts are both stored; the table is the full authorization log.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Represents a transaction record from the database.
///
/// # Database Table
///
/// Maps to the `transactions` table. Each transaction:
/// - Belongs to one account (deleted with it)
/// - Optionally references the card used (set to NULL if the card is deleted)
/// - Stores amount in cents (never floats!)
/// - Is immutable once written
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct Transaction {
    pub id: i64,

    pub account_id: i64,

    /// Card used for the purchase, if any
    pub card_id: Option<i64>,

    /// Requested amount in cents, always positive
    pub amount_cents: i64,

    pub merchant: String,

    /// Merchant category code, kept as text (e.g. "0742")
    pub mcc: String,

    pub is_approved: bool,

    /// "Non-qualified expense" or "Insufficient funds" when declined
    pub rejection_reason: Option<String>,

    pub created_at: DateTime<Utc>,
}

/// Request to authorize a purchase against an account.
///
/// # JSON Example
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
/// # Validation
///
/// - `amount_cents` must be positive
/// - `card_id`, when given, must be an active card of the same account
#[derive(Debug, Deserialize)]
pub struct CreateTransactionRequest {
    #[serde(default)]
    pub card_id: Option<i64>,

    pub merchant: String,

    pub mcc: String,

    pub amount_cents: i64,
}

/// Response returned for transaction operations.
///
/// Declined authorizations are successful responses too; clients tell them
/// apart by `is_approved` and `rejection_reason`.
///
/// ```json
/// {
///   "id": 12,
///   "account_id": 1,
///   "card_id": 3,
///   "amount_cents": 1250,
///   "merchant": "Corner Pharmacy",
///   "mcc": "5912",
///   "is_approved": true,
///   "rejection_reason": null,
///   "created_at": "2025-12-21T16:00:00Z"
/// }
/// ```
#[derive(Debug, Serialize)]
pub struct TransactionResponse {
    pub id: i64,
    pub account_id: i64,
    pub card_id: Option<i64>,
    pub amount_cents: i64,
    pub merchant: String,
    pub mcc: String,
    pub is_approved: bool,
    pub rejection_reason: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl From<Transaction> for TransactionResponse {
    fn from(transaction: Transaction) -> Self {
        Self {
            id: transaction.id,
            account_id: transaction.account_id,
            card_id: transaction.card_id,
            amount_cents: transaction.amount_cents,
            merchant: transaction.merchant,
            mcc: transaction.mcc,
            is_approved: transaction.is_approved,
            rejection_reason: transaction.rejection_reason,
            created_at: transaction.created_at,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn declined_response_serializes_reason_and_null_card() {
        let row = Transaction {
            id: 7,
            account_id: 1,
            card_id: None,
            amount_cents: 2_000,
            merchant: "Grocery".to_string(),
            mcc: "5411".to_string(),
            is_approved: false,
            rejection_reason: Some("Non-qualified expense".to_string()),
            created_at: Utc::now(),
        };

        let json = serde_json::to_value(TransactionResponse::from(row)).unwrap();

        assert_eq!(json["card_id"], serde_json::Value::Null);
        assert_eq!(json["is_approved"], false);
        assert_eq!(json["rejection_reason"], "Non-qualified expense");
        assert_eq!(json["mcc"], "5411");
    }
}
