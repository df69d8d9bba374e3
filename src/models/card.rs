//! Card data models.
//!
//! Cards are synthetic: the 16-digit number is generated locally and is not
//! tied to any card network.

use chrono::{DateTime, Utc};
use serde::Serialize;

/// Represents a card record from the database.
///
/// # Database Table
///
/// Maps to the `cards` table. Each card:
/// - Belongs to exactly one account and is deleted with it
/// - Has a 16-digit `card_number` unique across all cards
/// - Is never updated after issuance
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct Card {
    pub id: i64,

    /// Owning account
    pub account_id: i64,

    /// 16 decimal digits, stored as text to keep leading zeros
    pub card_number: String,

    /// Trailing four characters of `card_number` (e.g. "0001")
    pub last4_digits: String,

    /// Opaque random token, independent of the card number
    pub token: String,

    pub is_active: bool,

    pub created_at: DateTime<Utc>,
}

/// Response body for card endpoints.
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
#[derive(Debug, Serialize)]
pub struct CardResponse {
    pub id: i64,
    pub account_id: i64,
    pub card_number: String,
    pub last4_digits: String,
    pub token: String,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
}

impl From<Card> for CardResponse {
    fn from(card: Card) -> Self {
        Self {
            id: card.id,
            account_id: card.account_id,
            card_number: card.card_number,
            last4_digits: card.last4_digits,
            token: card.token,
            is_active: card.is_active,
            created_at: card.created_at,
        }
    }
}
