//! Business logic services.
//!
//! Services contain core business logic separated from HTTP handlers.
//! They handle database transactions, validation, and the authorization rules.

pub mod account_service;
pub mod authorization;
pub mod card_service;
pub mod transaction_service;
