//! Data models representing database entities.
//!
//! This module contains all data structures that map to database tables,
//! together with their request and response bodies.

/// Health spending account model
pub mod account;
/// Issued card model
pub mod card;
/// Authorization record model
pub mod transaction;
