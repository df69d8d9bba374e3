//! HTTP request handlers (route handlers).
//!
//! Each handler is an async function that:
//! 1. Receives HTTP request data (JSON body, URL params, etc.)
//! 2. Delegates to a service
//! 3. Returns HTTP response (JSON, status code)

/// Account endpoints
pub mod accounts;
/// Card issuance endpoints
pub mod cards;
pub mod health;
/// Purchase authorization endpoints
pub mod transactions;
