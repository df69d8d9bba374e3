//! HTTP router assembly.
//!
//! Routes, shared state and middleware layers live here so the binary and
//! the black-box tests serve exactly the same application.

use axum::{
    Router,
    http::HeaderValue,
    routing::{delete, get, post},
};
use tower::ServiceBuilder;
use tower_http::{
    cors::{AllowOrigin, Any, CorsLayer},
    trace::TraceLayer,
};

use crate::{config::Config, db::DbPool, handlers};

/// Build the application router.
///
/// The pool is the only shared state; handlers receive it through `State`.
pub fn build_app(pool: DbPool, config: &Config) -> Router {
    Router::new()
        .route("/health", get(handlers::health::health_check))
        // Accounts
        .route("/accounts", post(handlers::accounts::create_account))
        .route(
            "/accounts/{id}",
            get(handlers::accounts::get_account).delete(handlers::accounts::delete_account),
        )
        .route(
            "/accounts/{id}/deposit",
            post(handlers::accounts::deposit),
        )
        // Cards
        .route(
            "/accounts/{id}/cards",
            post(handlers::cards::issue_card).get(handlers::cards::list_cards),
        )
        .route(
            "/accounts/{id}/cards/{card_id}",
            delete(handlers::cards::delete_card),
        )
        // Transactions
        .route(
            "/accounts/{id}/transactions",
            post(handlers::transactions::create_transaction)
                .get(handlers::transactions::list_transactions),
        )
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(cors_layer(config)),
        )
        .with_state(pool)
}

/// CORS policy for the browser frontend.
fn cors_layer(config: &Config) -> CorsLayer {
    let layer = CorsLayer::new().allow_methods(Any).allow_headers(Any);

    if config.allows_any_origin() {
        return layer.allow_origin(Any);
    }

    let origins: Vec<HeaderValue> = config
        .cors_allowed_origins
        .iter()
        .filter_map(|origin| match HeaderValue::from_str(origin.trim()) {
            Ok(value) => Some(value),
            Err(_) => {
                tracing::warn!(%origin, "ignoring invalid CORS origin");
                None
            }
        })
        .collect();

    layer.allow_origin(AllowOrigin::list(origins))
}
