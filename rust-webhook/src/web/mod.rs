//! HTTP adapter for the webhook pipeline.
//!
//! This module provides the axum handlers that:
//! - Receive GitHub webhook deliveries
//! - Run them through [`crate::webhook::handle_normalized`]
//! - Translate the result into an HTTP response

pub mod handlers;

use axum::{
    extract::DefaultBodyLimit,
    routing::{get, post},
    Router,
};
use tower_http::trace::TraceLayer;

pub use handlers::{github_webhook, health, AppState, HealthResponse};

/// Build the application router.
///
/// The body limit comes from [`Config::max_body_bytes`]; axum's own 2 MB
/// default would reject large GitHub deliveries before they are verified.
///
/// [`Config::max_body_bytes`]: crate::Config::max_body_bytes
pub fn create_router(state: AppState) -> Router {
    let max_body_bytes = state.config.max_body_bytes;

    Router::new()
        .route("/health", get(health))
        .route("/webhook", post(github_webhook))
        .layer(DefaultBodyLimit::max(max_body_bytes))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
