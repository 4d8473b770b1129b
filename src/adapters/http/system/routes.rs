//! HTTP routes for the banner and health endpoints.

use axum::{routing::get, Router};

use super::handlers::{banner, health, SystemHandlers};

/// Creates the root-level service routes.
pub fn system_routes(handlers: SystemHandlers) -> Router {
    Router::new()
        .route("/", get(banner))
        .route("/health", get(health))
        .with_state(handlers)
}
