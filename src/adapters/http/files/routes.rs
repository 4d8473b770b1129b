//! HTTP routes for document upload endpoints.

use axum::{routing::post, Router};

use super::handlers::{upload_file, FileHandlers};

/// Creates the upload router, mounted at `/api`.
pub fn file_routes(handlers: FileHandlers) -> Router {
    Router::new()
        .route("/upload", post(upload_file))
        .with_state(handlers)
}
