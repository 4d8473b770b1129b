//! HTTP routes for crop endpoints.

use axum::{
    routing::{get, post},
    Router,
};

use super::handlers::{
    buy_crop, get_crop, get_crop_history, list_available_crops, list_crops, list_crops_by_owner,
    register_crop, transfer_crop, CropHandlers,
};

/// Creates the crops router, mounted at `/api/crops`.
///
/// Literal segments (`available`, `my`, `transfer`) are registered before
/// the `:id` capture so they are never shadowed by it.
pub fn crop_routes(handlers: CropHandlers) -> Router {
    Router::new()
        .route("/", post(register_crop))
        .route("/", get(list_crops))
        .route("/available", get(list_available_crops))
        .route("/my/:address", get(list_crops_by_owner))
        .route("/transfer", post(transfer_crop))
        .route("/:id", get(get_crop))
        .route("/:id/history", get(get_crop_history))
        .route("/:id/buy", post(buy_crop))
        .with_state(handlers)
}
