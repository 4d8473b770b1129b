//! HTTP routes for the notification trigger and stats endpoints.

use axum::{
    routing::{get, post},
    Router,
};

use super::handlers::{
    connection_stats, trigger_crop_purchased, trigger_crop_registered, trigger_crop_transferred,
    trigger_price_update, trigger_quality_check, trigger_role_granted, trigger_system_event,
    trigger_test_notification, NotificationHandlers,
};

/// Creates the notifications router, mounted at `/api/notifications`.
pub fn notification_routes(handlers: NotificationHandlers) -> Router {
    Router::new()
        .route("/crop-registered", post(trigger_crop_registered))
        .route("/crop-transferred", post(trigger_crop_transferred))
        .route("/crop-purchased", post(trigger_crop_purchased))
        .route("/role-granted", post(trigger_role_granted))
        .route("/system-event", post(trigger_system_event))
        .route("/price-update", post(trigger_price_update))
        .route("/quality-check", post(trigger_quality_check))
        .route("/test", post(trigger_test_notification))
        .route("/stats", get(connection_stats))
        .with_state(handlers)
}
