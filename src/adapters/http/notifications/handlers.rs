//! HTTP handlers for the notification trigger and stats endpoints.

use std::collections::HashMap;
use std::sync::Arc;

use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};

use crate::adapters::http::error::ErrorResponse;
use crate::adapters::websocket::{
    ConnectionRegistry, CropPurchasedEvent, CropRegisteredEvent, CropTransferredEvent,
    NotificationDispatcher, NotificationLevel, PriceUpdateEvent, QualityCheckEvent,
    RoleGrantedEvent, SystemEvent,
};
use crate::domain::foundation::{UserAddress, UserRole, ValidationError};

use super::dto::{
    ConnectionStatsResponse, CropPurchasedRequest, CropRegisteredRequest, CropTransferredRequest,
    DispatchResponse, PriceUpdateRequest, QualityCheckRequest, RoleGrantedRequest,
    SystemEventRequest,
};

#[derive(Clone)]
pub struct NotificationHandlers {
    dispatcher: Arc<NotificationDispatcher>,
    registry: Arc<ConnectionRegistry>,
}

impl NotificationHandlers {
    pub fn new(dispatcher: Arc<NotificationDispatcher>, registry: Arc<ConnectionRegistry>) -> Self {
        Self {
            dispatcher,
            registry,
        }
    }
}

/// POST /api/notifications/crop-registered
pub async fn trigger_crop_registered(
    State(handlers): State<NotificationHandlers>,
    Json(req): Json<CropRegisteredRequest>,
) -> Response {
    let farmer_address = match UserAddress::new(req.farmer_address) {
        Ok(address) => address,
        Err(error) => return bad_request(error),
    };
    handlers
        .dispatcher
        .notify_crop_registered(CropRegisteredEvent {
            crop_id: req.crop_id,
            crop_name: req.crop_name,
            farmer_address,
            batch_number: req.batch_number,
            quantity: req.quantity,
            price: req.price,
        })
        .await;
    dispatched()
}

/// POST /api/notifications/crop-transferred
pub async fn trigger_crop_transferred(
    State(handlers): State<NotificationHandlers>,
    Json(req): Json<CropTransferredRequest>,
) -> Response {
    let from_address = match UserAddress::new(req.from_address) {
        Ok(address) => address,
        Err(error) => return bad_request(error),
    };
    let to_address = match UserAddress::new(req.to_address) {
        Ok(address) => address,
        Err(error) => return bad_request(error),
    };
    handlers
        .dispatcher
        .notify_crop_transferred(CropTransferredEvent {
            crop_id: req.crop_id,
            crop_name: req.crop_name,
            from_address,
            to_address,
            note: req.note,
        })
        .await;
    dispatched()
}

/// POST /api/notifications/crop-purchased
pub async fn trigger_crop_purchased(
    State(handlers): State<NotificationHandlers>,
    Json(req): Json<CropPurchasedRequest>,
) -> Response {
    let buyer_address = match UserAddress::new(req.buyer_address) {
        Ok(address) => address,
        Err(error) => return bad_request(error),
    };
    handlers
        .dispatcher
        .notify_crop_purchased(CropPurchasedEvent {
            crop_id: req.crop_id,
            crop_name: req.crop_name,
            buyer_address,
            amount: req.amount,
        })
        .await;
    dispatched()
}

/// POST /api/notifications/role-granted
pub async fn trigger_role_granted(
    State(handlers): State<NotificationHandlers>,
    Json(req): Json<RoleGrantedRequest>,
) -> Response {
    let user_address = match UserAddress::new(req.user_address) {
        Ok(address) => address,
        Err(error) => return bad_request(error),
    };
    let granted_by = match UserAddress::new(req.granted_by) {
        Ok(address) => address,
        Err(error) => return bad_request(error),
    };
    handlers
        .dispatcher
        .notify_role_granted(RoleGrantedEvent {
            role: req.role,
            user_address,
            granted_by,
        })
        .await;
    dispatched()
}

/// POST /api/notifications/system-event
pub async fn trigger_system_event(
    State(handlers): State<NotificationHandlers>,
    Json(req): Json<SystemEventRequest>,
) -> Response {
    let target_role = match req.target_role.as_deref() {
        None => None,
        Some(raw) => match raw.parse::<UserRole>() {
            Ok(role) => Some(role),
            Err(_) => {
                return (
                    StatusCode::BAD_REQUEST,
                    Json(ErrorResponse::bad_request(format!(
                        "Unknown target role '{raw}'"
                    ))),
                )
                    .into_response();
            }
        },
    };
    handlers
        .dispatcher
        .notify_system_event(SystemEvent {
            message: req.message,
            level: req.level,
            target_role,
        })
        .await;
    dispatched()
}

/// POST /api/notifications/price-update
pub async fn trigger_price_update(
    State(handlers): State<NotificationHandlers>,
    Json(req): Json<PriceUpdateRequest>,
) -> Response {
    handlers
        .dispatcher
        .notify_price_update(PriceUpdateEvent {
            crop_id: req.crop_id,
            crop_name: req.crop_name,
            old_price: req.old_price,
            new_price: req.new_price,
        })
        .await;
    dispatched()
}

/// POST /api/notifications/quality-check
pub async fn trigger_quality_check(
    State(handlers): State<NotificationHandlers>,
    Json(req): Json<QualityCheckRequest>,
) -> Response {
    let farmer_address = match UserAddress::new(req.farmer_address) {
        Ok(address) => address,
        Err(error) => return bad_request(error),
    };
    handlers
        .dispatcher
        .notify_quality_check(QualityCheckEvent {
            crop_id: req.crop_id,
            crop_name: req.crop_name,
            quality_score: req.quality_score,
            inspector: req.inspector,
            notes: req.notes,
            farmer_address,
        })
        .await;
    dispatched()
}

/// POST /api/notifications/test - Broadcast a canned notice to everyone
pub async fn trigger_test_notification(
    State(handlers): State<NotificationHandlers>,
) -> Response {
    handlers
        .dispatcher
        .notify_system_event(SystemEvent {
            message: "Test notification from AgriChain gateway".to_string(),
            level: NotificationLevel::Info,
            target_role: None,
        })
        .await;
    dispatched()
}

/// GET /api/notifications/stats - Administrative connection counts
pub async fn connection_stats(State(handlers): State<NotificationHandlers>) -> Response {
    let total_connections = handlers.registry.connection_count().await;
    let by_role: HashMap<String, usize> = handlers
        .registry
        .counts_by_role()
        .await
        .into_iter()
        .map(|(role, count)| (role.as_str().to_string(), count))
        .collect();
    let mut active_identities: Vec<String> = handlers
        .registry
        .active_identities()
        .await
        .into_iter()
        .map(|address| address.to_string())
        .collect();
    active_identities.sort();

    (
        StatusCode::OK,
        Json(ConnectionStatsResponse {
            total_connections,
            by_role,
            active_identities,
        }),
    )
        .into_response()
}

fn dispatched() -> Response {
    (StatusCode::OK, Json(DispatchResponse::dispatched())).into_response()
}

fn bad_request(error: ValidationError) -> Response {
    (
        StatusCode::BAD_REQUEST,
        Json(ErrorResponse::bad_request(error.to_string())),
    )
        .into_response()
}
