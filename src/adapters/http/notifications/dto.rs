//! HTTP DTOs for the notification trigger and stats endpoints.
//!
//! The trigger endpoints exist for operators and tests: they feed the
//! dispatcher directly, without a ledger transaction behind the event.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::adapters::websocket::NotificationLevel;

#[derive(Debug, Clone, Deserialize)]
pub struct CropRegisteredRequest {
    pub crop_id: u64,
    pub crop_name: String,
    pub farmer_address: String,
    #[serde(default)]
    pub batch_number: String,
    #[serde(default)]
    pub quantity: u64,
    #[serde(default)]
    pub price: u64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CropTransferredRequest {
    pub crop_id: u64,
    pub crop_name: String,
    pub from_address: String,
    pub to_address: String,
    #[serde(default)]
    pub note: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CropPurchasedRequest {
    pub crop_id: u64,
    pub crop_name: String,
    pub buyer_address: String,
    #[serde(default)]
    pub amount: u64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RoleGrantedRequest {
    pub role: String,
    pub user_address: String,
    pub granted_by: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SystemEventRequest {
    pub message: String,
    #[serde(default = "default_level")]
    pub level: NotificationLevel,
    /// When present, only this role hears the notice.
    pub target_role: Option<String>,
}

fn default_level() -> NotificationLevel {
    NotificationLevel::Info
}

#[derive(Debug, Clone, Deserialize)]
pub struct PriceUpdateRequest {
    pub crop_id: u64,
    pub crop_name: String,
    pub old_price: u64,
    pub new_price: u64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct QualityCheckRequest {
    pub crop_id: u64,
    pub crop_name: String,
    pub quality_score: u32,
    pub inspector: String,
    #[serde(default)]
    pub notes: String,
    pub farmer_address: String,
}

/// Acknowledgment that a dispatch attempt completed.
///
/// Per-recipient delivery is never reported here; failures are handled
/// inside the registry.
#[derive(Debug, Clone, Serialize)]
pub struct DispatchResponse {
    pub status: &'static str,
}

impl DispatchResponse {
    pub fn dispatched() -> Self {
        Self {
            status: "dispatched",
        }
    }
}

/// Response for `GET /api/notifications/stats`.
#[derive(Debug, Clone, Serialize)]
pub struct ConnectionStatsResponse {
    pub total_connections: usize,
    pub by_role: HashMap<String, usize>,
    pub active_identities: Vec<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn system_event_level_defaults_to_info() {
        let request: SystemEventRequest =
            serde_json::from_str(r#"{"message": "maintenance window"}"#).unwrap();
        assert_eq!(request.level, NotificationLevel::Info);
        assert_eq!(request.target_role, None);
    }

    #[test]
    fn stats_response_serializes() {
        let response = ConnectionStatsResponse {
            total_connections: 2,
            by_role: HashMap::from([("farmer".to_string(), 1)]),
            active_identities: vec!["0xabc".to_string()],
        };
        let json = serde_json::to_value(&response).unwrap();
        assert_eq!(json["total_connections"], 2);
        assert_eq!(json["by_role"]["farmer"], 1);
    }
}
