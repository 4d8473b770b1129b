//! HTTP DTOs for the service banner and health endpoints.

use serde::Serialize;

/// Response for `GET /`.
#[derive(Debug, Clone, Serialize)]
pub struct BannerResponse {
    pub service: String,
    pub version: String,
    pub environment: String,
}

/// Response for `GET /health`.
#[derive(Debug, Clone, Serialize)]
pub struct HealthResponse {
    pub status: HealthStatus,
    /// Latest ledger block when the node answered, absent otherwise.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ledger_block: Option<u64>,
    pub websocket_connections: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum HealthStatus {
    Ok,
    Degraded,
}
