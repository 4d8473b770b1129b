//! HTTP handlers for the banner and health endpoints.

use std::sync::Arc;

use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};

use crate::adapters::websocket::ConnectionRegistry;
use crate::config::Environment;
use crate::ports::LedgerGateway;

use super::dto::{BannerResponse, HealthResponse, HealthStatus};

#[derive(Clone)]
pub struct SystemHandlers {
    ledger: Arc<dyn LedgerGateway>,
    registry: Arc<ConnectionRegistry>,
    environment: Environment,
}

impl SystemHandlers {
    pub fn new(
        ledger: Arc<dyn LedgerGateway>,
        registry: Arc<ConnectionRegistry>,
        environment: Environment,
    ) -> Self {
        Self {
            ledger,
            registry,
            environment,
        }
    }
}

/// GET / - Service banner
pub async fn banner(State(handlers): State<SystemHandlers>) -> impl IntoResponse {
    Json(BannerResponse {
        service: "AgriChain Gateway".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        environment: handlers.environment.as_str().to_string(),
    })
}

/// GET /health - Liveness of the gateway and its ledger node
///
/// The gateway itself answering is the liveness signal; a failing ledger
/// probe degrades the status instead of failing the request, so load
/// balancers keep routing while the node recovers.
pub async fn health(State(handlers): State<SystemHandlers>) -> impl IntoResponse {
    let connections = handlers.registry.connection_count().await;
    match handlers.ledger.block_number().await {
        Ok(block) => (
            StatusCode::OK,
            Json(HealthResponse {
                status: HealthStatus::Ok,
                ledger_block: Some(block),
                websocket_connections: connections,
            }),
        ),
        Err(error) => {
            tracing::warn!(%error, "ledger health probe failed");
            (
                StatusCode::OK,
                Json(HealthResponse {
                    status: HealthStatus::Degraded,
                    ledger_block: None,
                    websocket_connections: connections,
                }),
            )
        }
    }
}
