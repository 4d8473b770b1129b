//! AgriChain Gateway composition root.
//!
//! Loads configuration, wires adapters to their ports, assembles the
//! router, and serves until interrupted.

use std::sync::Arc;
use std::time::Duration;

use axum::http::HeaderValue;
use axum::Router;
use tokio::net::TcpListener;
use tower_http::cors::{Any, CorsLayer};
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::TraceLayer;
use tracing_subscriber::EnvFilter;

use agrichain_gateway::adapters::http::{
    crops::{crop_routes, CropHandlers},
    files::{file_routes, FileHandlers},
    notifications::{notification_routes, NotificationHandlers},
    system::{system_routes, SystemHandlers},
    users::{user_routes, UserHandlers},
};
use agrichain_gateway::adapters::ipfs::IpfsClient;
use agrichain_gateway::adapters::ledger::JsonRpcLedger;
use agrichain_gateway::adapters::profile::FsProfileStore;
use agrichain_gateway::adapters::websocket::{
    handler::{session_router, WebSocketState},
    ConnectionRegistry, NotificationDispatcher,
};
use agrichain_gateway::config::AppConfig;
use agrichain_gateway::ports::{FileStore, LedgerGateway, ProfileStore};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let config = AppConfig::load()?;
    init_tracing(&config);
    config.validate()?;

    tracing::info!(
        version = env!("CARGO_PKG_VERSION"),
        environment = ?config.server.environment,
        "AgriChain gateway starting"
    );

    // The registry is the single owner of connection state; everything
    // else reaches it through this one Arc.
    let registry = Arc::new(ConnectionRegistry::new());
    let dispatcher = Arc::new(NotificationDispatcher::new(registry.clone()));

    let ledger: Arc<dyn LedgerGateway> = Arc::new(JsonRpcLedger::new(&config.ledger));
    let file_store: Arc<dyn FileStore> = Arc::new(IpfsClient::new(config.ipfs.clone()));
    let profiles: Arc<dyn ProfileStore> =
        Arc::new(FsProfileStore::new(config.storage.profile_path()));

    let app = Router::new()
        .merge(system_routes(SystemHandlers::new(
            ledger.clone(),
            registry.clone(),
            config.server.environment,
        )))
        .merge(session_router().with_state(WebSocketState::new(registry.clone())))
        .nest(
            "/api/crops",
            crop_routes(CropHandlers::new(
                ledger.clone(),
                profiles.clone(),
                dispatcher.clone(),
            )),
        )
        .nest("/api/users", user_routes(UserHandlers::new(profiles)))
        .nest(
            "/api",
            file_routes(FileHandlers::new(file_store, config.storage.clone())),
        )
        .nest(
            "/api/notifications",
            notification_routes(NotificationHandlers::new(dispatcher, registry)),
        )
        .layer(TraceLayer::new_for_http())
        .layer(TimeoutLayer::new(Duration::from_secs(
            config.server.request_timeout_secs,
        )))
        .layer(cors_layer(&config));

    let addr = config.server.socket_addr()?;
    let listener = TcpListener::bind(addr).await?;
    tracing::info!(%addr, "listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("gateway stopped");
    Ok(())
}

fn init_tracing(config: &AppConfig) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&config.server.log_level));
    if config.is_production() {
        tracing_subscriber::fmt().json().with_env_filter(filter).init();
    } else {
        tracing_subscriber::fmt().with_env_filter(filter).init();
    }
}

/// Without configured origins the API stays open to any origin, which
/// is the intended development posture.
fn cors_layer(config: &AppConfig) -> CorsLayer {
    let origins: Vec<HeaderValue> = config
        .server
        .cors_origins_list()
        .iter()
        .filter_map(|origin| origin.parse().ok())
        .collect();
    if origins.is_empty() {
        CorsLayer::new()
            .allow_origin(Any)
            .allow_methods(Any)
            .allow_headers(Any)
    } else {
        CorsLayer::new()
            .allow_origin(origins)
            .allow_methods(Any)
            .allow_headers(Any)
    }
}

async fn shutdown_signal() {
    if let Err(error) = tokio::signal::ctrl_c().await {
        tracing::error!(%error, "failed to listen for shutdown signal");
    }
    tracing::info!("shutdown signal received, draining connections");
}
