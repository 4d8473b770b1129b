//! WebSocket adapters for real-time supply-chain notifications.
//!
//! This module provides the infrastructure for pushing supply-chain
//! events to connected frontend clients via WebSocket connections.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────┐
//! │                    HTTP Notification Endpoints                       │
//! │   POST /api/notifications/crop-registered, /crop-transferred, ...   │
//! └─────────────────────────────────────────────────────────────────────┘
//!                                     │
//!                                     │ events
//!                                     ▼
//! ┌─────────────────────────────────────────────────────────────────────┐
//! │                    NotificationDispatcher                            │
//! │   - Maps each event to its audiences                                │
//! │   - Builds the wire messages and companion system notes             │
//! └─────────────────────────────────────────────────────────────────────┘
//!                                     │
//!                                     │ delivers through
//!                                     ▼
//! ┌─────────────────────────────────────────────────────────────────────┐
//! │                      ConnectionRegistry                              │
//! │   identity: 0xf39f…    identity: 0x7099…    role: farmer            │
//! │   ├── conn-a           └── conn-c           ├── conn-a              │
//! │   └── conn-b                                └── conn-c              │
//! └─────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! # Components
//!
//! - [`messages`] - WebSocket message protocol types
//! - [`registry`] - Connection indexing by identity and role
//! - [`dispatcher`] - Event-to-audience routing policy
//! - [`handler`] - Axum WebSocket upgrade handler

pub mod dispatcher;
pub mod handler;
pub mod messages;
pub mod registry;

pub use dispatcher::{
    CropPurchasedEvent, CropRegisteredEvent, CropTransferredEvent, NotificationDispatcher,
    PriceUpdateEvent, QualityCheckEvent, RoleGrantedEvent, SystemEvent,
};
pub use handler::{session_router, ws_handler, WebSocketState};
pub use messages::{ClientFrame, NotificationLevel, ServerMessage};
pub use registry::{ConnectionHandle, ConnectionId, ConnectionRegistry};
