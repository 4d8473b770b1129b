//! WebSocket upgrade handler for real-time notification connections.
//!
//! Handles the HTTP → WebSocket upgrade and manages the connection lifecycle:
//! 1. Resolve identity and role from the handshake query
//! 2. Upgrade to WebSocket
//! 3. Register with the connection registry
//! 4. Acknowledge, then pump frames until disconnect
//! 5. Unregister exactly once on the way out

use std::sync::Arc;

use axum::{
    extract::{
        ws::{Message, WebSocket, WebSocketUpgrade},
        Query, State,
    },
    response::Response,
};
use futures::{SinkExt, StreamExt};
use serde::Deserialize;
use tokio::sync::mpsc;

use crate::domain::foundation::{Timestamp, UserAddress, UserRole};

use super::{
    messages::{ClientFrame, ConnectionEstablishedMessage, PongMessage, ServerMessage},
    registry::{ConnectionHandle, ConnectionId, ConnectionRegistry},
};

/// State required for WebSocket handling.
#[derive(Clone)]
pub struct WebSocketState {
    /// Registry shared with the notification dispatcher.
    pub registry: Arc<ConnectionRegistry>,
}

impl WebSocketState {
    /// Create a new WebSocket state.
    pub fn new(registry: Arc<ConnectionRegistry>) -> Self {
        Self { registry }
    }
}

/// Handshake parameters supplied by the client.
///
/// The identity is an opaque wallet address and is not authenticated
/// here. A missing or unrecognized role leaves the connection outside
/// every role audience; it still receives full broadcasts.
#[derive(Debug, Deserialize)]
pub struct ConnectParams {
    pub user_address: Option<String>,
    pub user_role: Option<String>,
}

/// Lifecycle of one connection. `Closed` is terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum SessionState {
    Connecting,
    Active,
    Closed,
}

/// Book-keeping for one live connection.
///
/// Captures the identity and role resolved at connect time so teardown
/// removes exactly what registration added, even if the user's role
/// changed elsewhere mid-session.
struct Session {
    id: ConnectionId,
    identity: Option<UserAddress>,
    role: Option<UserRole>,
    state: SessionState,
    registry: Arc<ConnectionRegistry>,
}

impl Session {
    fn new(
        id: ConnectionId,
        identity: Option<UserAddress>,
        role: Option<UserRole>,
        registry: Arc<ConnectionRegistry>,
    ) -> Self {
        Self {
            id,
            identity,
            role,
            state: SessionState::Connecting,
            registry,
        }
    }

    fn activate(&mut self) {
        self.state = SessionState::Active;
        tracing::debug!(connection_id = %self.id, "session active");
    }

    /// Transition to `Closed` and unregister. Runs at most once; later
    /// calls are no-ops.
    async fn close(&mut self) {
        if self.state == SessionState::Closed {
            return;
        }
        self.state = SessionState::Closed;
        self.registry
            .unregister(self.id, self.identity.as_ref(), self.role)
            .await;
        tracing::info!(connection_id = %self.id, "session closed");
    }
}

/// Handle WebSocket upgrade requests for the notification channel.
///
/// Route: `GET /ws?user_address=0x..&user_role=farmer`
///
/// # Security
///
/// The identity is taken at face value; this channel carries public
/// supply-chain events, not private data. Production hardening would
/// verify a signed token before trusting the address.
pub async fn ws_handler(
    ws: WebSocketUpgrade,
    Query(params): Query<ConnectParams>,
    State(state): State<WebSocketState>,
) -> Response {
    let identity = resolve_identity(params.user_address);
    let role = resolve_role(params.user_role.as_deref());

    ws.on_upgrade(move |socket| handle_socket(socket, identity, role, state.registry))
}

/// Handle an established WebSocket connection.
///
/// This function runs for the lifetime of the connection, handling:
/// - Registration under the session's identity and role
/// - Forwarding queued notifications to the client
/// - Processing client frames (ping, crop subscription)
/// - Deregistration on disconnect
async fn handle_socket(
    socket: WebSocket,
    identity: Option<UserAddress>,
    role: Option<UserRole>,
    registry: Arc<ConnectionRegistry>,
) {
    let (mut sender, mut receiver) = socket.split();

    // Everything the registry or dispatcher wants delivered goes through
    // this queue; the writer task below is the only place that touches
    // the socket's sink, which keeps per-connection ordering.
    let (tx, mut rx) = mpsc::unbounded_channel::<String>();
    let mut session = open_session(&tx, identity, role, registry).await;

    // Drain the outbound queue into the socket.
    let mut send_task = tokio::spawn(async move {
        while let Some(frame) = rx.recv().await {
            if sender.send(Message::Text(frame)).await.is_err() {
                break;
            }
        }
    });

    // Read inbound frames until the transport goes away.
    let session_id = session.id;
    let mut recv_task = tokio::spawn(async move {
        while let Some(result) = receiver.next().await {
            match result {
                Ok(Message::Text(text)) => handle_frame(&text, &tx, session_id),
                Ok(Message::Binary(_)) => {
                    tracing::debug!(
                        connection_id = %session_id,
                        "ignoring binary frame"
                    );
                }
                Ok(Message::Ping(_)) | Ok(Message::Pong(_)) => {
                    // WebSocket protocol frames - handled automatically by axum
                }
                Ok(Message::Close(_)) => {
                    tracing::debug!(
                        connection_id = %session_id,
                        "client sent close frame"
                    );
                    break;
                }
                Err(e) => {
                    tracing::debug!(
                        connection_id = %session_id,
                        "receive error: {}",
                        e
                    );
                    break;
                }
            }
        }
    });

    // Whichever side finishes first takes the whole session down.
    tokio::select! {
        _ = &mut send_task => {
            recv_task.abort();
        }
        _ = &mut recv_task => {
            send_task.abort();
        }
    }

    session.close().await;
}

/// Register the connection and queue the acknowledgment frame.
///
/// The ack is placed on the queue before the registry handle is visible
/// to any broadcast, so it is always the first frame a client reads.
async fn open_session(
    tx: &mpsc::UnboundedSender<String>,
    identity: Option<UserAddress>,
    role: Option<UserRole>,
    registry: Arc<ConnectionRegistry>,
) -> Session {
    queue_message(
        tx,
        &ServerMessage::ConnectionEstablished(ConnectionEstablishedMessage {
            message: "Connected to real-time updates".to_string(),
            timestamp: Timestamp::now().to_rfc3339(),
            user_address: identity.as_ref().map(ToString::to_string),
            user_role: role.map(|r| r.as_str().to_string()),
        }),
    );

    let conn = ConnectionHandle::new(tx.clone());
    let mut session = Session::new(conn.id(), identity.clone(), role, registry.clone());
    registry.register(conn, identity, role).await;
    session.activate();
    session
}

/// Dispatch one inbound text frame.
///
/// Unrecognized or malformed frames are dropped without a reply and the
/// connection stays open.
fn handle_frame(text: &str, replies: &mpsc::UnboundedSender<String>, conn_id: ConnectionId) {
    match serde_json::from_str::<ClientFrame>(text) {
        Ok(ClientFrame::Ping) => {
            queue_message(
                replies,
                &ServerMessage::Pong(PongMessage {
                    timestamp: Timestamp::now().to_rfc3339(),
                }),
            );
        }
        Ok(ClientFrame::SubscribeToCrop { payload }) => {
            // Interest is recorded in the logs only; crop events reach
            // this connection through the normal audience routing.
            tracing::debug!(
                connection_id = %conn_id,
                crop_id = payload.crop_id,
                "crop subscription noted"
            );
        }
        Err(_) => {
            tracing::debug!(connection_id = %conn_id, "ignoring unrecognized frame");
        }
    }
}

fn queue_message(tx: &mpsc::UnboundedSender<String>, message: &ServerMessage) {
    match serde_json::to_string(message) {
        Ok(frame) => {
            // A closed queue means the writer task is gone and teardown
            // is already underway.
            let _ = tx.send(frame);
        }
        Err(error) => {
            tracing::error!(%error, "failed to serialize outbound message");
        }
    }
}

/// An empty or whitespace address means the client connected anonymously.
fn resolve_identity(raw: Option<String>) -> Option<UserAddress> {
    raw.and_then(|value| UserAddress::new(value).ok())
}

/// Unknown roles are logged and dropped rather than rejected; the
/// connection proceeds without a role audience.
fn resolve_role(raw: Option<&str>) -> Option<UserRole> {
    let value = raw?;
    match value.parse::<UserRole>() {
        Ok(role) => Some(role),
        Err(_) => {
            tracing::warn!(role = value, "unrecognized role in handshake, ignoring");
            None
        }
    }
}

/// Create axum router for the WebSocket endpoint.
///
/// # Example
///
/// ```ignore
/// let app = Router::new()
///     .merge(session_router().with_state(ws_state));
/// ```
pub fn session_router() -> axum::Router<WebSocketState> {
    use axum::routing::get;

    axum::Router::new().route("/ws", get(ws_handler))
}
