//! WebSocket connection registry for identity and role based routing.
//!
//! Connections are indexed two ways: by the identity they connected with
//! and, when one was supplied, by their supply-chain role.
//!
//! # Architecture
//!
//! ```text
//! Identity: 0xabc        Identity: 0xdef      Role: farmer
//! ├── conn-1 (browser)   └── conn-3           ├── conn-1
//! └── conn-2 (mobile)                         └── conn-2
//! ```
//!
//! Targeted sends look up the identity index, role broadcasts look up the
//! role index, and full broadcasts walk every identity bucket. Anonymous
//! connections share one unnamed bucket and are reachable only through
//! full broadcasts.
//!
//! # Thread Safety
//!
//! Each index sits behind its own `RwLock`. Delivery is a non-blocking
//! queue push into the session's writer channel, so no I/O happens while
//! a lock is held and critical sections stay short.

use std::collections::HashMap;

use tokio::sync::{mpsc, RwLock};
use uuid::Uuid;

use crate::domain::foundation::{UserAddress, UserRole};

use super::messages::ServerMessage;

/// Unique identifier for a WebSocket connection.
///
/// Generated server-side when a client connects.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ConnectionId(Uuid);

impl ConnectionId {
    /// Create a new random connection ID.
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for ConnectionId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for ConnectionId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Sending half of one live connection.
///
/// Frames queued here are drained in order by the session's writer task,
/// so every connection sees messages in the order they were queued.
#[derive(Debug, Clone)]
pub struct ConnectionHandle {
    id: ConnectionId,
    sender: mpsc::UnboundedSender<String>,
}

impl ConnectionHandle {
    /// Create a handle around a session's writer channel.
    pub fn new(sender: mpsc::UnboundedSender<String>) -> Self {
        Self {
            id: ConnectionId::new(),
            sender,
        }
    }

    pub fn id(&self) -> ConnectionId {
        self.id
    }

    /// Queue a frame for delivery.
    ///
    /// Returns `false` when the session's writer task is gone, which is
    /// how the registry detects dead connections.
    fn try_send(&self, frame: String) -> bool {
        self.sender.send(frame).is_ok()
    }
}

/// Tracks live WebSocket connections and routes messages to them.
///
/// Provides:
/// - Registration keyed by identity (and optionally role)
/// - Targeted delivery to every connection of one identity
/// - Broadcast to a role audience or to every connection
/// - Pruning of connections whose transport has gone away
///
/// Callers share one instance behind an `Arc`; there is no global.
pub struct ConnectionRegistry {
    /// Identity → connections. `None` is the shared anonymous bucket.
    by_identity: RwLock<HashMap<Option<UserAddress>, Vec<ConnectionHandle>>>,

    /// Role → connections, for audience broadcasts.
    by_role: RwLock<HashMap<UserRole, Vec<ConnectionHandle>>>,
}

impl ConnectionRegistry {
    pub fn new() -> Self {
        Self {
            by_identity: RwLock::new(HashMap::new()),
            by_role: RwLock::new(HashMap::new()),
        }
    }

    /// Register a connection under an identity and optional role.
    ///
    /// Connections without an identity land in the anonymous bucket.
    /// Double-registering the same connection is not defended against;
    /// the session handler registers exactly once.
    pub async fn register(
        &self,
        conn: ConnectionHandle,
        identity: Option<UserAddress>,
        role: Option<UserRole>,
    ) {
        let conn_id = conn.id();
        {
            let mut by_identity = self.by_identity.write().await;
            by_identity
                .entry(identity.clone())
                .or_default()
                .push(conn.clone());
        }
        if let Some(role) = role {
            let mut by_role = self.by_role.write().await;
            by_role.entry(role).or_default().push(conn);
        }
        tracing::debug!(
            connection_id = %conn_id,
            identity = identity.as_ref().map(|a| a.as_str()).unwrap_or("<anonymous>"),
            role = role.map(|r| r.as_str()).unwrap_or("<none>"),
            "connection registered"
        );
    }

    /// Remove a connection from both indexes.
    ///
    /// `identity` and `role` must be the values the connection was
    /// registered with. Unregistering a connection that is not present
    /// is a no-op. An identity bucket left empty is removed; role sets
    /// are kept even when they drain to empty.
    pub async fn unregister(
        &self,
        conn_id: ConnectionId,
        identity: Option<&UserAddress>,
        role: Option<UserRole>,
    ) {
        {
            let mut by_identity = self.by_identity.write().await;
            let key = identity.cloned();
            if let Some(bucket) = by_identity.get_mut(&key) {
                bucket.retain(|c| c.id() != conn_id);
                if bucket.is_empty() {
                    by_identity.remove(&key);
                }
            }
        }
        if let Some(role) = role {
            let mut by_role = self.by_role.write().await;
            if let Some(members) = by_role.get_mut(&role) {
                members.retain(|c| c.id() != conn_id);
            }
        }
        tracing::debug!(connection_id = %conn_id, "connection unregistered");
    }

    /// Deliver a message to every connection of one identity.
    ///
    /// Sends to each of the identity's connections (a user may hold
    /// several, one per tab or device). Failures are logged and the
    /// connection is left in place; its own session teardown removes it.
    pub async fn send_to_identity(&self, message: &ServerMessage, identity: &UserAddress) {
        let Some(frame) = encode(message) else {
            return;
        };
        let by_identity = self.by_identity.read().await;
        let Some(bucket) = by_identity.get(&Some(identity.clone())) else {
            return;
        };
        for conn in bucket {
            if !conn.try_send(frame.clone()) {
                tracing::warn!(
                    connection_id = %conn.id(),
                    identity = identity.as_str(),
                    "failed to queue message for connection"
                );
            }
        }
    }

    /// Broadcast a message to every connection holding a role.
    ///
    /// Connections whose transport is gone are pruned from the role set;
    /// their identity entries stay until the session unregisters.
    /// Broadcasting to a role nobody holds is a no-op.
    pub async fn broadcast_to_role(&self, message: &ServerMessage, role: UserRole) {
        let Some(frame) = encode(message) else {
            return;
        };
        let mut by_role = self.by_role.write().await;
        let Some(members) = by_role.get_mut(&role) else {
            return;
        };
        let mut failed: Vec<ConnectionId> = Vec::new();
        for conn in members.iter() {
            if !conn.try_send(frame.clone()) {
                tracing::warn!(
                    connection_id = %conn.id(),
                    role = role.as_str(),
                    "pruning dead connection from role audience"
                );
                failed.push(conn.id());
            }
        }
        if !failed.is_empty() {
            members.retain(|c| !failed.contains(&c.id()));
        }
    }

    /// Broadcast a message to every live connection.
    ///
    /// Walks all identity buckets, including the anonymous one. Dead
    /// connections are pruned from their bucket; buckets that drain to
    /// empty are removed. An empty registry is a no-op.
    pub async fn broadcast_to_all(&self, message: &ServerMessage) {
        let Some(frame) = encode(message) else {
            return;
        };
        let mut by_identity = self.by_identity.write().await;
        let mut failed: Vec<(Option<UserAddress>, ConnectionId)> = Vec::new();
        for (key, bucket) in by_identity.iter() {
            for conn in bucket {
                if !conn.try_send(frame.clone()) {
                    tracing::warn!(
                        connection_id = %conn.id(),
                        "pruning dead connection from registry"
                    );
                    failed.push((key.clone(), conn.id()));
                }
            }
        }
        for (key, conn_id) in failed {
            if let Some(bucket) = by_identity.get_mut(&key) {
                bucket.retain(|c| c.id() != conn_id);
                if bucket.is_empty() {
                    by_identity.remove(&key);
                }
            }
        }
    }

    /// Total number of registered connections.
    pub async fn connection_count(&self) -> usize {
        let by_identity = self.by_identity.read().await;
        by_identity.values().map(|bucket| bucket.len()).sum()
    }

    /// Connection counts per role, for roles that have seen members.
    pub async fn counts_by_role(&self) -> HashMap<UserRole, usize> {
        let by_role = self.by_role.read().await;
        by_role
            .iter()
            .map(|(role, members)| (*role, members.len()))
            .collect()
    }

    /// Identities with at least one live connection.
    ///
    /// The anonymous bucket is not an identity and is not listed.
    pub async fn active_identities(&self) -> Vec<UserAddress> {
        let by_identity = self.by_identity.read().await;
        by_identity.keys().filter_map(|k| k.clone()).collect()
    }
}

impl Default for ConnectionRegistry {
    fn default() -> Self {
        Self::new()
    }
}

/// Serialize a message once per delivery call.
///
/// Serialization failure is a programming error in payload construction;
/// it is logged and the delivery becomes a no-op rather than a panic.
fn encode(message: &ServerMessage) -> Option<String> {
    match serde_json::to_string(message) {
        Ok(frame) => Some(frame),
        Err(error) => {
            tracing::error!(%error, "failed to serialize outbound message");
            None
        }
    }
}
