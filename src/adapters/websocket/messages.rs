//! WebSocket message types for real-time supply-chain notifications.
//!
//! Defines the protocol between server and connected clients:
//! - Server → Client: connection ack, crop lifecycle events, system notices, pongs
//! - Client → Server: pings, crop subscription hints
//!
//! Every outbound frame is `{"type": <discriminant>, "payload": {...}}`.
//! The variant set is closed, so a payload with a missing or mistyped
//! field fails at compile time instead of reaching a client. Payload field
//! casing follows what the frontend was built against: camelCase for crop
//! events, snake_case for the connection handshake.

use serde::{Deserialize, Serialize};

// ============================================
// Server → Client Messages
// ============================================

/// All message types that can be sent from server to client.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "type", content = "payload", rename_all = "snake_case")]
pub enum ServerMessage {
    /// Connection registered successfully.
    ConnectionEstablished(ConnectionEstablishedMessage),

    /// A farmer registered a new crop.
    CropRegistered(CropRegisteredMessage),

    /// A crop moved to the next participant in the chain.
    CropTransferred(CropTransferredMessage),

    /// A crop was bought.
    CropPurchased(CropPurchasedMessage),

    /// A participant was granted a role on the ledger.
    RoleGranted(RoleGrantedMessage),

    /// Free-form operational notice.
    SystemNotification(SystemNotificationMessage),

    /// A crop's asking price changed.
    PriceUpdate(PriceUpdateMessage),

    /// A quality inspection was recorded.
    QualityCheck(QualityCheckMessage),

    /// Heartbeat response.
    Pong(PongMessage),
}

/// Sent once per session, always the first frame on the queue.
#[derive(Debug, Clone, Serialize)]
pub struct ConnectionEstablishedMessage {
    pub message: String,
    pub timestamp: String,
    /// Identity assigned to the session, if the handshake carried one.
    pub user_address: Option<String>,
    /// Role assigned to the session, if the handshake carried a valid one.
    pub user_role: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CropRegisteredMessage {
    pub crop_id: u64,
    pub crop_name: String,
    pub farmer_address: String,
    pub batch_number: String,
    pub quantity: u64,
    /// Asking price in wei.
    pub price: u64,
    pub timestamp: String,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CropTransferredMessage {
    pub crop_id: u64,
    pub crop_name: String,
    pub from_address: String,
    pub to_address: String,
    pub note: String,
    pub timestamp: String,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CropPurchasedMessage {
    pub crop_id: u64,
    pub crop_name: String,
    pub buyer_address: String,
    /// Amount paid in wei.
    pub amount: u64,
    pub timestamp: String,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RoleGrantedMessage {
    pub role: String,
    pub user_address: String,
    pub granted_by: String,
    pub timestamp: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct SystemNotificationMessage {
    pub message: String,
    pub level: NotificationLevel,
    pub timestamp: String,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PriceUpdateMessage {
    pub crop_id: u64,
    pub crop_name: String,
    pub old_price: u64,
    pub new_price: u64,
    pub timestamp: String,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct QualityCheckMessage {
    pub crop_id: u64,
    pub crop_name: String,
    pub quality_score: u32,
    pub inspector: String,
    pub notes: String,
    pub timestamp: String,
}

/// Heartbeat response.
#[derive(Debug, Clone, Serialize)]
pub struct PongMessage {
    pub timestamp: String,
}

/// Severity attached to system notifications.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NotificationLevel {
    Info,
    Success,
    Warning,
    Error,
}

// ============================================
// Client → Server Messages
// ============================================

/// All message types that can be received from client.
///
/// Frames that do not parse into one of these variants are dropped by the
/// session handler without a reply.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ClientFrame {
    /// Heartbeat request.
    Ping,

    /// Interest hint for a specific crop.
    SubscribeToCrop { payload: CropSubscription },
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct CropSubscription {
    #[serde(rename = "cropId")]
    pub crop_id: u64,
}
