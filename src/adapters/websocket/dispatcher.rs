//! Routes supply-chain events to the right notification audience.
//!
//! The dispatcher owns the "who hears about this" policy. Each event type
//! has a fixed fan-out: some go to everyone, some point-to-point to the
//! parties involved, and most add a role-scoped system notice for the
//! participants who act on the event next. Delivery is fire-and-forget;
//! per-recipient failures are the registry's concern.

use std::sync::Arc;

use crate::domain::foundation::{Timestamp, UserAddress, UserRole};

use super::messages::{
    CropPurchasedMessage, CropRegisteredMessage, CropTransferredMessage, NotificationLevel,
    PriceUpdateMessage, QualityCheckMessage, RoleGrantedMessage, ServerMessage,
    SystemNotificationMessage,
};
use super::registry::ConnectionRegistry;

// ============================================
// Event Inputs
// ============================================

#[derive(Debug, Clone)]
pub struct CropRegisteredEvent {
    pub crop_id: u64,
    pub crop_name: String,
    pub farmer_address: UserAddress,
    pub batch_number: String,
    pub quantity: u64,
    pub price: u64,
}

#[derive(Debug, Clone)]
pub struct CropTransferredEvent {
    pub crop_id: u64,
    pub crop_name: String,
    pub from_address: UserAddress,
    pub to_address: UserAddress,
    pub note: String,
}

#[derive(Debug, Clone)]
pub struct CropPurchasedEvent {
    pub crop_id: u64,
    pub crop_name: String,
    pub buyer_address: UserAddress,
    pub amount: u64,
}

#[derive(Debug, Clone)]
pub struct RoleGrantedEvent {
    pub role: String,
    pub user_address: UserAddress,
    pub granted_by: UserAddress,
}

#[derive(Debug, Clone)]
pub struct SystemEvent {
    pub message: String,
    pub level: NotificationLevel,
    /// When set, only this role hears the notice.
    pub target_role: Option<UserRole>,
}

#[derive(Debug, Clone)]
pub struct PriceUpdateEvent {
    pub crop_id: u64,
    pub crop_name: String,
    pub old_price: u64,
    pub new_price: u64,
}

#[derive(Debug, Clone)]
pub struct QualityCheckEvent {
    pub crop_id: u64,
    pub crop_name: String,
    pub quality_score: u32,
    pub inspector: String,
    pub notes: String,
    /// Owner of the inspected crop; notified directly.
    pub farmer_address: UserAddress,
}

// ============================================
// Dispatcher
// ============================================

/// Translates supply-chain events into registry delivery calls.
pub struct NotificationDispatcher {
    registry: Arc<ConnectionRegistry>,
}

impl NotificationDispatcher {
    pub fn new(registry: Arc<ConnectionRegistry>) -> Self {
        Self { registry }
    }

    /// Everyone sees new crops; farmers additionally get a system notice.
    pub async fn notify_crop_registered(&self, event: CropRegisteredEvent) {
        let timestamp = Timestamp::now().to_rfc3339();
        let message = ServerMessage::CropRegistered(CropRegisteredMessage {
            crop_id: event.crop_id,
            crop_name: event.crop_name.clone(),
            farmer_address: event.farmer_address.to_string(),
            batch_number: event.batch_number,
            quantity: event.quantity,
            price: event.price,
            timestamp,
        });
        self.registry.broadcast_to_all(&message).await;

        let note = system_note(
            format!("New crop '{}' registered in the system", event.crop_name),
            NotificationLevel::Info,
        );
        self.registry.broadcast_to_role(&note, UserRole::Farmer).await;
        tracing::info!(crop_id = event.crop_id, "dispatched crop registration");
    }

    /// Both parties get the transfer directly; distributors and retailers
    /// get a system notice about movement in the chain.
    pub async fn notify_crop_transferred(&self, event: CropTransferredEvent) {
        let timestamp = Timestamp::now().to_rfc3339();
        let message = ServerMessage::CropTransferred(CropTransferredMessage {
            crop_id: event.crop_id,
            crop_name: event.crop_name.clone(),
            from_address: event.from_address.to_string(),
            to_address: event.to_address.to_string(),
            note: event.note,
            timestamp,
        });
        self.registry
            .send_to_identity(&message, &event.from_address)
            .await;
        self.registry
            .send_to_identity(&message, &event.to_address)
            .await;

        let note = system_note(
            format!("Crop '{}' transferred in supply chain", event.crop_name),
            NotificationLevel::Info,
        );
        self.registry
            .broadcast_to_role(&note, UserRole::Distributor)
            .await;
        self.registry
            .broadcast_to_role(&note, UserRole::Retailer)
            .await;
        tracing::info!(crop_id = event.crop_id, "dispatched crop transfer");
    }

    /// The buyer gets the purchase directly; farmers get the good news.
    pub async fn notify_crop_purchased(&self, event: CropPurchasedEvent) {
        let timestamp = Timestamp::now().to_rfc3339();
        let message = ServerMessage::CropPurchased(CropPurchasedMessage {
            crop_id: event.crop_id,
            crop_name: event.crop_name.clone(),
            buyer_address: event.buyer_address.to_string(),
            amount: event.amount,
            timestamp,
        });
        self.registry
            .send_to_identity(&message, &event.buyer_address)
            .await;

        let note = system_note(
            format!("Crop '{}' sold successfully!", event.crop_name),
            NotificationLevel::Success,
        );
        self.registry.broadcast_to_role(&note, UserRole::Farmer).await;
        tracing::info!(crop_id = event.crop_id, "dispatched crop purchase");
    }

    /// The grantee gets the grant directly; admins get an audit notice.
    pub async fn notify_role_granted(&self, event: RoleGrantedEvent) {
        let timestamp = Timestamp::now().to_rfc3339();
        let message = ServerMessage::RoleGranted(RoleGrantedMessage {
            role: event.role.clone(),
            user_address: event.user_address.to_string(),
            granted_by: event.granted_by.to_string(),
            timestamp,
        });
        self.registry
            .send_to_identity(&message, &event.user_address)
            .await;

        let note = system_note(
            format!("Role '{}' granted to user", event.role),
            NotificationLevel::Info,
        );
        self.registry.broadcast_to_role(&note, UserRole::Admin).await;
        tracing::info!(role = event.role, "dispatched role grant");
    }

    /// Targeted at one role when the event names one, otherwise everyone.
    pub async fn notify_system_event(&self, event: SystemEvent) {
        let message = system_note(event.message, event.level);
        match event.target_role {
            Some(role) => self.registry.broadcast_to_role(&message, role).await,
            None => self.registry.broadcast_to_all(&message).await,
        }
    }

    /// Price changes are market-wide information.
    pub async fn notify_price_update(&self, event: PriceUpdateEvent) {
        let timestamp = Timestamp::now().to_rfc3339();
        let message = ServerMessage::PriceUpdate(PriceUpdateMessage {
            crop_id: event.crop_id,
            crop_name: event.crop_name,
            old_price: event.old_price,
            new_price: event.new_price,
            timestamp,
        });
        self.registry.broadcast_to_all(&message).await;
    }

    /// The owning farmer plus the handling roles see inspection results.
    pub async fn notify_quality_check(&self, event: QualityCheckEvent) {
        let timestamp = Timestamp::now().to_rfc3339();
        let message = ServerMessage::QualityCheck(QualityCheckMessage {
            crop_id: event.crop_id,
            crop_name: event.crop_name,
            quality_score: event.quality_score,
            inspector: event.inspector,
            notes: event.notes,
            timestamp,
        });
        self.registry
            .send_to_identity(&message, &event.farmer_address)
            .await;
        self.registry
            .broadcast_to_role(&message, UserRole::Distributor)
            .await;
        self.registry
            .broadcast_to_role(&message, UserRole::Retailer)
            .await;
    }
}

fn system_note(message: String, level: NotificationLevel) -> ServerMessage {
    ServerMessage::SystemNotification(SystemNotificationMessage {
        message,
        level,
        timestamp: Timestamp::now().to_rfc3339(),
    })
}
