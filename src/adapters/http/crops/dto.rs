//! HTTP DTOs for crop endpoints.
//!
//! Dates cross the HTTP boundary as unix seconds, matching what the
//! contract stores; the WebSocket channel uses RFC 3339 instead because
//! its payloads are rendered for display.

use serde::{Deserialize, Serialize};

use crate::domain::crop::{Crop, TransferRecord, TxReceipt};

/// Request to register a new crop on the ledger.
#[derive(Debug, Clone, Deserialize)]
pub struct RegisterCropRequest {
    pub farmer_address: String,
    pub name: String,
    pub quantity: u64,
    /// Asking price in wei.
    pub price: u64,
    pub batch_number: String,
    /// Unix seconds.
    pub harvest_date: u64,
    /// Unix seconds.
    pub expiry_date: u64,
    pub image_hash: Option<String>,
    pub certificate_hash: Option<String>,
    pub farm_location: String,
}

/// Request to transfer a crop along the supply chain.
#[derive(Debug, Clone, Deserialize)]
pub struct TransferCropRequest {
    pub crop_id: u64,
    pub from_address: String,
    pub to_address: String,
    #[serde(default)]
    pub note: String,
    pub data_hash: Option<String>,
}

/// Request to buy an available crop.
#[derive(Debug, Clone, Deserialize)]
pub struct BuyCropRequest {
    pub buyer_address: String,
    /// Payment in wei, forwarded as the transaction value.
    pub amount: u64,
}

/// A crop as returned by the API.
#[derive(Debug, Clone, Serialize)]
pub struct CropResponse {
    pub id: u64,
    pub name: String,
    pub quantity: u64,
    pub price: u64,
    pub batch_number: String,
    pub harvest_date: u64,
    pub expiry_date: u64,
    pub image_hash: Option<String>,
    pub certificate_hash: Option<String>,
    pub farm_location: String,
    pub current_owner: String,
    pub available: bool,
    pub created_at: u64,
}

impl From<Crop> for CropResponse {
    fn from(crop: Crop) -> Self {
        Self {
            id: crop.id,
            name: crop.name,
            quantity: crop.quantity,
            price: crop.price,
            batch_number: crop.batch_number,
            harvest_date: crop.harvest_date.as_unix_secs(),
            expiry_date: crop.expiry_date.as_unix_secs(),
            image_hash: crop.image_hash.map(|h| h.to_string()),
            certificate_hash: crop.certificate_hash.map(|h| h.to_string()),
            farm_location: crop.farm_location,
            current_owner: crop.current_owner.to_string(),
            available: crop.available,
            created_at: crop.created_at.as_unix_secs(),
        }
    }
}

/// One ownership history entry as returned by the API.
#[derive(Debug, Clone, Serialize)]
pub struct TransferRecordResponse {
    pub from: String,
    pub to: String,
    pub timestamp: u64,
    pub note: String,
    pub data_hash: Option<String>,
}

impl From<TransferRecord> for TransferRecordResponse {
    fn from(record: TransferRecord) -> Self {
        Self {
            from: record.from.to_string(),
            to: record.to.to_string(),
            timestamp: record.timestamp.as_unix_secs(),
            note: record.note,
            data_hash: record.data_hash.map(|h| h.to_string()),
        }
    }
}

/// A mined transaction as returned by the API.
#[derive(Debug, Clone, Serialize)]
pub struct TxReceiptResponse {
    pub transaction_hash: String,
    pub block_number: u64,
    pub gas_used: u64,
}

impl From<TxReceipt> for TxReceiptResponse {
    fn from(receipt: TxReceipt) -> Self {
        Self {
            transaction_hash: receipt.transaction_hash,
            block_number: receipt.block_number,
            gas_used: receipt.gas_used,
        }
    }
}

/// Response for a successful crop registration.
#[derive(Debug, Clone, Serialize)]
pub struct RegisterCropResponse {
    pub message: String,
    pub receipt: TxReceiptResponse,
    /// Id the contract assigned, when the post-registration read found it.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub crop_id: Option<u64>,
}

/// Response for a successful transfer or purchase.
#[derive(Debug, Clone, Serialize)]
pub struct CropMutationResponse {
    pub message: String,
    pub receipt: TxReceiptResponse,
}
