//! Ledger Gateway Port - Supply-chain contract interface.
//!
//! This port defines the contract for reading and mutating crop state on
//! the ledger. The domain depends on this trait, while adapters (like the
//! JSON-RPC client) provide the implementation.

use async_trait::async_trait;
use thiserror::Error;

use crate::domain::crop::{Crop, TransferRecord, TxReceipt};
use crate::domain::foundation::{ContentHash, Timestamp, UserAddress};

/// Port for supply-chain ledger operations.
///
/// # Contract
///
/// Implementations must:
/// - Treat the ledger as the single source of truth for crop state
/// - Wait for mutations to be mined before returning a receipt
/// - Surface reverted transactions as errors, never as success
/// - Map a read of an unknown crop id to [`LedgerError::CropNotFound`]
#[async_trait]
pub trait LedgerGateway: Send + Sync {
    /// Current block height, used as a liveness probe.
    async fn block_number(&self) -> Result<u64, LedgerError>;

    /// Registers a new crop owned by the requesting farmer.
    async fn register_crop(&self, request: RegisterCropRequest) -> Result<TxReceipt, LedgerError>;

    /// Transfers a crop to a new owner along the supply chain.
    async fn transfer_crop(&self, request: TransferCropRequest) -> Result<TxReceipt, LedgerError>;

    /// Purchases an available crop, sending `amount` wei with the call.
    async fn buy_crop(&self, request: BuyCropRequest) -> Result<TxReceipt, LedgerError>;

    /// Reads a single crop by id.
    async fn crop(&self, crop_id: u64) -> Result<Crop, LedgerError>;

    /// Reads every crop ever registered.
    async fn all_crops(&self) -> Result<Vec<Crop>, LedgerError>;

    /// Reads crops currently marked available for purchase.
    async fn available_crops(&self) -> Result<Vec<Crop>, LedgerError>;

    /// Reads crops currently owned by the given address.
    async fn crops_by_owner(&self, owner: &UserAddress) -> Result<Vec<Crop>, LedgerError>;

    /// Reads the ownership history of a crop, oldest entry first.
    async fn crop_history(&self, crop_id: u64) -> Result<Vec<TransferRecord>, LedgerError>;
}

/// Input for registering a crop on the ledger.
#[derive(Debug, Clone)]
pub struct RegisterCropRequest {
    /// Address the transaction is sent from; must hold the farmer role
    /// on the contract.
    pub farmer: UserAddress,
    pub name: String,
    pub quantity: u64,
    /// Asking price in wei.
    pub price: u64,
    pub batch_number: String,
    pub harvest_date: Timestamp,
    pub expiry_date: Timestamp,
    pub image_hash: Option<ContentHash>,
    pub certificate_hash: Option<ContentHash>,
    pub farm_location: String,
}

/// Input for transferring a crop to the next participant.
#[derive(Debug, Clone)]
pub struct TransferCropRequest {
    pub crop_id: u64,
    /// Current owner; the transaction is sent from this address.
    pub from: UserAddress,
    pub to: UserAddress,
    pub note: String,
    pub data_hash: Option<ContentHash>,
}

/// Input for purchasing a crop.
#[derive(Debug, Clone)]
pub struct BuyCropRequest {
    pub crop_id: u64,
    /// Buyer; the transaction is sent from this address with `amount`
    /// wei attached.
    pub buyer: UserAddress,
    pub amount: u64,
}

/// Errors that can occur during ledger operations.
#[derive(Debug, Clone, Error)]
pub enum LedgerError {
    /// The RPC endpoint could not be reached.
    #[error("Ledger node unreachable: {message}")]
    Unreachable { message: String },

    /// The RPC request timed out.
    #[error("Ledger request timed out")]
    Timeout,

    /// The node returned a JSON-RPC error.
    #[error("Ledger RPC error: {message}")]
    Rpc { message: String },

    /// The transaction was mined but reverted.
    #[error("Transaction {tx_hash} reverted")]
    TransactionReverted { tx_hash: String },

    /// No receipt appeared within the polling window.
    #[error("No receipt for transaction {tx_hash} within the polling window")]
    ReceiptTimeout { tx_hash: String },

    /// The requested crop does not exist on the ledger.
    #[error("Crop {crop_id} not found on the ledger")]
    CropNotFound { crop_id: u64 },

    /// An address could not be encoded for the contract.
    #[error("Invalid ledger address: {value}")]
    InvalidAddress { value: String },

    /// The node's response could not be decoded.
    #[error("Could not decode ledger response: {message}")]
    Decode { message: String },
}

impl LedgerError {
    /// Creates an unreachable node error.
    pub fn unreachable(message: impl Into<String>) -> Self {
        Self::Unreachable {
            message: message.into(),
        }
    }

    /// Creates an RPC error.
    pub fn rpc(message: impl Into<String>) -> Self {
        Self::Rpc {
            message: message.into(),
        }
    }

    /// Creates a reverted transaction error.
    pub fn reverted(tx_hash: impl Into<String>) -> Self {
        Self::TransactionReverted {
            tx_hash: tx_hash.into(),
        }
    }

    /// Creates a missing receipt error.
    pub fn receipt_timeout(tx_hash: impl Into<String>) -> Self {
        Self::ReceiptTimeout {
            tx_hash: tx_hash.into(),
        }
    }

    /// Creates a crop not found error.
    pub fn crop_not_found(crop_id: u64) -> Self {
        Self::CropNotFound { crop_id }
    }

    /// Creates an invalid address error.
    pub fn invalid_address(value: impl Into<String>) -> Self {
        Self::InvalidAddress {
            value: value.into(),
        }
    }

    /// Creates a decode error.
    pub fn decode(message: impl Into<String>) -> Self {
        Self::Decode {
            message: message.into(),
        }
    }
}
