//! Crop records as read from the supply-chain ledger.
//!
//! The ledger contract is the source of truth for all crop state. These
//! types mirror what the contract stores; the gateway never mutates them
//! locally, it only decodes them from call results.

use serde::{Deserialize, Serialize};

use crate::domain::foundation::{ContentHash, Timestamp, UserAddress};

/// A crop registered on the ledger.
///
/// Quantities are whole units, prices are in wei. The optional hashes
/// reference supporting documents on IPFS; the contract stores an empty
/// string when none was provided.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Crop {
    pub id: u64,
    pub name: String,
    pub quantity: u64,
    pub price: u64,
    pub batch_number: String,
    pub harvest_date: Timestamp,
    pub expiry_date: Timestamp,
    pub image_hash: Option<ContentHash>,
    pub certificate_hash: Option<ContentHash>,
    pub farm_location: String,
    pub current_owner: UserAddress,
    pub available: bool,
    pub created_at: Timestamp,
}

impl Crop {
    /// Whether the crop has passed its recorded expiry date.
    pub fn is_expired_at(&self, now: Timestamp) -> bool {
        self.expiry_date.is_before(&now)
    }
}

/// One entry in a crop's ownership history.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransferRecord {
    pub from: UserAddress,
    pub to: UserAddress,
    pub timestamp: Timestamp,
    pub note: String,
    pub data_hash: Option<ContentHash>,
}

/// Receipt for a mined ledger transaction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TxReceipt {
    pub transaction_hash: String,
    pub block_number: u64,
    pub gas_used: u64,
    pub succeeded: bool,
}
