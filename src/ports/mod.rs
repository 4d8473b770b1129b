//! Ports - Interfaces for external dependencies.
//!
//! Following hexagonal architecture, ports define the contracts between
//! the domain and the outside world. Adapters implement these ports.
//!
//! ## Ledger Ports
//!
//! - `LedgerGateway` - Reads and mutations against the supply-chain contract
//!
//! ## Storage Ports
//!
//! - `FileStore` - Content-addressed document storage (IPFS)
//! - `ProfileStore` - Durable participant profile persistence

mod file_store;
mod ledger;
mod profile_store;

pub use file_store::{FileStore, FileStoreError};
pub use ledger::{
    BuyCropRequest, LedgerError, LedgerGateway, RegisterCropRequest, TransferCropRequest,
};
pub use profile_store::{ProfileStore, ProfileStoreError};
