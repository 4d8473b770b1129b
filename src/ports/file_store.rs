//! File Store Port - Content-addressed file storage interface.
//!
//! This port defines the contract for storing supply-chain documents
//! (crop photos, quality certificates, transfer paperwork) on a
//! content-addressed store. Adapters talk to a local IPFS node or a
//! remote pinning service.

use async_trait::async_trait;
use thiserror::Error;

use crate::domain::foundation::ContentHash;

/// Port for content-addressed file storage.
///
/// # Contract
///
/// Implementations must:
/// - Return the content hash assigned by the store, not a local one
/// - Make `pin` idempotent: pinning an already-pinned hash succeeds
/// - Render gateway URLs without touching the network
#[async_trait]
pub trait FileStore: Send + Sync {
    /// Stores a file and returns its content hash.
    async fn store(&self, bytes: Vec<u8>, file_name: &str) -> Result<ContentHash, FileStoreError>;

    /// Pins a hash so the store retains it.
    async fn pin(&self, hash: &ContentHash) -> Result<(), FileStoreError>;

    /// Public gateway URL where the file can be fetched.
    fn file_url(&self, hash: &ContentHash) -> String;
}

/// Errors that can occur during file store operations.
#[derive(Debug, Clone, Error)]
pub enum FileStoreError {
    /// The storage node could not be reached.
    #[error("File store unavailable: {message}")]
    Unavailable { message: String },

    /// The storage request timed out.
    #[error("File store request timed out")]
    Timeout,

    /// The store rejected the upload.
    #[error("Upload rejected with status {status}: {message}")]
    Rejected { status: u16, message: String },

    /// The store's response could not be decoded.
    #[error("Could not decode file store response: {message}")]
    InvalidResponse { message: String },
}

impl FileStoreError {
    /// Creates an unavailable store error.
    pub fn unavailable(message: impl Into<String>) -> Self {
        Self::Unavailable {
            message: message.into(),
        }
    }

    /// Creates a rejected upload error.
    pub fn rejected(status: u16, message: impl Into<String>) -> Self {
        Self::Rejected {
            status,
            message: message.into(),
        }
    }

    /// Creates an invalid response error.
    pub fn invalid_response(message: impl Into<String>) -> Self {
        Self::InvalidResponse {
            message: message.into(),
        }
    }
}
