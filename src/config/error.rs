//! Configuration error types

use thiserror::Error;

/// Errors that can occur while loading configuration
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Underlying configuration source error
    #[error("Failed to load configuration: {0}")]
    Load(#[from] config::ConfigError),
}

/// Errors from semantic validation of loaded configuration
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ValidationError {
    #[error("Server port must be non-zero")]
    InvalidPort,

    #[error("Server host does not form a bindable address: {host}")]
    InvalidHost { host: String },

    #[error("Request timeout must be between 1 and 120 seconds")]
    InvalidTimeout,

    #[error("Ledger RPC URL must start with http:// or https://: {url}")]
    InvalidRpcUrl { url: String },

    #[error("Contract address must be 0x-prefixed 20-byte hex: {address}")]
    InvalidContractAddress { address: String },

    #[error("Receipt polling needs a non-zero interval and attempt count")]
    InvalidReceiptPolling,

    #[error("IPFS URL must start with http:// or https://: {url}")]
    InvalidIpfsUrl { url: String },

    #[error("Pinata is enabled but API credentials are missing")]
    MissingPinataCredentials,

    #[error("Upload size limit must be non-zero")]
    InvalidUploadLimit,

    #[error("At least one upload file extension must be allowed")]
    NoAllowedExtensions,
}
