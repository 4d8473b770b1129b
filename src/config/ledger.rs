//! Ledger node configuration

use serde::Deserialize;

use super::error::ValidationError;

/// Configuration for the supply-chain ledger connection
#[derive(Debug, Clone, Deserialize)]
pub struct LedgerConfig {
    /// JSON-RPC endpoint of the ledger node
    #[serde(default = "default_rpc_url")]
    pub rpc_url: String,

    /// Deployed supply-chain contract address (0x-prefixed hex)
    pub contract_address: String,

    /// RPC request timeout in seconds
    #[serde(default = "default_request_timeout")]
    pub request_timeout_secs: u64,

    /// Delay between receipt polls in milliseconds
    #[serde(default = "default_receipt_poll_interval_ms")]
    pub receipt_poll_interval_ms: u64,

    /// How many times to poll for a receipt before giving up
    #[serde(default = "default_receipt_poll_attempts")]
    pub receipt_poll_attempts: u32,
}

impl LedgerConfig {
    /// Validate ledger configuration
    pub fn validate(&self) -> Result<(), ValidationError> {
        if !self.rpc_url.starts_with("http://") && !self.rpc_url.starts_with("https://") {
            return Err(ValidationError::InvalidRpcUrl {
                url: self.rpc_url.clone(),
            });
        }
        if !is_contract_address(&self.contract_address) {
            return Err(ValidationError::InvalidContractAddress {
                address: self.contract_address.clone(),
            });
        }
        if !(1..=120).contains(&self.request_timeout_secs) {
            return Err(ValidationError::InvalidTimeout);
        }
        if self.receipt_poll_interval_ms == 0 || self.receipt_poll_attempts == 0 {
            return Err(ValidationError::InvalidReceiptPolling);
        }
        Ok(())
    }
}

fn is_contract_address(address: &str) -> bool {
    let Some(hex_part) = address.strip_prefix("0x") else {
        return false;
    };
    hex_part.len() == 40 && hex_part.chars().all(|c| c.is_ascii_hexdigit())
}

fn default_rpc_url() -> String {
    "http://127.0.0.1:8545".to_string()
}

fn default_request_timeout() -> u64 {
    30
}

fn default_receipt_poll_interval_ms() -> u64 {
    500
}

fn default_receipt_poll_attempts() -> u32 {
    60
}
