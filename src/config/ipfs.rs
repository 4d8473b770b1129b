//! IPFS storage configuration

use secrecy::Secret;
use serde::Deserialize;

use super::error::ValidationError;

/// Configuration for content-addressed file storage
///
/// Two backends are supported: a self-hosted IPFS node reached through its
/// HTTP API, or the hosted Pinata pinning service. `use_pinata` selects
/// which one the gateway talks to.
#[derive(Debug, Clone, Deserialize)]
pub struct IpfsConfig {
    /// HTTP API endpoint of the local IPFS node
    #[serde(default = "default_api_url")]
    pub api_url: String,

    /// Public gateway used to render file URLs for the local node
    #[serde(default = "default_gateway_url")]
    pub gateway_url: String,

    /// Route uploads through Pinata instead of the local node
    #[serde(default)]
    pub use_pinata: bool,

    /// Pinata API key (required when `use_pinata` is set)
    pub pinata_api_key: Option<Secret<String>>,

    /// Pinata API secret (required when `use_pinata` is set)
    pub pinata_secret_key: Option<Secret<String>>,

    /// Public gateway used to render file URLs for Pinata
    #[serde(default = "default_pinata_gateway_url")]
    pub pinata_gateway_url: String,

    /// Upload request timeout in seconds
    #[serde(default = "default_request_timeout")]
    pub request_timeout_secs: u64,
}

impl IpfsConfig {
    /// Validate IPFS configuration
    pub fn validate(&self) -> Result<(), ValidationError> {
        for url in [&self.api_url, &self.gateway_url, &self.pinata_gateway_url] {
            if !url.starts_with("http://") && !url.starts_with("https://") {
                return Err(ValidationError::InvalidIpfsUrl { url: url.clone() });
            }
        }
        if self.use_pinata
            && (self.pinata_api_key.is_none() || self.pinata_secret_key.is_none())
        {
            return Err(ValidationError::MissingPinataCredentials);
        }
        if !(1..=120).contains(&self.request_timeout_secs) {
            return Err(ValidationError::InvalidTimeout);
        }
        Ok(())
    }
}

impl Default for IpfsConfig {
    fn default() -> Self {
        Self {
            api_url: default_api_url(),
            gateway_url: default_gateway_url(),
            use_pinata: false,
            pinata_api_key: None,
            pinata_secret_key: None,
            pinata_gateway_url: default_pinata_gateway_url(),
            request_timeout_secs: default_request_timeout(),
        }
    }
}

fn default_api_url() -> String {
    "http://127.0.0.1:5001".to_string()
}

fn default_gateway_url() -> String {
    "https://ipfs.io/ipfs".to_string()
}

fn default_pinata_gateway_url() -> String {
    "https://gateway.pinata.cloud/ipfs".to_string()
}

fn default_request_timeout() -> u64 {
    60
}
