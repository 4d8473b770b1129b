//! User identity as it appears on the supply-chain ledger.

use serde::{Deserialize, Serialize};
use std::fmt;

use super::errors::ValidationError;

/// Opaque wallet address identifying a participant.
///
/// The gateway treats addresses as stable strings: it never verifies a
/// signature or checksums the hex. Equality is byte-for-byte, so callers
/// that want case-insensitive matching must normalize first.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct UserAddress(String);

impl UserAddress {
    /// Creates an address from a raw string, rejecting empty input.
    pub fn new(raw: impl Into<String>) -> Result<Self, ValidationError> {
        let raw = raw.into();
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Err(ValidationError::empty_field("address"));
        }
        Ok(Self(trimmed.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Lowercased form used as a storage key.
    pub fn storage_key(&self) -> String {
        self.0.to_lowercase()
    }
}

impl fmt::Display for UserAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl std::str::FromStr for UserAddress {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}
