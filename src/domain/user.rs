//! Registered participant profiles.

use serde::{Deserialize, Serialize};

use crate::domain::foundation::{Timestamp, UserAddress, UserRole, ValidationError};

/// Off-chain profile for a supply-chain participant.
///
/// Profiles are keyed by wallet address and record the self-declared role
/// a user registered with. Role grants on the ledger itself are announced
/// separately over the notification channel.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserProfile {
    pub address: UserAddress,
    pub name: String,
    pub email: String,
    pub role: UserRole,
    pub registered_at: Timestamp,
}

impl UserProfile {
    /// Creates a profile, validating name and email.
    pub fn new(
        address: UserAddress,
        name: impl Into<String>,
        email: impl Into<String>,
        role: UserRole,
    ) -> Result<Self, ValidationError> {
        let name = name.into();
        if name.trim().is_empty() {
            return Err(ValidationError::empty_field("name"));
        }
        let email = email.into();
        if email.trim().is_empty() {
            return Err(ValidationError::empty_field("email"));
        }
        if !email.contains('@') {
            return Err(ValidationError::invalid_format("email", "missing @ symbol"));
        }
        Ok(Self {
            address,
            name: name.trim().to_string(),
            email: email.trim().to_string(),
            role,
            registered_at: Timestamp::now(),
        })
    }
}
