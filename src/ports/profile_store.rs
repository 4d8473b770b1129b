//! Profile Store Port - Participant profile persistence interface.

use async_trait::async_trait;
use thiserror::Error;

use crate::domain::foundation::UserAddress;
use crate::domain::user::UserProfile;

/// Port for persisting off-chain participant profiles.
///
/// # Contract
///
/// Implementations must:
/// - Key profiles by lowercased address, so lookups are case-insensitive
/// - Overwrite on save: registering the same address twice keeps the
///   latest profile
/// - Survive process restarts (profiles are durable, not cached state)
#[async_trait]
pub trait ProfileStore: Send + Sync {
    /// Saves a profile, replacing any existing one for the same address.
    async fn save(&self, profile: UserProfile) -> Result<(), ProfileStoreError>;

    /// Loads the profile for an address, if one was registered.
    async fn load(&self, address: &UserAddress) -> Result<Option<UserProfile>, ProfileStoreError>;

    /// Loads every registered profile.
    async fn load_all(&self) -> Result<Vec<UserProfile>, ProfileStoreError>;

    /// Whether a profile exists for the address.
    async fn exists(&self, address: &UserAddress) -> Result<bool, ProfileStoreError>;
}

/// Errors that can occur during profile persistence.
#[derive(Debug, Error)]
pub enum ProfileStoreError {
    /// IO error reading or writing the backing store.
    #[error("Profile store IO error: {message}")]
    Io { message: String },

    /// The stored document could not be parsed.
    #[error("Profile store corrupt: {message}")]
    Corrupt { message: String },
}

impl ProfileStoreError {
    /// Creates an IO error.
    pub fn io(message: impl Into<String>) -> Self {
        Self::Io {
            message: message.into(),
        }
    }

    /// Creates a corrupt store error.
    pub fn corrupt(message: impl Into<String>) -> Self {
        Self::Corrupt {
            message: message.into(),
        }
    }
}

impl From<std::io::Error> for ProfileStoreError {
    fn from(err: std::io::Error) -> Self {
        ProfileStoreError::io(err.to_string())
    }
}

impl From<serde_json::Error> for ProfileStoreError {
    fn from(err: serde_json::Error) -> Self {
        ProfileStoreError::corrupt(err.to_string())
    }
}
