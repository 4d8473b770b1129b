//! HTTP DTOs for participant registration endpoints.

use serde::{Deserialize, Serialize};

use crate::domain::user::UserProfile;

/// Request to register a participant profile.
#[derive(Debug, Clone, Deserialize)]
pub struct RegisterUserRequest {
    pub address: String,
    pub name: String,
    pub email: String,
    /// One of: admin, farmer, distributor, retailer, customer.
    pub role: String,
}

/// A participant profile as returned by the API.
#[derive(Debug, Clone, Serialize)]
pub struct UserProfileResponse {
    pub address: String,
    pub name: String,
    pub email: String,
    pub role: String,
    pub registered_at: String,
}

impl From<UserProfile> for UserProfileResponse {
    fn from(profile: UserProfile) -> Self {
        Self {
            address: profile.address.to_string(),
            name: profile.name,
            email: profile.email,
            role: profile.role.as_str().to_string(),
            registered_at: profile.registered_at.to_rfc3339(),
        }
    }
}

/// Response for a successful registration.
#[derive(Debug, Clone, Serialize)]
pub struct RegisterUserResponse {
    pub message: String,
    pub profile: UserProfileResponse,
}
