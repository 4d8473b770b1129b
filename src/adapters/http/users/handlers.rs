//! HTTP handlers for participant registration endpoints.

use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};

use crate::adapters::http::error::ErrorResponse;
use crate::domain::foundation::{UserAddress, UserRole};
use crate::domain::user::UserProfile;
use crate::ports::{ProfileStore, ProfileStoreError};

use super::dto::{RegisterUserRequest, RegisterUserResponse, UserProfileResponse};

#[derive(Clone)]
pub struct UserHandlers {
    profiles: Arc<dyn ProfileStore>,
}

impl UserHandlers {
    pub fn new(profiles: Arc<dyn ProfileStore>) -> Self {
        Self { profiles }
    }
}

/// POST /api/users/register - Register a participant profile
///
/// Registering an address that already has a profile overwrites it; the
/// profile store keeps the latest version.
pub async fn register_user(
    State(handlers): State<UserHandlers>,
    Json(req): Json<RegisterUserRequest>,
) -> Response {
    let address = match UserAddress::new(req.address) {
        Ok(address) => address,
        Err(error) => {
            return (
                StatusCode::BAD_REQUEST,
                Json(ErrorResponse::bad_request(error.to_string())),
            )
                .into_response();
        }
    };
    let Ok(role) = req.role.parse::<UserRole>() else {
        return (
            StatusCode::BAD_REQUEST,
            Json(ErrorResponse::bad_request(format!(
                "Unknown role '{}'",
                req.role
            ))),
        )
            .into_response();
    };
    let profile = match UserProfile::new(address, req.name, req.email, role) {
        Ok(profile) => profile,
        Err(error) => {
            return (
                StatusCode::BAD_REQUEST,
                Json(ErrorResponse::bad_request(error.to_string())),
            )
                .into_response();
        }
    };

    match handlers.profiles.save(profile.clone()).await {
        Ok(()) => {
            tracing::info!(address = %profile.address, role = profile.role.as_str(), "participant registered");
            let response = RegisterUserResponse {
                message: "User registered successfully".to_string(),
                profile: profile.into(),
            };
            (StatusCode::CREATED, Json(response)).into_response()
        }
        Err(e) => handle_profile_error(e),
    }
}

/// GET /api/users/{address} - Fetch one participant profile
pub async fn get_user(
    State(handlers): State<UserHandlers>,
    Path(address): Path<String>,
) -> Response {
    let parsed = match UserAddress::new(address.clone()) {
        Ok(parsed) => parsed,
        Err(error) => {
            return (
                StatusCode::BAD_REQUEST,
                Json(ErrorResponse::bad_request(error.to_string())),
            )
                .into_response();
        }
    };

    match handlers.profiles.load(&parsed).await {
        Ok(Some(profile)) => {
            (StatusCode::OK, Json(UserProfileResponse::from(profile))).into_response()
        }
        Ok(None) => (
            StatusCode::NOT_FOUND,
            Json(ErrorResponse::not_found("User", &address)),
        )
            .into_response(),
        Err(e) => handle_profile_error(e),
    }
}

/// GET /api/users - List every registered participant
pub async fn list_users(State(handlers): State<UserHandlers>) -> Response {
    match handlers.profiles.load_all().await {
        Ok(profiles) => {
            let body: Vec<UserProfileResponse> =
                profiles.into_iter().map(UserProfileResponse::from).collect();
            (StatusCode::OK, Json(body)).into_response()
        }
        Err(e) => handle_profile_error(e),
    }
}

fn handle_profile_error(error: ProfileStoreError) -> Response {
    tracing::error!(%error, "profile store operation failed");
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(ErrorResponse::internal(error.to_string())),
    )
        .into_response()
}
