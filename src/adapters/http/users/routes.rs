//! HTTP routes for participant registration endpoints.

use axum::{
    routing::{get, post},
    Router,
};

use super::handlers::{get_user, list_users, register_user, UserHandlers};

/// Creates the users router, mounted at `/api/users`.
pub fn user_routes(handlers: UserHandlers) -> Router {
    Router::new()
        .route("/", get(list_users))
        .route("/register", post(register_user))
        .route("/:address", get(get_user))
        .with_state(handlers)
}
