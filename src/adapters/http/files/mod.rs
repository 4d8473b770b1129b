//! Document upload endpoints.

pub mod dto;
pub mod handlers;
pub mod routes;

pub use handlers::FileHandlers;
pub use routes::file_routes;
