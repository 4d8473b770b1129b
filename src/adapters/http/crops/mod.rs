//! Crop registration, transfer, purchase, and query endpoints.

pub mod dto;
pub mod handlers;
pub mod routes;

pub use handlers::CropHandlers;
pub use routes::crop_routes;
