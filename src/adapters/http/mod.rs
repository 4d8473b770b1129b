//! HTTP adapters - axum routers, handlers, and DTOs per resource group.
//!
//! Each group follows the same layout: `dto` for the wire shapes,
//! `handlers` for the `State`-carrying handler functions and their
//! port-error → status mapping, `routes` for the router assembly.

pub mod crops;
pub mod error;
pub mod files;
pub mod notifications;
pub mod system;
pub mod users;

pub use error::ErrorResponse;
