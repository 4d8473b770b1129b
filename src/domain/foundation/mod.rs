//! Foundation module - Shared domain primitives.
//!
//! Contains value objects, identifiers, enums, and error types
//! that form the vocabulary of the AgriChain domain.

mod address;
mod content_hash;
mod errors;
mod role;
mod timestamp;

pub use address::UserAddress;
pub use content_hash::ContentHash;
pub use errors::ValidationError;
pub use role::UserRole;
pub use timestamp::Timestamp;
