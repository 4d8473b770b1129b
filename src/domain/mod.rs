//! Domain layer containing business logic and domain types.
//!
//! # Module Organization
//!
//! - `foundation` - Shared domain primitives (value objects, enums, errors)
//! - `crop` - Crop records and ownership history as read from the ledger
//! - `user` - Registered participant profiles

pub mod crop;
pub mod foundation;
pub mod user;
