//! Content-addressed file storage adapters.

pub mod client;

pub use client::IpfsClient;
