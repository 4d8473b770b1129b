//! Adapters - Implementations of port interfaces.
//!
//! Adapters connect the domain to external systems:
//! - `websocket` - Real-time notification core (registry, dispatcher, sessions)
//! - `ledger` - JSON-RPC client for the supply-chain contract
//! - `ipfs` - Content-addressed document storage
//! - `profile` - Filesystem persistence of participant profiles
//! - `http` - axum routers and handlers per resource group

pub mod http;
pub mod ipfs;
pub mod ledger;
pub mod profile;
pub mod websocket;
