//! Ledger adapters.
//!
//! [`json_rpc`] implements the gateway port against a contract node's
//! JSON-RPC endpoint; [`abi`] holds the call-data codec it speaks.

pub mod abi;
pub mod json_rpc;

pub use json_rpc::JsonRpcLedger;
