//! AgriChain Gateway - HTTP/WebSocket gateway for a food supply chain ledger.
//!
//! Exposes crop state held by an on-chain supply contract over REST,
//! proxies document storage to IPFS, and fans supply-chain events out to
//! connected clients in real time over WebSockets.

pub mod adapters;
pub mod config;
pub mod domain;
pub mod ports;
