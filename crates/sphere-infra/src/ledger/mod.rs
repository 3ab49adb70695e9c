//! Ledger gateway client.
//!
//! [`client::JsonRpcLedgerClient`] implements the `LedgerClient` port over
//! JSON-RPC 2.0. Wire types and response classification live in [`rpc`] so
//! they can be tested without a network.

pub mod client;
pub mod rpc;
