//! Infrastructure layer for Sphere.
//!
//! Contains implementations of the port traits defined in `sphere-core`:
//! the JSON-RPC ledger client, the reqwest inference transport, request
//! signing (secp256k1 + Keccak-256), and the config/data-dir loaders.

pub mod config;
pub mod crypto;
pub mod filesystem;
pub mod inference;
pub mod ledger;
