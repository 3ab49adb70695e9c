//! Cryptographic operations for Sphere.
//!
//! - `signer`: secp256k1 request signing and Keccak-256 account addresses

pub mod signer;
