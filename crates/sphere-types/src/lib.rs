//! Shared domain types for the Sphere compute broker.
//!
//! This crate contains the core domain types used across the workspace:
//! provider records from the ledger registry, bootstrapped sessions, chat
//! turns, ledger amounts, broker configuration, and their error types.
//!
//! Zero infrastructure dependencies -- only serde, chrono, thiserror.

pub mod amount;
pub mod config;
pub mod error;
pub mod llm;
pub mod provider;
pub mod session;
