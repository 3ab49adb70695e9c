//! Broker logic and port trait definitions for the Sphere compute broker.
//!
//! This crate defines the "ports" (ledger client, inference transport,
//! provider selection) that the infrastructure layer implements, and the
//! session pipeline built on top of them: bootstrap, cache, forward, chat.
//! It depends only on `sphere-types` -- never on `sphere-infra` or any
//! HTTP/IO crate.

pub mod bootstrap;
pub mod cache;
pub mod chat;
pub mod forwarder;
pub mod ledger;
pub mod selector;
pub mod transport;

#[cfg(test)]
pub(crate) mod testing;
