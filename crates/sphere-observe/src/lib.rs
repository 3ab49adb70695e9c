//! Observability for Sphere: subscriber setup and broker span helpers.

pub mod attrs;
pub mod tracing_setup;
