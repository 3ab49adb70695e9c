//! HTTP layer for Sphere.
//!
//! Axum-based API: `POST /chat`, `GET /session`, `GET /health`, with CORS
//! and request tracing.

pub mod error;
pub mod handlers;
pub mod router;
