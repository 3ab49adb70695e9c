//! Application error type mapping to the HTTP error envelope.
//!
//! Every failure on the chat route, including a body that does not parse,
//! becomes `500 { "error": ..., "details": ... }`. Only the display text of
//! the underlying error reaches the client.

use axum::Json;
use axum::extract::rejection::JsonRejection;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::Serialize;

use sphere_types::error::BrokerError;

/// Summary shown to clients for any chat failure.
pub const CHAT_FAILURE: &str = "Failed to connect to the compute network or perform inference.";

/// Application-level error that maps to HTTP responses.
#[derive(Debug)]
pub enum AppError {
    /// Broker pipeline failure.
    Broker(BrokerError),
    /// Request body could not be read as a chat request.
    InvalidBody(String),
}

impl From<BrokerError> for AppError {
    fn from(e: BrokerError) -> Self {
        AppError::Broker(e)
    }
}

impl From<JsonRejection> for AppError {
    fn from(e: JsonRejection) -> Self {
        AppError::InvalidBody(e.body_text())
    }
}

/// Wire shape of an error response.
#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub error: &'static str,
    pub details: String,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let details = match &self {
            AppError::Broker(e) => e.to_string(),
            AppError::InvalidBody(msg) => msg.clone(),
        };
        tracing::error!(details = %details, "chat request failed");

        (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(ErrorBody {
                error: CHAT_FAILURE,
                details,
            }),
        )
            .into_response()
    }
}
