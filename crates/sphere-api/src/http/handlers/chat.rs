//! Chat endpoint.
//!
//! POST /chat
//!
//! Body: `{ "message": "...", "environmentHashes": ["0x..."], "useWebSearch": false }`.
//! Replies `200 { "text": "..." }`, or the uniform 500 error envelope.

use axum::Json;
use axum::extract::State;
use axum::extract::rejection::JsonRejection;
use serde::{Deserialize, Serialize};
use tracing::Instrument;

use sphere_observe::attrs::chat_span;
use sphere_types::session::ChatTurn;

use crate::http::error::AppError;
use crate::state::AppState;

/// Request body for the chat endpoint.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatRequest {
    pub message: String,
    /// Content-address references from the storage network.
    #[serde(default)]
    pub environment_hashes: Option<Vec<String>>,
    #[serde(default)]
    pub use_web_search: Option<bool>,
}

impl From<ChatRequest> for ChatTurn {
    fn from(request: ChatRequest) -> Self {
        ChatTurn::new(request.message)
            .with_context(request.environment_hashes.unwrap_or_default())
            .with_web_search(request.use_web_search.unwrap_or(false))
    }
}

#[derive(Debug, Serialize)]
pub struct ChatReply {
    pub text: String,
}

/// POST /chat: answer one user turn.
pub async fn chat(
    State(state): State<AppState>,
    payload: Result<Json<ChatRequest>, JsonRejection>,
) -> Result<Json<ChatReply>, AppError> {
    let Json(request) = payload?;
    let turn = ChatTurn::from(request);

    let request_id = uuid::Uuid::now_v7().to_string();
    let span = chat_span(&request_id, turn.context_references.len(), turn.use_web_search);

    let text = state
        .chat_service
        .respond(&turn)
        .instrument(span)
        .await?;

    Ok(Json(ChatReply { text }))
}
