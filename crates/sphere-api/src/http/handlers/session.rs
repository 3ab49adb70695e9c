//! Session inspection endpoint.
//!
//! GET /session returns the cached session summary, or `{ "session": null }` when
//! nothing has been bootstrapped yet. Never bootstraps and never exposes
//! header values.

use axum::Json;
use axum::extract::State;
use serde::Serialize;

use sphere_types::session::SessionSummary;

use crate::state::AppState;

#[derive(Debug, Serialize)]
pub struct SessionReply {
    pub session: Option<SessionSummary>,
}

pub async fn get_session(State(state): State<AppState>) -> Json<SessionReply> {
    let session = state.chat_service.cache().peek().await;
    Json(SessionReply {
        session: session.map(|s| s.summary()),
    })
}
