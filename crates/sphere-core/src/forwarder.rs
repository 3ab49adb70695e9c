//! Request forwarding to the session's provider endpoint.

use std::collections::HashMap;
use std::sync::Arc;

use sphere_types::error::BrokerError;
use sphere_types::llm::{ChatCompletionRequest, ChatCompletionResponse, Message, ToolHint};
use sphere_types::session::{ChatTurn, Session};

use crate::transport::InferenceTransport;

/// Reply text used when the provider answers without any content.
pub const FALLBACK_TEXT: &str = "No response generated.";

/// Session billing headers plus a JSON content type, unless the session
/// already sets one.
pub fn request_headers(session: &Session) -> HashMap<String, String> {
    let mut headers = session.auth_headers.clone();
    if !headers.keys().any(|name| name.eq_ignore_ascii_case("content-type")) {
        headers.insert("Content-Type".to_string(), "application/json".to_string());
    }
    headers
}

/// Turns a [`ChatTurn`] into one chat-completion call against a [`Session`].
///
/// Never retries; staleness handling belongs to the caller.
pub struct RequestForwarder<T> {
    transport: Arc<T>,
    system_prompt: String,
}

impl<T: InferenceTransport> RequestForwarder<T> {
    pub fn new(transport: Arc<T>, system_prompt: impl Into<String>) -> Self {
        Self {
            transport,
            system_prompt: system_prompt.into(),
        }
    }

    pub fn transport(&self) -> &Arc<T> {
        &self.transport
    }

    /// Body sent to the provider for `turn`: system preamble, then the user
    /// message, with the context references passed through untouched.
    pub fn build_request(&self, session: &Session, turn: &ChatTurn) -> ChatCompletionRequest {
        ChatCompletionRequest {
            model: session.model.clone(),
            messages: vec![
                Message::system(self.system_prompt.clone()),
                Message::user(turn.user_message.clone()),
            ],
            context_hashes: turn.context_references.clone(),
            tools: turn.use_web_search.then(|| vec![ToolHint::web_search()]),
        }
    }

    /// Send `turn` to the provider and extract the reply text.
    pub async fn forward(&self, session: &Session, turn: &ChatTurn) -> Result<String, BrokerError> {
        let request = self.build_request(session, turn);
        let url = session.completions_url();

        let headers = request_headers(session);

        tracing::debug!(
            url = %url,
            model = %request.model,
            context_refs = request.context_hashes.len(),
            web_search = turn.use_web_search,
            "forwarding chat turn"
        );

        let response = self.transport.send_completion(&url, &headers, &request).await?;

        if !response.is_success() {
            tracing::warn!(status = response.status, provider = %session.provider_address, "provider returned error status");
            return Err(BrokerError::ProviderError {
                status: response.status,
                body: response.body,
            });
        }

        let parsed: ChatCompletionResponse = serde_json::from_str(&response.body)
            .map_err(|e| BrokerError::MalformedResponse(e.to_string()))?;

        match parsed.first_content() {
            Some(text) => Ok(text.to_string()),
            None => {
                tracing::warn!(provider = %session.provider_address, "provider reply had no content");
                Ok(FALLBACK_TEXT.to_string())
            }
        }
    }
}
