//! Session and chat turn types.
//!
//! A [`Session`] is the reusable result of bootstrapping against one provider:
//! where to send requests, which model to ask for, and the billing headers
//! that authorize the call. A [`ChatTurn`] is one user message plus the
//! document references it should be grounded in.

use std::collections::HashMap;
use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::provider::ProviderAddress;

/// A bootstrapped, reusable handle to one chosen provider.
///
/// Valid only for the provider it was bootstrapped against. The auth headers
/// may be single-use or time-boxed depending on the ledger's payment
/// primitive.
///
/// `Debug` prints header names only; header values authorize spending.
#[derive(Clone, PartialEq, Eq)]
pub struct Session {
    pub provider_address: ProviderAddress,
    pub endpoint: String,
    pub model: String,
    pub auth_headers: HashMap<String, String>,
    pub bootstrapped_at: DateTime<Utc>,
}

impl Session {
    /// URL of the provider's chat-completion route.
    pub fn completions_url(&self) -> String {
        format!("{}/chat/completions", self.endpoint.trim_end_matches('/'))
    }

    /// Header names, sorted, for logs and diagnostics.
    pub fn header_names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.auth_headers.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    /// Public view of the session with header values stripped.
    pub fn summary(&self) -> SessionSummary {
        SessionSummary {
            provider: self.provider_address.clone(),
            endpoint: self.endpoint.clone(),
            model: self.model.clone(),
            header_names: self.header_names().into_iter().map(str::to_string).collect(),
            bootstrapped_at: self.bootstrapped_at,
        }
    }
}

impl fmt::Debug for Session {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Session")
            .field("provider_address", &self.provider_address)
            .field("endpoint", &self.endpoint)
            .field("model", &self.model)
            .field("auth_headers", &self.header_names())
            .field("bootstrapped_at", &self.bootstrapped_at)
            .finish()
    }
}

/// Serializable, secret-free description of a cached session.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionSummary {
    pub provider: ProviderAddress,
    pub endpoint: String,
    pub model: String,
    pub header_names: Vec<String>,
    pub bootstrapped_at: DateTime<Utc>,
}

/// One user turn, supplied by the caller of the chat endpoint.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ChatTurn {
    pub user_message: String,
    /// Opaque content-address strings, forwarded to the provider unmodified.
    pub context_references: Vec<String>,
    /// Hint that the provider may use web search; not a guaranteed toggle.
    pub use_web_search: bool,
}

impl ChatTurn {
    pub fn new(user_message: impl Into<String>) -> Self {
        Self {
            user_message: user_message.into(),
            ..Default::default()
        }
    }

    pub fn with_context(mut self, references: Vec<String>) -> Self {
        self.context_references = references;
        self
    }

    pub fn with_web_search(mut self, enabled: bool) -> Self {
        self.use_web_search = enabled;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_session(endpoint: &str) -> Session {
        Session {
            provider_address: ProviderAddress::new("0xprovider"),
            endpoint: endpoint.to_string(),
            model: "llama-3.3-70b-instruct".to_string(),
            auth_headers: HashMap::from([
                ("X-Phala-Signature-Type".to_string(), "StandaloneApi".to_string()),
                ("Authorization".to_string(), "Bearer secret-billing-token".to_string()),
            ]),
            bootstrapped_at: Utc::now(),
        }
    }

    #[test]
    fn test_completions_url_trims_trailing_slash() {
        let session = sample_session("https://node.example/v1/proxy/");
        assert_eq!(
            session.completions_url(),
            "https://node.example/v1/proxy/chat/completions"
        );
    }

    #[test]
    fn test_debug_hides_header_values() {
        let session = sample_session("https://node.example");
        let debug = format!("{session:?}");
        assert!(debug.contains("Authorization"));
        assert!(!debug.contains("secret-billing-token"));
    }

    #[test]
    fn test_summary_serializes_camel_case_without_values() {
        let session = sample_session("https://node.example");
        let json = serde_json::to_value(session.summary()).unwrap();
        assert_eq!(json["provider"], "0xprovider");
        assert!(json.get("bootstrappedAt").is_some());
        assert_eq!(json["headerNames"][0], "Authorization");
        assert!(!json.to_string().contains("secret-billing-token"));
    }

    #[test]
    fn test_chat_turn_builder() {
        let turn = ChatTurn::new("What is osmosis?")
            .with_context(vec!["0xroot".to_string()])
            .with_web_search(true);
        assert_eq!(turn.context_references, vec!["0xroot"]);
        assert!(turn.use_web_search);
    }
}
