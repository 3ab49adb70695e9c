//! HttpInferenceTransport -- concrete [`InferenceTransport`] over reqwest.
//!
//! Sends the chat-completion body with exactly the headers it is given and
//! returns the raw status and body. Status interpretation is the
//! forwarder's job.

use std::collections::HashMap;
use std::time::Duration;

use reqwest::header::{HeaderMap, HeaderName, HeaderValue};

use sphere_core::transport::{InferenceTransport, TransportResponse};
use sphere_types::error::BrokerError;
use sphere_types::llm::ChatCompletionRequest;

pub struct HttpInferenceTransport {
    client: reqwest::Client,
}

impl HttpInferenceTransport {
    pub fn new(timeout: Duration) -> Result<Self, reqwest::Error> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self { client })
    }
}

/// Convert a string map into a [`HeaderMap`], rejecting names or values
/// that are not valid HTTP.
pub fn to_header_map(headers: &HashMap<String, String>) -> Result<HeaderMap, BrokerError> {
    let mut map = HeaderMap::with_capacity(headers.len());
    for (name, value) in headers {
        let header_name = HeaderName::from_bytes(name.as_bytes())
            .map_err(|e| BrokerError::Transport(format!("invalid header name '{name}': {e}")))?;
        let header_value = HeaderValue::from_str(value)
            .map_err(|e| BrokerError::Transport(format!("invalid value for header '{name}': {e}")))?;
        map.insert(header_name, header_value);
    }
    Ok(map)
}

impl InferenceTransport for HttpInferenceTransport {
    async fn send_completion(
        &self,
        url: &str,
        headers: &HashMap<String, String>,
        request: &ChatCompletionRequest,
    ) -> Result<TransportResponse, BrokerError> {
        let header_map = to_header_map(headers)?;
        let body = serde_json::to_vec(request)
            .map_err(|e| BrokerError::Transport(format!("failed to encode request: {e}")))?;

        let response = self
            .client
            .post(url)
            .headers(header_map)
            .body(body)
            .send()
            .await
            .map_err(|e| BrokerError::Transport(format!("HTTP request failed: {e}")))?;

        let status = response.status().as_u16();
        let body = response
            .text()
            .await
            .map_err(|e| BrokerError::Transport(format!("failed to read response body: {e}")))?;

        tracing::debug!(status, bytes = body.len(), "provider responded");
        Ok(TransportResponse { status, body })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_header_map_keeps_all_headers() {
        let headers = HashMap::from([
            ("Content-Type".to_string(), "application/json".to_string()),
            ("Authorization".to_string(), "Bearer t".to_string()),
        ]);
        let map = to_header_map(&headers).unwrap();
        assert_eq!(map.len(), 2);
        assert_eq!(map["content-type"], "application/json");
        assert_eq!(map["authorization"], "Bearer t");
    }

    #[test]
    fn test_header_map_rejects_invalid_values() {
        let headers = HashMap::from([("X-Bad".to_string(), "line\nbreak".to_string())]);
        assert!(matches!(to_header_map(&headers), Err(BrokerError::Transport(_))));

        let headers = HashMap::from([("bad name".to_string(), "v".to_string())]);
        assert!(to_header_map(&headers).is_err());
    }

    #[tokio::test]
    async fn test_unreachable_endpoint_is_transport_error() {
        let transport = HttpInferenceTransport::new(Duration::from_secs(5)).unwrap();
        let request = ChatCompletionRequest {
            model: "m".to_string(),
            messages: vec![],
            context_hashes: vec![],
            tools: None,
        };
        let err = transport
            .send_completion("http://127.0.0.1:1/chat/completions", &HashMap::new(), &request)
            .await
            .unwrap_err();
        assert!(matches!(err, BrokerError::Transport(_)));
    }
}
