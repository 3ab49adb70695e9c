//! Inference transport port.
//!
//! The forwarder decides what to send; a transport only knows how to POST a
//! chat-completion body with a set of headers and hand back the raw status
//! and body. The reqwest implementation lives in sphere-infra.

use std::collections::HashMap;
use std::future::Future;
use std::pin::Pin;

use sphere_types::error::BrokerError;
use sphere_types::llm::ChatCompletionRequest;

/// Raw provider reply, before any status or body interpretation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransportResponse {
    pub status: u16,
    pub body: String,
}

impl TransportResponse {
    pub fn new(status: u16, body: impl Into<String>) -> Self {
        Self {
            status,
            body: body.into(),
        }
    }

    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// Sends one chat-completion request to a provider endpoint.
///
/// Returns `Err(BrokerError::Transport)` only when no HTTP response was
/// received at all. Non-2xx replies are returned as `Ok` so the caller can
/// classify them.
pub trait InferenceTransport: Send + Sync {
    fn send_completion(
        &self,
        url: &str,
        headers: &HashMap<String, String>,
        request: &ChatCompletionRequest,
    ) -> impl Future<Output = Result<TransportResponse, BrokerError>> + Send;
}

type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

/// Object-safe version of [`InferenceTransport`].
pub trait InferenceTransportDyn: Send + Sync {
    fn send_completion_boxed<'a>(
        &'a self,
        url: &'a str,
        headers: &'a HashMap<String, String>,
        request: &'a ChatCompletionRequest,
    ) -> BoxFuture<'a, Result<TransportResponse, BrokerError>>;
}

impl<T: InferenceTransport> InferenceTransportDyn for T {
    fn send_completion_boxed<'a>(
        &'a self,
        url: &'a str,
        headers: &'a HashMap<String, String>,
        request: &'a ChatCompletionRequest,
    ) -> BoxFuture<'a, Result<TransportResponse, BrokerError>> {
        Box::pin(self.send_completion(url, headers, request))
    }
}

/// Type-erased inference transport.
pub struct BoxInferenceTransport {
    inner: Box<dyn InferenceTransportDyn>,
}

impl BoxInferenceTransport {
    pub fn new<T: InferenceTransport + 'static>(transport: T) -> Self {
        Self {
            inner: Box::new(transport),
        }
    }
}

impl InferenceTransport for BoxInferenceTransport {
    async fn send_completion(
        &self,
        url: &str,
        headers: &HashMap<String, String>,
        request: &ChatCompletionRequest,
    ) -> Result<TransportResponse, BrokerError> {
        self.inner.send_completion_boxed(url, headers, request).await
    }
}
