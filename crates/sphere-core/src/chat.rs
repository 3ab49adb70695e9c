//! Chat service: one user turn in, one reply out.
//!
//! Ties the session cache to the forwarder. A provider status listed in
//! `stale_session_statuses` means the billing headers were refused, so the
//! session is invalidated and the turn is retried once on a fresh session.

use std::sync::Arc;

use sphere_types::config::BrokerConfig;
use sphere_types::error::BrokerError;
use sphere_types::session::{ChatTurn, Session};

use crate::bootstrap::SessionBootstrapper;
use crate::cache::SessionCache;
use crate::forwarder::RequestForwarder;
use crate::ledger::LedgerClient;
use crate::transport::InferenceTransport;

pub struct ChatService<L, T> {
    cache: SessionCache<L>,
    forwarder: RequestForwarder<T>,
    stale_statuses: Vec<u16>,
}

impl<L, T> ChatService<L, T>
where
    L: LedgerClient + 'static,
    T: InferenceTransport,
{
    pub fn new(cache: SessionCache<L>, forwarder: RequestForwarder<T>, stale_statuses: Vec<u16>) -> Self {
        Self {
            cache,
            forwarder,
            stale_statuses,
        }
    }

    /// Wire the full pipeline from configuration.
    pub fn from_config(ledger: Arc<L>, transport: Arc<T>, config: &BrokerConfig) -> Self {
        let bootstrapper = SessionBootstrapper::new(ledger, config);
        Self::new(
            SessionCache::new(bootstrapper),
            RequestForwarder::new(transport, config.system_prompt.clone()),
            config.stale_session_statuses.clone(),
        )
    }

    pub fn cache(&self) -> &SessionCache<L> {
        &self.cache
    }

    pub fn forwarder(&self) -> &RequestForwarder<T> {
        &self.forwarder
    }

    /// Answer one chat turn.
    pub async fn respond(&self, turn: &ChatTurn) -> Result<String, BrokerError> {
        let session = self.cache.get().await?;
        match self.forwarder.forward(&session, turn).await {
            Err(BrokerError::ProviderError { status, .. }) if self.is_stale(status) => {
                tracing::warn!(
                    status,
                    provider = %session.provider_address,
                    "provider refused session headers, re-bootstrapping"
                );
                self.retry_on_fresh_session(&session, turn).await
            }
            other => other,
        }
    }

    async fn retry_on_fresh_session(&self, stale: &Session, turn: &ChatTurn) -> Result<String, BrokerError> {
        self.cache.invalidate(stale).await;
        let fresh = self.cache.get().await?;
        self.forwarder.forward(&fresh, turn).await
    }

    fn is_stale(&self, status: u16) -> bool {
        self.stale_statuses.contains(&status)
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::Ordering;

    use sphere_types::provider::ServiceType;

    use super::*;
    use crate::forwarder::FALLBACK_TEXT;
    use crate::testing::{MockLedger, MockTransport};
    use crate::transport::TransportResponse;

    fn service(ledger: MockLedger, transport: MockTransport) -> ChatService<MockLedger, MockTransport> {
        ChatService::from_config(Arc::new(ledger), Arc::new(transport), &BrokerConfig::default())
    }

    fn lists(svc: &ChatService<MockLedger, MockTransport>) -> u32 {
        svc.cache().bootstrapper().ledger().lists()
    }

    #[tokio::test]
    async fn test_two_turns_share_one_bootstrap() {
        let svc = service(MockLedger::single(), MockTransport::answering("Cells divide."));

        let first = svc.respond(&ChatTurn::new("mitosis?")).await.unwrap();
        let second = svc.respond(&ChatTurn::new("meiosis?")).await.unwrap();

        assert_eq!(first, "Cells divide.");
        assert_eq!(second, "Cells divide.");
        assert_eq!(lists(&svc), 1);
        assert_eq!(svc.forwarder().transport().call_count(), 2);
    }

    #[tokio::test]
    async fn test_refused_headers_rebootstrap_and_retry_once() {
        let transport = MockTransport::answering("Fresh answer.")
            .script(vec![Ok(TransportResponse::new(401, "billing header expired"))]);
        let svc = service(MockLedger::single(), transport);

        let text = svc.respond(&ChatTurn::new("hi")).await.unwrap();

        assert_eq!(text, "Fresh answer.");
        assert_eq!(lists(&svc), 2);
        let calls = svc.forwarder().transport().recorded();
        assert_eq!(calls.len(), 2);
        assert_eq!(calls[0].headers["Authorization"], "Bearer billing-token-1");
        assert_eq!(calls[1].headers["Authorization"], "Bearer billing-token-2");
    }

    #[tokio::test]
    async fn test_second_refusal_is_surfaced() {
        let transport = MockTransport::answering("unused").script(vec![
            Ok(TransportResponse::new(402, "insufficient balance")),
            Ok(TransportResponse::new(402, "insufficient balance")),
        ]);
        let svc = service(MockLedger::single(), transport);

        let err = svc.respond(&ChatTurn::new("hi")).await.unwrap_err();

        assert!(matches!(err, BrokerError::ProviderError { status: 402, .. }));
        assert_eq!(svc.forwarder().transport().call_count(), 2);
        assert_eq!(lists(&svc), 2);
    }

    #[tokio::test]
    async fn test_server_error_is_not_retried() {
        let transport = MockTransport::answering("unused")
            .script(vec![Ok(TransportResponse::new(503, "overloaded"))]);
        let svc = service(MockLedger::single(), transport);

        let err = svc.respond(&ChatTurn::new("hi")).await.unwrap_err();

        match err {
            BrokerError::ProviderError { status, body } => {
                assert_eq!(status, 503);
                assert_eq!(body, "overloaded");
            }
            other => panic!("expected ProviderError, got {other:?}"),
        }
        assert_eq!(svc.forwarder().transport().call_count(), 1);
        assert_eq!(lists(&svc), 1);
        assert!(svc.cache().peek().await.is_some());
    }

    #[tokio::test]
    async fn test_empty_registry_reaches_caller() {
        let svc = service(MockLedger::with_providers(vec![]), MockTransport::answering("unused"));

        let err = svc.respond(&ChatTurn::new("hi")).await.unwrap_err();

        assert!(matches!(err, BrokerError::NoProviderAvailable(ServiceType::Chatbot)));
        assert_eq!(svc.forwarder().transport().call_count(), 0);
    }

    #[tokio::test]
    async fn test_already_funded_account_still_answers() {
        let mut ledger = MockLedger::single();
        ledger.deposit_result = Ok(sphere_types::provider::ProvisionOutcome::AlreadyProvisioned);
        ledger.ack_result = Ok(sphere_types::provider::ProvisionOutcome::AlreadyProvisioned);
        let transport = MockTransport::answering("unused")
            .script(vec![Ok(TransportResponse::new(200, r#"{"choices":[{"message":{}}]}"#))]);
        let svc = service(ledger, transport);

        let text = svc.respond(&ChatTurn::new("hi")).await.unwrap();

        assert_eq!(text, FALLBACK_TEXT);
        assert_eq!(svc.cache().bootstrapper().ledger().ack_calls.load(Ordering::SeqCst), 1);
    }
}
