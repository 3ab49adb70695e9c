//! Hand-written port doubles shared by the core test modules.

use std::collections::{HashMap, VecDeque};
use std::sync::Mutex;
use std::sync::atomic::{AtomicU32, Ordering};
use std::time::Duration;

use sphere_types::amount::TokenAmount;
use sphere_types::error::{BrokerError, LedgerError};
use sphere_types::llm::ChatCompletionRequest;
use sphere_types::provider::{
    FundingPurpose, ProviderAddress, ProviderRecord, ProvisionOutcome, ServiceMetadata,
    ServiceType,
};

use crate::ledger::LedgerClient;
use crate::transport::{InferenceTransport, TransportResponse};

pub(crate) fn provider(address: &str) -> ProviderRecord {
    ProviderRecord {
        address: ProviderAddress::new(address),
        service_type: ServiceType::Chatbot,
        endpoint_url: format!("https://{address}.example"),
        model: Some("llama-3.3-70b-instruct".to_string()),
    }
}

pub(crate) fn unavailable() -> LedgerError {
    LedgerError::RegistryUnavailable("connection refused".to_string())
}

/// Scripted ledger. Listings are popped from `listings` until it runs dry,
/// after which `providers` is returned on every call.
pub(crate) struct MockLedger {
    pub providers: Vec<ProviderRecord>,
    pub listings: Mutex<VecDeque<Result<Vec<ProviderRecord>, LedgerError>>>,
    pub list_delay: Option<Duration>,
    pub deposit_result: Result<ProvisionOutcome, LedgerError>,
    pub transfer_result: Result<ProvisionOutcome, LedgerError>,
    pub ack_result: Result<ProvisionOutcome, LedgerError>,
    pub list_calls: AtomicU32,
    pub deposit_calls: AtomicU32,
    pub transfer_calls: AtomicU32,
    pub ack_calls: AtomicU32,
    pub header_calls: AtomicU32,
    pub transfers: Mutex<Vec<(ProviderAddress, FundingPurpose, TokenAmount)>>,
}

impl MockLedger {
    pub fn with_providers(providers: Vec<ProviderRecord>) -> Self {
        Self {
            providers,
            listings: Mutex::new(VecDeque::new()),
            list_delay: None,
            deposit_result: Ok(ProvisionOutcome::Applied),
            transfer_result: Ok(ProvisionOutcome::Applied),
            ack_result: Ok(ProvisionOutcome::Applied),
            list_calls: AtomicU32::new(0),
            deposit_calls: AtomicU32::new(0),
            transfer_calls: AtomicU32::new(0),
            ack_calls: AtomicU32::new(0),
            header_calls: AtomicU32::new(0),
            transfers: Mutex::new(Vec::new()),
        }
    }

    pub fn single() -> Self {
        Self::with_providers(vec![provider("0xaaa")])
    }

    /// Queue listing outcomes consumed before falling back to `providers`.
    pub fn script(self, outcomes: Vec<Result<Vec<ProviderRecord>, LedgerError>>) -> Self {
        *self.listings.lock().unwrap() = outcomes.into();
        self
    }

    pub fn lists(&self) -> u32 {
        self.list_calls.load(Ordering::SeqCst)
    }
}

impl LedgerClient for MockLedger {
    fn account(&self) -> &str {
        "0xmockaccount"
    }

    async fn list_providers(
        &self,
        _service_type: &ServiceType,
    ) -> Result<Vec<ProviderRecord>, LedgerError> {
        self.list_calls.fetch_add(1, Ordering::SeqCst);
        if let Some(delay) = self.list_delay {
            tokio::time::sleep(delay).await;
        }
        let scripted = self.listings.lock().unwrap().pop_front();
        scripted.unwrap_or_else(|| Ok(self.providers.clone()))
    }

    async fn deposit_funds(&self, _amount: TokenAmount) -> Result<ProvisionOutcome, LedgerError> {
        self.deposit_calls.fetch_add(1, Ordering::SeqCst);
        self.deposit_result.clone()
    }

    async fn transfer_funds(
        &self,
        provider: &ProviderAddress,
        purpose: FundingPurpose,
        amount: TokenAmount,
    ) -> Result<ProvisionOutcome, LedgerError> {
        self.transfer_calls.fetch_add(1, Ordering::SeqCst);
        self.transfers
            .lock()
            .unwrap()
            .push((provider.clone(), purpose, amount));
        self.transfer_result.clone()
    }

    async fn acknowledge_signer(
        &self,
        _provider: &ProviderAddress,
    ) -> Result<ProvisionOutcome, LedgerError> {
        self.ack_calls.fetch_add(1, Ordering::SeqCst);
        self.ack_result.clone()
    }

    async fn get_metadata(&self, provider: &ProviderAddress) -> Result<ServiceMetadata, LedgerError> {
        Ok(ServiceMetadata {
            endpoint: format!("https://{}.example/v1/proxy", provider.as_str()),
            model: "llama-3.3-70b-instruct".to_string(),
        })
    }

    /// Each call yields a distinct billing token so re-bootstrapped sessions
    /// can be told apart.
    async fn get_request_headers(
        &self,
        _provider: &ProviderAddress,
    ) -> Result<HashMap<String, String>, LedgerError> {
        let n = self.header_calls.fetch_add(1, Ordering::SeqCst) + 1;
        Ok(HashMap::from([(
            "Authorization".to_string(),
            format!("Bearer billing-token-{n}"),
        )]))
    }
}

/// A request as the transport saw it.
#[derive(Debug, Clone)]
pub(crate) struct RecordedCall {
    pub url: String,
    pub headers: HashMap<String, String>,
    pub request: ChatCompletionRequest,
}

/// Scripted transport. Replies are popped in order; once exhausted every
/// call gets `fallback`.
pub(crate) struct MockTransport {
    pub replies: Mutex<VecDeque<Result<TransportResponse, BrokerError>>>,
    pub fallback: TransportResponse,
    pub calls: Mutex<Vec<RecordedCall>>,
}

impl MockTransport {
    pub fn answering(content: &str) -> Self {
        let body = serde_json::json!({
            "choices": [{"message": {"role": "assistant", "content": content}}]
        });
        Self {
            replies: Mutex::new(VecDeque::new()),
            fallback: TransportResponse::new(200, body.to_string()),
            calls: Mutex::new(Vec::new()),
        }
    }

    pub fn script(self, replies: Vec<Result<TransportResponse, BrokerError>>) -> Self {
        *self.replies.lock().unwrap() = replies.into();
        self
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().unwrap().len()
    }

    pub fn recorded(&self) -> Vec<RecordedCall> {
        self.calls.lock().unwrap().clone()
    }
}

impl InferenceTransport for MockTransport {
    async fn send_completion(
        &self,
        url: &str,
        headers: &HashMap<String, String>,
        request: &ChatCompletionRequest,
    ) -> Result<TransportResponse, BrokerError> {
        self.calls.lock().unwrap().push(RecordedCall {
            url: url.to_string(),
            headers: headers.clone(),
            request: request.clone(),
        });
        let scripted = self.replies.lock().unwrap().pop_front();
        scripted.unwrap_or_else(|| Ok(self.fallback.clone()))
    }
}
