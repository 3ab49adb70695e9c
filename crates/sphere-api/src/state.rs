//! Application state wiring the broker together.
//!
//! AppState holds the concrete service instances used by both the CLI and
//! the HTTP server. The chat service is generic over its ledger and
//! transport ports; AppState pins it to the type-erased wrappers so tests
//! can wire in doubles without a second state type.

use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;

use sphere_core::chat::ChatService;
use sphere_core::ledger::{BoxLedgerClient, LedgerClient};
use sphere_core::transport::BoxInferenceTransport;
use sphere_infra::config::{LedgerSettings, load_broker_config};
use sphere_infra::filesystem::resolve_data_dir;
use sphere_infra::inference::HttpInferenceTransport;
use sphere_infra::ledger::client::JsonRpcLedgerClient;
use sphere_types::config::BrokerConfig;

/// Concrete chat service pinned to the boxed ports.
pub type ConcreteChatService = ChatService<BoxLedgerClient, BoxInferenceTransport>;

/// Shared application state.
///
/// The session cache lives inside `chat_service`; cloning the state shares it.
#[derive(Clone)]
pub struct AppState {
    pub chat_service: Arc<ConcreteChatService>,
    pub ledger: Arc<BoxLedgerClient>,
    pub transport: Arc<BoxInferenceTransport>,
    pub config: Arc<BrokerConfig>,
}

impl AppState {
    /// Load configuration and connect the ledger and provider clients.
    pub async fn init(settings: &LedgerSettings) -> anyhow::Result<Self> {
        let data_dir = resolve_data_dir();
        let config = load_broker_config(&data_dir).await;

        let signer = settings.signer()?;
        let ledger = JsonRpcLedgerClient::new(settings.rpc_url.clone(), signer)
            .context("failed to build ledger HTTP client")?;
        let transport = HttpInferenceTransport::new(Duration::from_secs(config.request_timeout_secs))
            .context("failed to build provider HTTP client")?;

        tracing::info!(
            account = ledger.account(),
            rpc_url = ledger.rpc_url(),
            service_type = %config.service_type,
            data_dir = %data_dir.display(),
            "broker initialized"
        );

        Ok(Self::from_parts(
            BoxLedgerClient::new(ledger),
            BoxInferenceTransport::new(transport),
            config,
        ))
    }

    /// Wire the state from already-built ports.
    pub fn from_parts(
        ledger: BoxLedgerClient,
        transport: BoxInferenceTransport,
        config: BrokerConfig,
    ) -> Self {
        let ledger = Arc::new(ledger);
        let transport = Arc::new(transport);
        let chat_service =
            ChatService::from_config(Arc::clone(&ledger), Arc::clone(&transport), &config);

        Self {
            chat_service: Arc::new(chat_service),
            ledger,
            transport,
            config: Arc::new(config),
        }
    }
}
