//! Session bootstrap: discover, fund, acknowledge, resolve, with bounded retry.
//!
//! One attempt runs the full pipeline against the ledger. Funding and
//! acknowledgement are best-effort: failures are logged and the attempt
//! carries on. Any other failure ends the attempt, and the attempt is
//! retried after a fixed delay.

use std::sync::Arc;

use chrono::Utc;
use sphere_types::amount::TokenAmount;
use sphere_types::config::{BootstrapConfig, BrokerConfig};
use sphere_types::error::BrokerError;
use sphere_types::provider::{FundingPurpose, ProviderRecord, ServiceType};
use sphere_types::session::Session;
use tracing::Instrument;

use crate::ledger::LedgerClient;
use crate::selector::{ProviderSelector, selector_for};

/// Builds [`Session`]s against the ledger.
pub struct SessionBootstrapper<L> {
    ledger: Arc<L>,
    selector: Box<dyn ProviderSelector>,
    service_type: ServiceType,
    deposit_amount: TokenAmount,
    transfer_amount: TokenAmount,
    retry: BootstrapConfig,
}

impl<L: LedgerClient> SessionBootstrapper<L> {
    /// Bootstrapper configured from `config`. A `preferred_provider` pins the
    /// selection; otherwise the first listed provider wins.
    pub fn new(ledger: Arc<L>, config: &BrokerConfig) -> Self {
        Self {
            ledger,
            selector: selector_for(config),
            service_type: config.service_type.clone(),
            deposit_amount: config.deposit_amount,
            transfer_amount: config.transfer_amount,
            retry: config.bootstrap.clone(),
        }
    }

    pub fn with_selector(mut self, selector: Box<dyn ProviderSelector>) -> Self {
        self.selector = selector;
        self
    }

    pub fn ledger(&self) -> &Arc<L> {
        &self.ledger
    }

    pub fn service_type(&self) -> &ServiceType {
        &self.service_type
    }

    /// Run the pipeline until it yields a session or the attempts run out.
    ///
    /// `NoProviderAvailable` is never retried.
    pub async fn bootstrap(&self) -> Result<Session, BrokerError> {
        let max_attempts = self.retry.max_attempts.max(1);
        let mut attempt: u32 = 1;

        loop {
            let span = tracing::info_span!(
                "bootstrap_attempt",
                attempt,
                max_attempts,
                service_type = %self.service_type,
            );
            match self.attempt_once().instrument(span).await {
                Ok(session) => {
                    tracing::info!(
                        provider = %session.provider_address,
                        endpoint = %session.endpoint,
                        model = %session.model,
                        attempt,
                        "session bootstrapped"
                    );
                    return Ok(session);
                }
                Err(e @ BrokerError::NoProviderAvailable(_)) => {
                    tracing::warn!(error = %e, "no provider available, not retrying");
                    return Err(e);
                }
                Err(e) if attempt >= max_attempts => {
                    tracing::error!(
                        attempts = attempt,
                        error = %e,
                        "bootstrap exhausted all attempts"
                    );
                    return Err(BrokerError::BootstrapFailed {
                        attempts: attempt,
                        source: Box::new(e),
                    });
                }
                Err(e) => {
                    tracing::warn!(
                        attempt,
                        max_attempts,
                        delay_ms = self.retry.retry_delay_ms,
                        error = %e,
                        "bootstrap attempt failed, retrying"
                    );
                    attempt += 1;
                    tokio::time::sleep(self.retry.retry_delay()).await;
                }
            }
        }
    }

    async fn attempt_once(&self) -> Result<Session, BrokerError> {
        let providers = self.ledger.list_providers(&self.service_type).await?;
        let chosen = self.choose(&providers)?;
        let address = chosen.address.clone();

        self.fund(chosen).await;

        match self.ledger.acknowledge_signer(&address).await {
            Ok(outcome) => tracing::info!(provider = %address, %outcome, "signer acknowledgement"),
            Err(e) => tracing::warn!(provider = %address, error = %e, "signer acknowledgement failed, continuing"),
        }

        let metadata = self.ledger.get_metadata(&address).await?;
        let auth_headers = self.ledger.get_request_headers(&address).await?;

        Ok(Session {
            provider_address: address,
            endpoint: metadata.endpoint,
            model: metadata.model,
            auth_headers,
            bootstrapped_at: Utc::now(),
        })
    }

    fn choose<'a>(&self, providers: &'a [ProviderRecord]) -> Result<&'a ProviderRecord, BrokerError> {
        tracing::debug!(
            count = providers.len(),
            selector = self.selector.name(),
            "registry listing received"
        );
        self.selector
            .select(providers)
            .ok_or_else(|| BrokerError::NoProviderAvailable(self.service_type.clone()))
    }

    /// Deposit, then transfer to the provider. A failed deposit skips the
    /// transfer for this attempt.
    async fn fund(&self, provider: &ProviderRecord) {
        match self.ledger.deposit_funds(self.deposit_amount).await {
            Ok(outcome) => {
                tracing::info!(amount = %self.deposit_amount, %outcome, "ledger deposit");
            }
            Err(e) => {
                tracing::warn!(
                    amount = %self.deposit_amount,
                    error = %e,
                    "ledger deposit failed, skipping provider transfer"
                );
                return;
            }
        }

        match self
            .ledger
            .transfer_funds(&provider.address, FundingPurpose::Inference, self.transfer_amount)
            .await
        {
            Ok(outcome) => tracing::info!(
                provider = %provider.address,
                amount = %self.transfer_amount,
                %outcome,
                "provider transfer"
            ),
            Err(e) => tracing::warn!(
                provider = %provider.address,
                amount = %self.transfer_amount,
                error = %e,
                "provider transfer failed, continuing"
            ),
        }
    }
}
