//! JsonRpcLedgerClient -- concrete [`LedgerClient`] over JSON-RPC 2.0.
//!
//! Every call is signed by the account's [`LedgerSigner`]: the account
//! address and a recoverable signature over the method and its parameters
//! travel as request headers.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use serde_json::{Value, json};

use sphere_core::ledger::LedgerClient;
use sphere_types::amount::TokenAmount;
use sphere_types::error::LedgerError;
use sphere_types::provider::{
    FundingPurpose, ProviderAddress, ProviderRecord, ProvisionOutcome, ServiceMetadata,
    ServiceType,
};

use super::rpc::{self, RpcRequest, ServiceEntry};
use crate::crypto::signer::LedgerSigner;

/// Ledger gateway client.
///
/// Does NOT derive Debug; it owns the signing key.
pub struct JsonRpcLedgerClient {
    client: reqwest::Client,
    rpc_url: String,
    signer: LedgerSigner,
    next_id: AtomicU64,
}

impl JsonRpcLedgerClient {
    const TIMEOUT: Duration = Duration::from_secs(30);

    pub fn new(rpc_url: impl Into<String>, signer: LedgerSigner) -> Result<Self, reqwest::Error> {
        let client = reqwest::Client::builder().timeout(Self::TIMEOUT).build()?;
        Ok(Self {
            client,
            rpc_url: rpc_url.into(),
            signer,
            next_id: AtomicU64::new(1),
        })
    }

    pub fn rpc_url(&self) -> &str {
        &self.rpc_url
    }

    /// Issue one signed call and return its `result`.
    async fn call(&self, method: &str, params: Value) -> Result<Value, LedgerError> {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        let params_json = params.to_string();
        let signature = self.signer.sign_call(method, &params_json);
        let body = RpcRequest::new(id, method, &params);

        tracing::debug!(method, id, "ledger call");

        let response = self
            .client
            .post(&self.rpc_url)
            .header(rpc::ACCOUNT_HEADER, self.signer.address())
            .header(rpc::SIGNATURE_HEADER, signature)
            .json(&body)
            .send()
            .await
            .map_err(|e| LedgerError::RegistryUnavailable(format!("{method}: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            return Err(LedgerError::RegistryUnavailable(format!("{method}: HTTP {status}")));
        }

        let text = response
            .text()
            .await
            .map_err(|e| LedgerError::RegistryUnavailable(format!("{method}: {e}")))?;

        rpc::decode_envelope(method, &text)
    }

    async fn provision(&self, method: &str, params: Value) -> Result<ProvisionOutcome, LedgerError> {
        let outcome = rpc::provisioning_outcome(self.call(method, params).await);
        if let Ok(ProvisionOutcome::AlreadyProvisioned) = outcome {
            tracing::debug!(method, "ledger reports already provisioned");
        }
        outcome
    }
}

impl LedgerClient for JsonRpcLedgerClient {
    fn account(&self) -> &str {
        self.signer.address()
    }

    async fn list_providers(&self, service_type: &ServiceType) -> Result<Vec<ProviderRecord>, LedgerError> {
        let result = self.call(rpc::LIST_SERVICES, json!({})).await?;
        let entries: Vec<ServiceEntry> = rpc::decode_result(rpc::LIST_SERVICES, result)?;
        let total = entries.len();
        let records = rpc::filter_services(entries, service_type);
        tracing::debug!(total, matching = records.len(), %service_type, "registry listing");
        Ok(records)
    }

    async fn deposit_funds(&self, amount: TokenAmount) -> Result<ProvisionOutcome, LedgerError> {
        self.provision(
            rpc::DEPOSIT_FUND,
            json!({ "account": self.account(), "amount": amount }),
        )
        .await
    }

    async fn transfer_funds(
        &self,
        provider: &ProviderAddress,
        purpose: FundingPurpose,
        amount: TokenAmount,
    ) -> Result<ProvisionOutcome, LedgerError> {
        self.provision(
            rpc::TRANSFER_FUND,
            json!({
                "account": self.account(),
                "provider": provider,
                "purpose": purpose,
                "amount": amount,
            }),
        )
        .await
    }

    async fn acknowledge_signer(&self, provider: &ProviderAddress) -> Result<ProvisionOutcome, LedgerError> {
        self.provision(
            rpc::ACKNOWLEDGE_SIGNER,
            json!({ "account": self.account(), "provider": provider }),
        )
        .await
    }

    async fn get_metadata(&self, provider: &ProviderAddress) -> Result<ServiceMetadata, LedgerError> {
        let result = self
            .call(rpc::SERVICE_METADATA, json!({ "provider": provider }))
            .await?;
        rpc::decode_metadata(result)
    }

    async fn get_request_headers(
        &self,
        provider: &ProviderAddress,
    ) -> Result<HashMap<String, String>, LedgerError> {
        let result = self
            .call(
                rpc::REQUEST_HEADERS,
                json!({ "account": self.account(), "provider": provider }),
            )
            .await?;
        rpc::decode_headers(result)
    }
}
