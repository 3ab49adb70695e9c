//! LedgerClient trait definition and its object-safe wrapper.
//!
//! The ledger is the registry of provider nodes and the payment primitive
//! that funds them. Implementations live in sphere-infra (e.g.,
//! `JsonRpcLedgerClient`).
//!
//! `BoxLedgerClient` follows the same blanket-impl pattern as
//! `BoxInferenceTransport`:
//! 1. Define an object-safe `LedgerClientDyn` trait with boxed futures
//! 2. Blanket-impl `LedgerClientDyn` for all `T: LedgerClient`
//! 3. `BoxLedgerClient` wraps `Box<dyn LedgerClientDyn>` and delegates

use std::collections::HashMap;
use std::future::Future;
use std::pin::Pin;

use sphere_types::amount::TokenAmount;
use sphere_types::error::LedgerError;
use sphere_types::provider::{
    FundingPurpose, ProviderAddress, ProviderRecord, ProvisionOutcome, ServiceMetadata,
    ServiceType,
};

/// Authenticated gateway to the provider registry and payment primitive.
///
/// Uses native async fn in traits (RPITIT). Futures are `Send` so a
/// bootstrap can run inside a shared, spawned future.
///
/// Transport failures are always returned as errors. Only "already in the
/// desired state" rejections of provisioning calls are absorbed, and those
/// come back as [`ProvisionOutcome::AlreadyProvisioned`].
pub trait LedgerClient: Send + Sync {
    /// Account address this client signs for.
    fn account(&self) -> &str;

    /// List registered providers offering `service_type`, in registry order.
    fn list_providers(
        &self,
        service_type: &ServiceType,
    ) -> impl Future<Output = Result<Vec<ProviderRecord>, LedgerError>> + Send;

    /// Deposit funds into the client's ledger account.
    fn deposit_funds(
        &self,
        amount: TokenAmount,
    ) -> impl Future<Output = Result<ProvisionOutcome, LedgerError>> + Send;

    /// Move funds from the ledger account to a provider sub-account.
    fn transfer_funds(
        &self,
        provider: &ProviderAddress,
        purpose: FundingPurpose,
        amount: TokenAmount,
    ) -> impl Future<Output = Result<ProvisionOutcome, LedgerError>> + Send;

    /// Register trust in the provider's signing key.
    fn acknowledge_signer(
        &self,
        provider: &ProviderAddress,
    ) -> impl Future<Output = Result<ProvisionOutcome, LedgerError>> + Send;

    /// Resolve the provider's serving endpoint and model.
    fn get_metadata(
        &self,
        provider: &ProviderAddress,
    ) -> impl Future<Output = Result<ServiceMetadata, LedgerError>> + Send;

    /// Fresh billing headers for a request to the provider.
    fn get_request_headers(
        &self,
        provider: &ProviderAddress,
    ) -> impl Future<Output = Result<HashMap<String, String>, LedgerError>> + Send;
}

type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

/// Object-safe version of [`LedgerClient`] with boxed futures.
///
/// This trait exists solely to enable dynamic dispatch (`dyn LedgerClientDyn`).
/// A blanket implementation is provided for all types implementing `LedgerClient`.
pub trait LedgerClientDyn: Send + Sync {
    fn account(&self) -> &str;

    fn list_providers_boxed<'a>(
        &'a self,
        service_type: &'a ServiceType,
    ) -> BoxFuture<'a, Result<Vec<ProviderRecord>, LedgerError>>;

    fn deposit_funds_boxed(&self, amount: TokenAmount)
    -> BoxFuture<'_, Result<ProvisionOutcome, LedgerError>>;

    fn transfer_funds_boxed<'a>(
        &'a self,
        provider: &'a ProviderAddress,
        purpose: FundingPurpose,
        amount: TokenAmount,
    ) -> BoxFuture<'a, Result<ProvisionOutcome, LedgerError>>;

    fn acknowledge_signer_boxed<'a>(
        &'a self,
        provider: &'a ProviderAddress,
    ) -> BoxFuture<'a, Result<ProvisionOutcome, LedgerError>>;

    fn get_metadata_boxed<'a>(
        &'a self,
        provider: &'a ProviderAddress,
    ) -> BoxFuture<'a, Result<ServiceMetadata, LedgerError>>;

    fn get_request_headers_boxed<'a>(
        &'a self,
        provider: &'a ProviderAddress,
    ) -> BoxFuture<'a, Result<HashMap<String, String>, LedgerError>>;
}

/// Blanket implementation: any `LedgerClient` automatically implements `LedgerClientDyn`.
impl<T: LedgerClient> LedgerClientDyn for T {
    fn account(&self) -> &str {
        LedgerClient::account(self)
    }

    fn list_providers_boxed<'a>(
        &'a self,
        service_type: &'a ServiceType,
    ) -> BoxFuture<'a, Result<Vec<ProviderRecord>, LedgerError>> {
        Box::pin(self.list_providers(service_type))
    }

    fn deposit_funds_boxed(
        &self,
        amount: TokenAmount,
    ) -> BoxFuture<'_, Result<ProvisionOutcome, LedgerError>> {
        Box::pin(self.deposit_funds(amount))
    }

    fn transfer_funds_boxed<'a>(
        &'a self,
        provider: &'a ProviderAddress,
        purpose: FundingPurpose,
        amount: TokenAmount,
    ) -> BoxFuture<'a, Result<ProvisionOutcome, LedgerError>> {
        Box::pin(self.transfer_funds(provider, purpose, amount))
    }

    fn acknowledge_signer_boxed<'a>(
        &'a self,
        provider: &'a ProviderAddress,
    ) -> BoxFuture<'a, Result<ProvisionOutcome, LedgerError>> {
        Box::pin(self.acknowledge_signer(provider))
    }

    fn get_metadata_boxed<'a>(
        &'a self,
        provider: &'a ProviderAddress,
    ) -> BoxFuture<'a, Result<ServiceMetadata, LedgerError>> {
        Box::pin(self.get_metadata(provider))
    }

    fn get_request_headers_boxed<'a>(
        &'a self,
        provider: &'a ProviderAddress,
    ) -> BoxFuture<'a, Result<HashMap<String, String>, LedgerError>> {
        Box::pin(self.get_request_headers(provider))
    }
}

/// Type-erased ledger client for runtime wiring.
///
/// Lets the application state hold one concrete type whether the ledger is
/// the JSON-RPC client or a test double.
pub struct BoxLedgerClient {
    inner: Box<dyn LedgerClientDyn>,
}

impl BoxLedgerClient {
    /// Wrap a concrete `LedgerClient` in a type-erased box.
    pub fn new<T: LedgerClient + 'static>(client: T) -> Self {
        Self {
            inner: Box::new(client),
        }
    }
}

impl LedgerClient for BoxLedgerClient {
    fn account(&self) -> &str {
        self.inner.account()
    }

    async fn list_providers(
        &self,
        service_type: &ServiceType,
    ) -> Result<Vec<ProviderRecord>, LedgerError> {
        self.inner.list_providers_boxed(service_type).await
    }

    async fn deposit_funds(&self, amount: TokenAmount) -> Result<ProvisionOutcome, LedgerError> {
        self.inner.deposit_funds_boxed(amount).await
    }

    async fn transfer_funds(
        &self,
        provider: &ProviderAddress,
        purpose: FundingPurpose,
        amount: TokenAmount,
    ) -> Result<ProvisionOutcome, LedgerError> {
        self.inner.transfer_funds_boxed(provider, purpose, amount).await
    }

    async fn acknowledge_signer(
        &self,
        provider: &ProviderAddress,
    ) -> Result<ProvisionOutcome, LedgerError> {
        self.inner.acknowledge_signer_boxed(provider).await
    }

    async fn get_metadata(&self, provider: &ProviderAddress) -> Result<ServiceMetadata, LedgerError> {
        self.inner.get_metadata_boxed(provider).await
    }

    async fn get_request_headers(
        &self,
        provider: &ProviderAddress,
    ) -> Result<HashMap<String, String>, LedgerError> {
        self.inner.get_request_headers_boxed(provider).await
    }
}
