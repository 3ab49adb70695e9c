use thiserror::Error;

use crate::provider::ServiceType;

/// Errors from ledger / registry operations.
///
/// "Already in the desired state" is not an error; provisioning calls report
/// it as [`crate::provider::ProvisionOutcome::AlreadyProvisioned`].
#[derive(Debug, Clone, Error)]
pub enum LedgerError {
    #[error("registry unavailable: {0}")]
    RegistryUnavailable(String),

    #[error("ledger rejected the call (code {code}): {message}")]
    Rejected { code: i64, message: String },

    #[error("malformed ledger response: {0}")]
    Malformed(String),
}

/// Errors surfaced by the broker pipeline for a single chat turn.
///
/// `Clone` so one shared bootstrap outcome can be handed to every caller
/// waiting on it.
#[derive(Debug, Clone, Error)]
pub enum BrokerError {
    #[error("registry unavailable: {0}")]
    RegistryUnavailable(String),

    #[error("no provider available for service type '{0}'")]
    NoProviderAvailable(ServiceType),

    #[error("bootstrap failed after {attempts} attempts: {source}")]
    BootstrapFailed {
        attempts: u32,
        source: Box<BrokerError>,
    },

    #[error("provider returned status {status}: {body}")]
    ProviderError { status: u16, body: String },

    #[error("malformed provider response: {0}")]
    MalformedResponse(String),

    #[error("inference request failed: {0}")]
    Transport(String),

    #[error(transparent)]
    Ledger(LedgerError),
}

impl From<LedgerError> for BrokerError {
    fn from(e: LedgerError) -> Self {
        match e {
            LedgerError::RegistryUnavailable(msg) => BrokerError::RegistryUnavailable(msg),
            other => BrokerError::Ledger(other),
        }
    }
}

/// Errors from loading broker configuration and credentials.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("missing required setting: {0}")]
    Missing(&'static str),

    #[error("invalid signing key: {0}")]
    InvalidSigningKey(String),

    #[error("invalid setting '{name}': {reason}")]
    Invalid { name: &'static str, reason: String },
}
