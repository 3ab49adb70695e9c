//! Provider selection policies.
//!
//! The registry listing arrives in registry order. A selector picks one
//! record from it; bootstrap treats `None` as "no provider available".

use sphere_types::config::BrokerConfig;
use sphere_types::provider::{ProviderAddress, ProviderRecord};

/// Chooses a provider from a registry listing.
pub trait ProviderSelector: Send + Sync {
    /// Policy name, for logs.
    fn name(&self) -> &str;

    fn select<'a>(&self, providers: &'a [ProviderRecord]) -> Option<&'a ProviderRecord>;
}

/// Picks the first provider in registry order.
#[derive(Debug, Clone, Copy, Default)]
pub struct FirstListed;

impl ProviderSelector for FirstListed {
    fn name(&self) -> &str {
        "first-listed"
    }

    fn select<'a>(&self, providers: &'a [ProviderRecord]) -> Option<&'a ProviderRecord> {
        providers.first()
    }
}

/// Picks one specific provider, matched case-insensitively by address.
///
/// Selects nothing when the pinned provider is not in the listing.
#[derive(Debug, Clone)]
pub struct PinnedSelector {
    address: ProviderAddress,
}

impl PinnedSelector {
    pub fn new(address: impl Into<String>) -> Self {
        Self {
            address: ProviderAddress::new(address),
        }
    }
}

impl ProviderSelector for PinnedSelector {
    fn name(&self) -> &str {
        "pinned"
    }

    fn select<'a>(&self, providers: &'a [ProviderRecord]) -> Option<&'a ProviderRecord> {
        providers
            .iter()
            .find(|record| record.address.matches(self.address.as_str()))
    }
}

/// Selection policy for `config`: pinned when `preferred_provider` is set,
/// first listed otherwise.
pub fn selector_for(config: &BrokerConfig) -> Box<dyn ProviderSelector> {
    match &config.preferred_provider {
        Some(address) => Box::new(PinnedSelector::new(address.clone())),
        None => Box::new(FirstListed),
    }
}
