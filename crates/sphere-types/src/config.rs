//! Broker configuration types.
//!
//! `BrokerConfig` represents the top-level `config.toml` that tunes how the
//! broker discovers, funds and talks to providers. Every field has a default
//! matching the behavior of the hosted study assistant, so an empty file (or
//! no file at all) yields a working configuration.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::amount::TokenAmount;
use crate::provider::ServiceType;

/// System preamble sent ahead of every user message.
pub const DEFAULT_SYSTEM_PROMPT: &str = "You are the StudySphere AI Assistant. Use the provided context hashes from 0G Storage to ground your answers. Be concise and helpful.";

/// Top-level configuration for the broker.
///
/// Loaded from `~/.sphere/config.toml`. All fields have sensible defaults.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BrokerConfig {
    /// Registry service kind to bootstrap against.
    #[serde(default)]
    pub service_type: ServiceType,

    /// Provider address to pin instead of taking the first listed provider.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub preferred_provider: Option<String>,

    /// Amount deposited into the ledger account during bootstrap.
    #[serde(default = "default_deposit_amount", with = "token_string")]
    pub deposit_amount: TokenAmount,

    /// Amount transferred to the selected provider for inference.
    #[serde(default = "default_transfer_amount", with = "token_string")]
    pub transfer_amount: TokenAmount,

    /// Retry policy for session bootstrap.
    #[serde(default)]
    pub bootstrap: BootstrapConfig,

    /// System preamble for every chat turn.
    #[serde(default = "default_system_prompt")]
    pub system_prompt: String,

    /// Timeout for a single inference call, in seconds.
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,

    /// Provider statuses that mean the cached billing headers were refused.
    #[serde(default = "default_stale_session_statuses")]
    pub stale_session_statuses: Vec<u16>,
}

/// Bootstrap retry policy: fixed delay, bounded attempts.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BootstrapConfig {
    /// Total attempts, including the first one.
    #[serde(default = "default_max_attempts")]
    pub max_attempts: u32,

    /// Delay between attempts in milliseconds.
    #[serde(default = "default_retry_delay_ms")]
    pub retry_delay_ms: u64,
}

impl BootstrapConfig {
    pub fn retry_delay(&self) -> Duration {
        Duration::from_millis(self.retry_delay_ms)
    }
}

fn default_deposit_amount() -> TokenAmount {
    TokenAmount::from_base_units(200_000_000_000_000_000)
}

fn default_transfer_amount() -> TokenAmount {
    TokenAmount::from_base_units(50_000_000_000_000_000)
}

fn default_system_prompt() -> String {
    DEFAULT_SYSTEM_PROMPT.to_string()
}

fn default_request_timeout_secs() -> u64 {
    120
}

fn default_stale_session_statuses() -> Vec<u16> {
    vec![401, 402, 403]
}

fn default_max_attempts() -> u32 {
    3
}

fn default_retry_delay_ms() -> u64 {
    2_000
}

impl Default for BootstrapConfig {
    fn default() -> Self {
        Self {
            max_attempts: default_max_attempts(),
            retry_delay_ms: default_retry_delay_ms(),
        }
    }
}

impl Default for BrokerConfig {
    fn default() -> Self {
        Self {
            service_type: ServiceType::default(),
            preferred_provider: None,
            deposit_amount: default_deposit_amount(),
            transfer_amount: default_transfer_amount(),
            bootstrap: BootstrapConfig::default(),
            system_prompt: default_system_prompt(),
            request_timeout_secs: default_request_timeout_secs(),
            stale_session_statuses: default_stale_session_statuses(),
        }
    }
}

/// Amounts in `config.toml` are written as decimal token strings (`"0.2"`).
mod token_string {
    use serde::{Deserialize, Deserializer, Serializer};

    use crate::amount::TokenAmount;

    pub fn serialize<S: Serializer>(amount: &TokenAmount, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&amount.to_string())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<TokenAmount, D::Error> {
        let raw = String::deserialize(deserializer)?;
        TokenAmount::parse_tokens(&raw).map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_broker_config_default_values() {
        let config = BrokerConfig::default();
        assert_eq!(config.service_type, ServiceType::Chatbot);
        assert_eq!(config.deposit_amount.to_string(), "0.2");
        assert_eq!(config.transfer_amount.to_string(), "0.05");
        assert_eq!(config.bootstrap.max_attempts, 3);
        assert_eq!(config.bootstrap.retry_delay(), Duration::from_secs(2));
        assert_eq!(config.stale_session_statuses, vec![401, 402, 403]);
    }

    #[test]
    fn test_broker_config_deserialize_with_defaults() {
        let config: BrokerConfig = toml::from_str("").unwrap();
        assert_eq!(config.system_prompt, DEFAULT_SYSTEM_PROMPT);
        assert_eq!(config.request_timeout_secs, 120);
        assert!(config.preferred_provider.is_none());
    }

    #[test]
    fn test_broker_config_deserialize_with_values() {
        let toml_str = r#"
service_type = "text-to-image"
preferred_provider = "0xf07240Efa67755B5311bc75784a061eDB47165Dd"
deposit_amount = "1.5"
transfer_amount = "0.1"
stale_session_statuses = [401]

[bootstrap]
max_attempts = 5
retry_delay_ms = 500
"#;
        let config: BrokerConfig = toml::from_str(toml_str).unwrap();
        assert_eq!(config.service_type, ServiceType::TextToImage);
        assert_eq!(config.deposit_amount.to_string(), "1.5");
        assert_eq!(config.transfer_amount.to_string(), "0.1");
        assert_eq!(config.bootstrap.max_attempts, 5);
        assert_eq!(config.bootstrap.retry_delay(), Duration::from_millis(500));
        assert_eq!(config.stale_session_statuses, vec![401]);
    }

    #[test]
    fn test_broker_config_rejects_bad_amount() {
        let result: Result<BrokerConfig, _> = toml::from_str(r#"deposit_amount = "lots""#);
        assert!(result.is_err());
    }
}
