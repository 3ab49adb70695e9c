//! Configuration loading for Sphere.
//!
//! Broker tunables come from `config.toml` in the data directory
//! (`~/.sphere/` in production) and fall back to defaults when the file is
//! missing or malformed. Ledger credentials come from the environment (or
//! CLI flags) and are validated up front.

use std::fmt;
use std::path::Path;

use secrecy::SecretString;

use sphere_types::config::BrokerConfig;
use sphere_types::error::ConfigError;

use crate::crypto::signer::LedgerSigner;
use crate::filesystem::config_path;

pub const LEDGER_RPC_ENV: &str = "SPHERE_LEDGER_RPC";
pub const PRIVATE_KEY_ENV: &str = "SPHERE_PRIVATE_KEY";
pub const STORAGE_RPC_ENV: &str = "SPHERE_STORAGE_RPC";

/// Load broker configuration from `{data_dir}/config.toml`.
///
/// - If the file does not exist, returns [`BrokerConfig::default()`].
/// - If the file exists but fails to parse, logs a warning and returns the default.
/// - If the file exists and parses successfully, returns the parsed config.
pub async fn load_broker_config(data_dir: &Path) -> BrokerConfig {
    let config_path = config_path(data_dir);

    let content = match tokio::fs::read_to_string(&config_path).await {
        Ok(content) => content,
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
            tracing::debug!("No config.toml found at {}, using defaults", config_path.display());
            return BrokerConfig::default();
        }
        Err(err) => {
            tracing::warn!("Failed to read {}: {err}, using defaults", config_path.display());
            return BrokerConfig::default();
        }
    };

    match toml::from_str::<BrokerConfig>(&content) {
        Ok(config) => config,
        Err(err) => {
            tracing::warn!(
                "Failed to parse {}: {err}, using defaults",
                config_path.display()
            );
            BrokerConfig::default()
        }
    }
}

/// Ledger endpoint and credentials.
pub struct LedgerSettings {
    pub rpc_url: String,
    pub private_key: SecretString,
    /// Storage indexer RPC; only consumed by the document uploader.
    pub storage_rpc: Option<String>,
}

impl LedgerSettings {
    /// Validate settings gathered from flags or the environment.
    pub fn resolve(
        rpc_url: Option<String>,
        private_key: Option<SecretString>,
        storage_rpc: Option<String>,
    ) -> Result<Self, ConfigError> {
        let rpc_url = rpc_url
            .map(|url| url.trim().to_string())
            .filter(|url| !url.is_empty())
            .ok_or(ConfigError::Missing(LEDGER_RPC_ENV))?;
        if !(rpc_url.starts_with("http://") || rpc_url.starts_with("https://")) {
            return Err(ConfigError::Invalid {
                name: LEDGER_RPC_ENV,
                reason: format!("expected an http(s) URL, got '{rpc_url}'"),
            });
        }
        let private_key = private_key.ok_or(ConfigError::Missing(PRIVATE_KEY_ENV))?;

        Ok(Self {
            rpc_url,
            private_key,
            storage_rpc: storage_rpc.filter(|url| !url.trim().is_empty()),
        })
    }

    /// Build the request signer, validating the key.
    pub fn signer(&self) -> Result<LedgerSigner, ConfigError> {
        LedgerSigner::from_hex(&self.private_key)
    }
}

impl fmt::Debug for LedgerSettings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LedgerSettings")
            .field("rpc_url", &self.rpc_url)
            .field("private_key", &"[REDACTED]")
            .field("storage_rpc", &self.storage_rpc)
            .finish()
    }
}
