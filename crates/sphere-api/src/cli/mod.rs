//! CLI command definitions for the `sphere` binary.
//!
//! Uses clap derive macros for argument parsing. Ledger credentials can come
//! from flags or the environment; commands that never touch the ledger
//! (`config`, `completions`) run without them.

pub mod ask;
pub mod config;
pub mod probe;
pub mod providers;

use clap::{Args, Parser, Subcommand};
use clap_complete::Shell;
use secrecy::SecretString;

use sphere_infra::config::LedgerSettings;
use sphere_types::error::ConfigError;
use sphere_types::provider::ServiceType;

/// Chat with the decentralized compute network.
#[derive(Parser)]
#[command(name = "sphere", version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Output machine-readable JSON instead of styled text.
    #[arg(long, global = true)]
    pub json: bool,

    /// Log errors only. Command results are still printed.
    #[arg(long, global = true)]
    pub quiet: bool,

    /// Detailed output (-v for verbose, -vv for debug/trace).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Export tracing spans through OpenTelemetry (stdout exporter).
    #[arg(long, global = true)]
    pub otel: bool,

    #[command(flatten)]
    pub ledger: LedgerArgs,

    #[command(subcommand)]
    pub command: Commands,
}

/// Ledger endpoint and credentials.
#[derive(Args)]
pub struct LedgerArgs {
    /// Ledger JSON-RPC endpoint.
    #[arg(long, env = "SPHERE_LEDGER_RPC", global = true)]
    pub rpc_url: Option<String>,

    /// Hex private key of the paying account (with or without `0x`).
    #[arg(long, env = "SPHERE_PRIVATE_KEY", hide_env_values = true, global = true)]
    pub private_key: Option<String>,

    /// Storage indexer RPC, used by the document uploader.
    #[arg(long, env = "SPHERE_STORAGE_RPC", global = true)]
    pub storage_rpc: Option<String>,
}

impl LedgerArgs {
    pub fn resolve(&self) -> Result<LedgerSettings, ConfigError> {
        LedgerSettings::resolve(
            self.rpc_url.clone(),
            self.private_key.clone().map(SecretString::from),
            self.storage_rpc.clone(),
        )
    }
}

#[derive(Subcommand)]
pub enum Commands {
    /// Start the HTTP chat endpoint.
    Serve {
        /// Port to listen on.
        #[arg(long, default_value_t = 3000)]
        port: u16,

        /// Host address to bind to.
        #[arg(long, default_value = "127.0.0.1")]
        host: String,
    },

    /// Send one chat turn through the broker.
    Ask {
        /// The user message.
        message: String,

        /// Storage content hash to ground the answer in (repeatable).
        #[arg(long = "context", value_name = "HASH")]
        context: Vec<String>,

        /// Hint that the provider may use web search.
        #[arg(long)]
        web_search: bool,
    },

    /// List providers registered on the ledger.
    #[command(alias = "ls")]
    Providers {
        /// Service type to list (defaults to the configured one).
        #[arg(long)]
        service_type: Option<ServiceType>,
    },

    /// Run the end-to-end connection diagnostic step by step.
    Probe {
        /// Test message sent to the provider.
        #[arg(long, default_value = "Hello!")]
        message: String,
    },

    /// Print the effective configuration (secrets redacted).
    Config,

    /// Generate shell completions.
    Completions {
        /// Shell to generate completions for.
        shell: Shell,
    },
}
