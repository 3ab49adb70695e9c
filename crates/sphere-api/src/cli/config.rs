//! Effective configuration display.
//!
//! Runs without ledger access, so it also works when credentials are missing
//! and reports which ones are.

use anyhow::Result;
use console::style;
use secrecy::SecretString;

use sphere_infra::config::{LEDGER_RPC_ENV, PRIVATE_KEY_ENV, STORAGE_RPC_ENV, load_broker_config};
use sphere_infra::crypto::signer::LedgerSigner;
use sphere_infra::filesystem::{config_path, resolve_data_dir};

use crate::cli::LedgerArgs;

/// Print the merged configuration with the signing key redacted.
pub async fn show_config(ledger: &LedgerArgs, json: bool) -> Result<()> {
    let data_dir = resolve_data_dir();
    let config = load_broker_config(&data_dir).await;

    // Derive the account so a bad key shows up here rather than at bootstrap.
    let account = ledger
        .private_key
        .clone()
        .map(|key| LedgerSigner::from_hex(&SecretString::from(key)).map(|s| s.address().to_string()));

    if json {
        let account = match &account {
            Some(Ok(address)) => serde_json::json!(address),
            Some(Err(e)) => serde_json::json!({ "error": e.to_string() }),
            None => serde_json::Value::Null,
        };
        let out = serde_json::json!({
            "data_dir": data_dir.display().to_string(),
            "config_file": config_path(&data_dir).display().to_string(),
            "broker": config,
            "ledger": {
                "rpc_url": ledger.rpc_url,
                "private_key": ledger.private_key.as_ref().map(|_| "[REDACTED]"),
                "account": account,
                "storage_rpc": ledger.storage_rpc,
            },
        });
        println!("{}", serde_json::to_string_pretty(&out)?);
        return Ok(());
    }

    let unset = || style("(not set)").yellow().to_string();

    println!();
    println!("  {}", style("── Files ──").dim());
    println!("  Data dir:    {}", style(data_dir.display()).dim());
    println!("  Config file: {}", style(config_path(&data_dir).display()).dim());
    println!();

    println!("  {}", style("── Broker ──").dim());
    println!("  Service type:     {}", style(&config.service_type).cyan());
    println!(
        "  Provider:         {}",
        config
            .preferred_provider
            .as_deref()
            .map_or_else(|| "first listed".to_string(), |p| format!("{p} (pinned)"))
    );
    println!("  Deposit amount:   {}", config.deposit_amount);
    println!("  Transfer amount:  {}", config.transfer_amount);
    println!(
        "  Bootstrap:        {} attempts, {}ms apart",
        config.bootstrap.max_attempts, config.bootstrap.retry_delay_ms
    );
    println!("  Request timeout:  {}s", config.request_timeout_secs);
    println!("  Stale statuses:   {:?}", config.stale_session_statuses);
    println!();

    println!("  {}", style("── Ledger ──").dim());
    println!(
        "  {LEDGER_RPC_ENV}:  {}",
        ledger.rpc_url.clone().unwrap_or_else(unset)
    );
    let key_line = match &account {
        Some(Ok(address)) => format!("[REDACTED] (account {})", style(address).cyan()),
        Some(Err(e)) => format!("{}", style(e).red()),
        None => unset(),
    };
    println!("  {PRIVATE_KEY_ENV}: {key_line}");
    println!(
        "  {STORAGE_RPC_ENV}: {}",
        ledger.storage_rpc.clone().unwrap_or_else(unset)
    );
    println!();

    Ok(())
}
