//! End-to-end connection diagnostic.
//!
//! Walks the bootstrap sequence one step at a time against the live ledger,
//! printing each outcome, then sends a single test message and prints the
//! provider's raw reply. Funding and acknowledgement failures are reported
//! and skipped, as during a normal bootstrap.

use anyhow::{Result, bail};
use chrono::Utc;
use console::style;
use serde_json::{Value, json};
use tracing::Instrument;

use sphere_core::forwarder::request_headers;
use sphere_core::ledger::LedgerClient;
use sphere_core::selector::selector_for;
use sphere_core::transport::InferenceTransport;
use sphere_observe::attrs::probe_span;
use sphere_types::error::LedgerError;
use sphere_types::llm::{ChatCompletionRequest, Message};
use sphere_types::provider::{FundingPurpose, ProvisionOutcome};
use sphere_types::session::Session;

use crate::state::AppState;

/// Run the diagnostic and print a step-by-step report.
pub async fn probe(state: &AppState, message: String, json: bool) -> Result<()> {
    let span = probe_span(state.config.service_type.as_str());
    let report = run(state, message, json).instrument(span).await?;

    if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    }
    Ok(())
}

async fn run(state: &AppState, message: String, json: bool) -> Result<Value> {
    let ledger = &state.ledger;
    let config = &state.config;
    let say = |text: String| {
        if !json {
            println!("  {text}");
        }
    };

    println_header(json, ledger.account());

    say(format!("{} Listing {} services...", style("→").cyan(), config.service_type));
    let providers = ledger.list_providers(&config.service_type).await?;
    say(format!("  {} found", providers.len()));

    let selector = selector_for(config);
    let Some(chosen) = selector.select(&providers) else {
        if !json {
            println!("  {} No {} services found.", style("✗").red(), config.service_type);
        }
        return Ok(json!({
            "account": ledger.account(),
            "providers": providers.len(),
            "provider": null,
        }));
    };
    let provider = chosen.address.clone();
    say(format!(
        "{} Found provider {} ({})",
        style("✓").green(),
        style(&provider).cyan(),
        selector.name()
    ));

    say(format!(
        "{} Depositing {} into the ledger...",
        style("→").cyan(),
        config.deposit_amount
    ));
    let deposit = ledger.deposit_funds(config.deposit_amount).await;
    say(outcome_line(&deposit));

    say(format!(
        "{} Transferring {} to the provider...",
        style("→").cyan(),
        config.transfer_amount
    ));
    let transfer = ledger
        .transfer_funds(&provider, FundingPurpose::Inference, config.transfer_amount)
        .await;
    say(outcome_line(&transfer));

    say(format!("{} Acknowledging provider signer...", style("→").cyan()));
    let acknowledge = ledger.acknowledge_signer(&provider).await;
    say(outcome_line(&acknowledge));

    say(format!("{} Getting metadata...", style("→").cyan()));
    let metadata = ledger.get_metadata(&provider).await?;
    say(format!(
        "  endpoint {}  model {}",
        style(&metadata.endpoint).dim(),
        style(&metadata.model).cyan()
    ));

    say(format!("{} Getting headers...", style("→").cyan()));
    let auth_headers = ledger.get_request_headers(&provider).await?;
    if auth_headers.is_empty() {
        bail!("ledger returned no billing headers for {provider}");
    }

    let session = Session {
        provider_address: provider.clone(),
        endpoint: metadata.endpoint.clone(),
        model: metadata.model.clone(),
        auth_headers,
        bootstrapped_at: Utc::now(),
    };
    let header_names = session.header_names().join(", ");
    say(format!("  headers: {}", style(&header_names).dim()));

    say(format!("{} Sending inference request...", style("→").cyan()));
    let request = ChatCompletionRequest {
        model: session.model.clone(),
        messages: vec![Message::user(message)],
        context_hashes: Vec::new(),
        tools: None,
    };
    let response = state
        .transport
        .send_completion(&session.completions_url(), &request_headers(&session), &request)
        .await?;

    if !json {
        let status = if response.is_success() {
            style(response.status).green()
        } else {
            style(response.status).red()
        };
        println!();
        println!("  Status: {status}");
        println!("  Raw Output: {}", response.body);
        println!();
    }

    Ok(json!({
        "account": ledger.account(),
        "providers": providers.len(),
        "provider": provider,
        "selector": selector.name(),
        "deposit": outcome_value(&deposit),
        "transfer": outcome_value(&transfer),
        "acknowledge": outcome_value(&acknowledge),
        "metadata": metadata,
        "headerNames": session.header_names(),
        "status": response.status,
        "body": response.body,
    }))
}

fn println_header(json: bool, account: &str) {
    if json {
        return;
    }
    println!();
    println!(
        "  {} Probing the compute network as {}",
        style("⚡").bold(),
        style(account).cyan()
    );
    println!();
}

fn outcome_line(result: &Result<ProvisionOutcome, LedgerError>) -> String {
    match result {
        Ok(ProvisionOutcome::Applied) => format!("  {} applied", style("✓").green()),
        Ok(ProvisionOutcome::AlreadyProvisioned) => {
            format!("  {} already provisioned", style("✓").green())
        }
        Err(e) => format!("  {} {e}", style("!").yellow()),
    }
}

fn outcome_value(result: &Result<ProvisionOutcome, LedgerError>) -> Value {
    match result {
        Ok(outcome) => json!({ "ok": outcome.to_string() }),
        Err(e) => json!({ "error": e.to_string() }),
    }
}
