//! Registry listing command.

use anyhow::Result;
use comfy_table::{Cell, Color, ContentArrangement, Table, presets};
use console::style;
use tracing::Instrument;

use sphere_core::ledger::LedgerClient;
use sphere_observe::attrs::list_providers_span;
use sphere_types::provider::ServiceType;

use crate::state::AppState;

/// List providers offering `service_type` (the configured type by default).
pub async fn list_providers(
    state: &AppState,
    service_type: Option<ServiceType>,
    json: bool,
) -> Result<()> {
    let service_type = service_type.unwrap_or_else(|| state.config.service_type.clone());
    let providers = state
        .ledger
        .list_providers(&service_type)
        .instrument(list_providers_span(service_type.as_str()))
        .await?;

    if json {
        println!("{}", serde_json::to_string_pretty(&providers)?);
        return Ok(());
    }

    if providers.is_empty() {
        println!();
        println!(
            "  No {} providers registered on the ledger.",
            style(&service_type).bold()
        );
        println!();
        return Ok(());
    }

    let pinned = state.config.preferred_provider.as_deref();

    let mut table = Table::new();
    table.load_preset(presets::UTF8_FULL_CONDENSED);
    table.set_content_arrangement(ContentArrangement::Dynamic);

    table.set_header(vec![
        Cell::new("#").fg(Color::White),
        Cell::new("Address").fg(Color::White),
        Cell::new("Service").fg(Color::White),
        Cell::new("Model").fg(Color::White),
        Cell::new("Endpoint").fg(Color::White),
    ]);

    for (index, provider) in providers.iter().enumerate() {
        let is_pinned = pinned.is_some_and(|p| provider.address.matches(p));
        let address = if is_pinned {
            Cell::new(format!("{} (pinned)", provider.address)).fg(Color::Green)
        } else {
            Cell::new(provider.address.as_str()).fg(Color::Cyan)
        };

        table.add_row(vec![
            Cell::new(index + 1).fg(Color::DarkGrey),
            address,
            Cell::new(&provider.service_type),
            Cell::new(provider.model.as_deref().unwrap_or("-")),
            Cell::new(&provider.endpoint_url).fg(Color::DarkGrey),
        ]);
    }

    println!();
    println!("{table}");
    println!();
    println!(
        "  {} provider{}",
        style(providers.len()).bold(),
        if providers.len() == 1 { "" } else { "s" }
    );
    println!();

    Ok(())
}
