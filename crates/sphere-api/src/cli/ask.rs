//! One-shot chat turn from the command line.

use anyhow::Result;
use console::style;

use sphere_types::session::ChatTurn;

use crate::state::AppState;

/// Send `message` through the same pipeline the HTTP endpoint uses.
pub async fn ask(
    state: &AppState,
    message: String,
    context: Vec<String>,
    web_search: bool,
    json: bool,
) -> Result<()> {
    let turn = ChatTurn::new(message)
        .with_context(context)
        .with_web_search(web_search);

    let text = state.chat_service.respond(&turn).await?;

    if json {
        let session = state.chat_service.cache().peek().await;
        let out = serde_json::json!({
            "text": text,
            "session": session.map(|s| s.summary()),
        });
        println!("{}", serde_json::to_string_pretty(&out)?);
        return Ok(());
    }

    if let Some(session) = state.chat_service.cache().peek().await {
        eprintln!(
            "  {} {} via {}",
            style("●").green(),
            style(&session.model).cyan(),
            style(session.provider_address.as_str()).dim()
        );
    }
    println!("{text}");

    Ok(())
}
