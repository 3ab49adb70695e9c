//! Sphere CLI and HTTP chat endpoint.
//!
//! Binary name: `sphere`
//!
//! Parses CLI arguments, resolves ledger credentials, wires the broker, then
//! dispatches to the command handler or starts the HTTP server.

mod cli;
mod http;
mod state;

use clap::Parser;
use clap_complete::generate;

use cli::{Cli, Commands};
use sphere_observe::tracing_setup::{LogFormat, filter_for_verbosity, init_tracing, shutdown_tracing};
use state::AppState;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Stdout carries command output; logs go to stderr.
    let format = if cli.json { LogFormat::Json } else { LogFormat::Pretty };
    if let Err(e) = init_tracing(filter_for_verbosity(cli.verbose, cli.quiet), format, cli.otel) {
        eprintln!("failed to initialize tracing: {e}");
    }

    let result = run(cli).await;
    shutdown_tracing();
    result
}

async fn run(cli: Cli) -> anyhow::Result<()> {
    // Commands that never touch the ledger
    match &cli.command {
        Commands::Completions { shell } => {
            let mut cmd = <Cli as clap::CommandFactory>::command();
            generate(*shell, &mut cmd, "sphere", &mut std::io::stdout());
            return Ok(());
        }
        Commands::Config => {
            return cli::config::show_config(&cli.ledger, cli.json).await;
        }
        _ => {}
    }

    let settings = cli.ledger.resolve()?;
    let state = AppState::init(&settings).await?;

    match cli.command {
        Commands::Serve { port, host } => {
            let addr = format!("{host}:{port}");
            let listener = tokio::net::TcpListener::bind(&addr).await?;

            println!(
                "  {} Sphere broker listening on {}",
                console::style("⚡").bold(),
                console::style(format!("http://{addr}")).cyan()
            );
            println!("  {}", console::style("Press Ctrl+C to stop").dim());

            let router = http::router::build_router(state);

            axum::serve(listener, router)
                .with_graceful_shutdown(shutdown_signal())
                .await?;

            println!("\n  Server stopped.");
        }

        Commands::Ask {
            message,
            context,
            web_search,
        } => {
            cli::ask::ask(&state, message, context, web_search, cli.json).await?;
        }

        Commands::Providers { service_type } => {
            cli::providers::list_providers(&state, service_type, cli.json).await?;
        }

        Commands::Probe { message } => {
            cli::probe::probe(&state, message, cli.json).await?;
        }

        Commands::Config | Commands::Completions { .. } => unreachable!("handled above"),
    }

    Ok(())
}

/// Wait for Ctrl+C or SIGTERM for graceful shutdown.
async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    tracing::info!("shutdown signal received");
}
