// modules
mod config;
mod constants;
pub mod error;
mod http;
mod libs;
mod logger;
mod mcp;
mod prompts;
mod resources;
mod state;
mod tools;


use clap::Parser;
use rust_i18n::i18n;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;

use config::{Config, TransportMode};
use http::start_http_server;
use libs::lifecycle::{install_panic_hook, wait_for_shutdown_signal};
use logger::setup_logger;
use mcp::server::serve_stdio;
use state::ServerState;

// Initialize internationalization with the "i18n" directory
i18n!("i18n", fallback = "en");

#[derive(Parser, Debug)]
#[command(author, version = env!("CARGO_PKG_VERSION"), about = "MCP boilerplate server with example tools, resources and prompts", long_about = None)]
struct Cli {
    /// Serve over stdin/stdout regardless of MCP_TRANSPORT
    #[arg(long)]
    stdio: bool,
}

/// The entry point of the server.
///
/// Loads the configuration, sets up logging, registers the built-in capabilities and
/// serves the configured transport until it finishes or a shutdown signal arrives.
pub async fn run() -> error::Result<()> {
    let cli = Cli::parse();

    let (config, warnings) = Config::from_env();
    let config = if cli.stdio {
        config.with_forced_stdio()
    } else {
        config
    };

    setup_logger(&config)?;
    install_panic_hook();

    for warning in &warnings {
        log::warn!("{}", warning);
    }
    log::info!("Configuration loaded: {}", config);

    let transport = config.transport;
    let state = Arc::new(ServerState::new(Arc::new(config)).await?);

    let shutdown = CancellationToken::new();
    let signal_token = shutdown.clone();
    tokio::spawn(async move {
        wait_for_shutdown_signal().await;
        log::info!("Shutting down MCP server...");
        signal_token.cancel();
    });

    match transport {
        TransportMode::Stdio => serve_stdio(state, shutdown).await?,
        TransportMode::Http => start_http_server(state, shutdown).await?,
    }

    Ok(())
}
