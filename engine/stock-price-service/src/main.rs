//! Stock Price Checker Service
//!
//! Connects the like storage, builds the HTTP routes and serves them until
//! Ctrl+C or SIGTERM.

use anyhow::{Context, Result};
use clap::Parser;
use like_ledger::BackendKind;
use std::net::IpAddr;
use std::time::Duration;
use tokio::sync::oneshot;
use tracing::info;

use stock_price_service::{
    config::validate_config, graceful_shutdown, initialize_logging, load_configuration,
    setup_signal_handlers, ServiceState,
};

/// Stock Price Checker HTTP service
#[derive(Parser)]
#[command(name = "stock-price-checker")]
#[command(about = "Stock prices with per-visitor likes")]
struct Cli {
    /// Listen port (overrides PORT)
    #[arg(short, long)]
    port: Option<u16>,

    /// Listen address (overrides STOCK_BIND_ADDR)
    #[arg(long)]
    bind: Option<IpAddr>,

    /// Mount the reset route and disable rate limiting
    #[arg(long)]
    test_mode: bool,

    /// Keep likes in memory instead of Postgres
    #[arg(long)]
    memory: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let mut config = load_configuration()?;
    if let Some(port) = cli.port {
        config.server.port = Some(port);
    }
    if let Some(bind) = cli.bind {
        config.server.bind_addr = bind;
    }
    if cli.test_mode {
        config.gateway.test_mode = true;
    }
    if cli.memory {
        config.ledger.backend = BackendKind::Memory;
    }
    validate_config(&config)?;

    initialize_logging(&config.logging)?;
    info!("Starting Stock Price Checker v{}", env!("CARGO_PKG_VERSION"));

    let shutdown_timeout = Duration::from_secs(config.server.shutdown_timeout_secs);
    let service_state = ServiceState::new(config).await.context("Service startup failed")?;

    let shutdown_signal = setup_signal_handlers()?;

    let (stop_tx, stop_rx) = oneshot::channel::<()>();
    let (_, server) = service_state.bind(async move {
        let _ = stop_rx.await;
    })?;
    let server_handle = tokio::spawn(server);

    info!("Stock Price Checker is running. Press Ctrl+C to shutdown gracefully.");
    let _ = shutdown_signal.await;

    info!("Shutdown signal received. Initiating graceful shutdown...");
    graceful_shutdown(stop_tx, server_handle, shutdown_timeout).await?;

    info!("Stock Price Checker shutdown complete");
    Ok(())
}
