//! Stock Price Checker Service Library
//!
//! Configuration loading, logging, component wiring and graceful shutdown
//! for the `stock-price-checker` binary.

use anyhow::{Context, Result};

pub mod config;
pub mod logging;
pub mod service;
pub mod signals;

pub use config::ServiceConfig;
pub use logging::initialize_logging;
pub use service::ServiceState;
pub use signals::{graceful_shutdown, setup_signal_handlers};

/// Load configuration from `.env` (if present) and environment variables
pub fn load_configuration() -> Result<ServiceConfig> {
    dotenv::dotenv().ok();
    config::load_config().context("Failed to load service configuration")
}
