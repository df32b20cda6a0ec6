//! Service configuration management

use anyhow::{anyhow, Context, Result};
use serde::{Deserialize, Serialize};
use std::net::{IpAddr, Ipv4Addr, SocketAddr};

use like_ledger::LedgerConfig;
use quote_fetcher::QuoteFetcherConfig;
use stock_gateway::GatewayConfig;

/// Port used when `PORT` is unset
pub const DEFAULT_PORT: u16 = 3000;

/// Port used in test mode when `PORT` is unset
pub const DEFAULT_TEST_PORT: u16 = 3001;

/// Main service configuration
#[derive(Debug, Clone, Default)]
pub struct ServiceConfig {
    /// Upstream quote service
    pub quotes: QuoteFetcherConfig,

    /// Like storage
    pub ledger: LedgerConfig,

    /// HTTP surface
    pub gateway: GatewayConfig,

    /// Listener and shutdown settings
    pub server: ServerSettings,

    /// Logging configuration
    pub logging: LoggingConfig,
}

/// Listener settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerSettings {
    pub bind_addr: IpAddr,

    /// Explicit port; falls back to the mode default when unset
    pub port: Option<u16>,

    /// Graceful shutdown timeout in seconds
    pub shutdown_timeout_secs: u64,
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Default level when `RUST_LOG` is unset (trace, debug, info, warn, error)
    pub level: String,

    /// Log format (pretty, compact, json)
    pub format: String,
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            bind_addr: IpAddr::V4(Ipv4Addr::UNSPECIFIED),
            port: None,
            shutdown_timeout_secs: 10,
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self { level: "info".to_string(), format: "pretty".to_string() }
    }
}

impl ServiceConfig {
    /// Effective listen port
    pub fn port(&self) -> u16 {
        self.server.port.unwrap_or(if self.gateway.test_mode {
            DEFAULT_TEST_PORT
        } else {
            DEFAULT_PORT
        })
    }

    pub fn socket_addr(&self) -> SocketAddr {
        SocketAddr::new(self.server.bind_addr, self.port())
    }
}

/// Load configuration from environment variables
pub fn load_config() -> Result<ServiceConfig> {
    let mut config = ServiceConfig {
        quotes: QuoteFetcherConfig::from_env().context("Invalid quote service configuration")?,
        ledger: LedgerConfig::from_env().context("Invalid ledger configuration")?,
        gateway: GatewayConfig::from_env().context("Invalid gateway configuration")?,
        ..Default::default()
    };

    load_from_env(&mut config)?;
    validate_config(&config)?;

    Ok(config)
}

/// Service-level environment overrides
fn load_from_env(config: &mut ServiceConfig) -> Result<()> {
    if let Ok(addr) = std::env::var("STOCK_BIND_ADDR") {
        config.server.bind_addr =
            addr.parse().with_context(|| format!("Invalid STOCK_BIND_ADDR: {}", addr))?;
    }

    if let Ok(port) = std::env::var("PORT") {
        config.server.port = Some(parse_port(&port)?);
    }

    if let Ok(secs) = std::env::var("STOCK_SHUTDOWN_TIMEOUT_SECS") {
        config.server.shutdown_timeout_secs = secs
            .parse()
            .with_context(|| format!("Invalid STOCK_SHUTDOWN_TIMEOUT_SECS: {}", secs))?;
    }

    if let Ok(level) = std::env::var("STOCK_LOG_LEVEL") {
        config.logging.level = level;
    }

    if let Ok(format) = std::env::var("STOCK_LOG_FORMAT") {
        config.logging.format = format;
    }

    Ok(())
}

fn parse_port(raw: &str) -> Result<u16> {
    match raw.trim().parse::<u16>() {
        Ok(0) | Err(_) => Err(anyhow!("Invalid PORT: {}", raw)),
        Ok(port) => Ok(port),
    }
}

/// Validate configuration
pub fn validate_config(config: &ServiceConfig) -> Result<()> {
    config.quotes.validate().context("Invalid quote service configuration")?;
    config.ledger.validate().context("Invalid ledger configuration")?;
    config.gateway.validate().context("Invalid gateway configuration")?;

    match config.logging.level.as_str() {
        "trace" | "debug" | "info" | "warn" | "error" => {}
        _ => return Err(anyhow!("Invalid log level: {}", config.logging.level)),
    }

    match config.logging.format.as_str() {
        "json" | "pretty" | "compact" => {}
        _ => return Err(anyhow!("Invalid log format: {}", config.logging.format)),
    }

    Ok(())
}
