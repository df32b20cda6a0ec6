//! Configuration for the StockGateway

use crate::error::{GatewayError, GatewayResult};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

/// Per-visitor request budget
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RateLimitConfig {
    /// Requests allowed per window; 0 disables limiting
    pub max_requests: u32,

    /// Sliding window length in seconds
    pub window_seconds: u64,
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        Self { max_requests: 100, window_seconds: 60 }
    }
}

impl RateLimitConfig {
    pub fn window(&self) -> Duration {
        Duration::from_secs(self.window_seconds)
    }
}

/// Gateway configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GatewayConfig {
    /// Mounts the reset route and turns rate limiting off
    pub test_mode: bool,

    /// Honour `x-forwarded-for` when deriving the visitor
    pub trust_proxy: bool,

    pub rate_limit: RateLimitConfig,

    /// Served under `/public`
    pub public_dir: PathBuf,

    /// Served at `/`
    pub index_file: PathBuf,
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            test_mode: false,
            trust_proxy: true,
            rate_limit: RateLimitConfig::default(),
            public_dir: PathBuf::from("public"),
            index_file: PathBuf::from("views/index.html"),
        }
    }
}

impl GatewayConfig {
    /// Test-mode defaults
    pub fn for_tests() -> Self {
        Self { test_mode: true, ..Default::default() }
    }

    /// Load configuration from environment variables
    pub fn from_env() -> GatewayResult<Self> {
        let mut config = Self::default();

        if let Ok(test_mode) = std::env::var("STOCK_TEST_MODE") {
            config.test_mode = parse_flag("STOCK_TEST_MODE", &test_mode)?;
        }

        if let Ok(trust) = std::env::var("STOCK_TRUST_PROXY") {
            config.trust_proxy = parse_flag("STOCK_TRUST_PROXY", &trust)?;
        }

        if let Ok(max) = std::env::var("RATE_LIMIT_MAX_REQUESTS") {
            config.rate_limit.max_requests = max
                .parse()
                .map_err(|_| config_error("Invalid RATE_LIMIT_MAX_REQUESTS"))?;
        }

        if let Ok(window) = std::env::var("RATE_LIMIT_WINDOW_SECS") {
            config.rate_limit.window_seconds = window
                .parse()
                .map_err(|_| config_error("Invalid RATE_LIMIT_WINDOW_SECS"))?;
        }

        if let Ok(dir) = std::env::var("STOCK_PUBLIC_DIR") {
            config.public_dir = PathBuf::from(dir);
        }

        if let Ok(file) = std::env::var("STOCK_INDEX_FILE") {
            config.index_file = PathBuf::from(file);
        }

        config.validate()?;
        Ok(config)
    }

    /// Rate limiting applies outside test mode with a non-zero budget
    pub fn rate_limit_enabled(&self) -> bool {
        !self.test_mode && self.rate_limit.max_requests > 0
    }

    /// Validate the configuration
    pub fn validate(&self) -> GatewayResult<()> {
        if self.rate_limit.max_requests > 0 && self.rate_limit.window_seconds == 0 {
            return Err(config_error("RATE_LIMIT_WINDOW_SECS must be greater than 0"));
        }

        Ok(())
    }
}

fn parse_flag(name: &str, value: &str) -> GatewayResult<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" | "" => Ok(false),
        _ => Err(config_error(format!("Invalid {}: {}", name, value))),
    }
}

fn config_error(message: impl Into<String>) -> GatewayError {
    GatewayError::Config(message.into())
}
