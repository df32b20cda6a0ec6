//! Configuration for the quote fetcher

use crate::error::{QuoteError, Result};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Public quote proxy used when `STOCK_API_URL` is not set
pub const DEFAULT_API_BASE_URL: &str =
    "https://stock-price-checker-proxy.freecodecamp.rocks/v1/stock";

/// Upstream call budget in milliseconds
pub const DEFAULT_TIMEOUT_MS: u64 = 5000;

/// Price fields tried in order against the quote payload
pub const DEFAULT_PRICE_FIELDS: [&str; 4] =
    ["latestPrice", "delayedPrice", "iexRealtimePrice", "previousClose"];

/// Quote fetcher configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QuoteFetcherConfig {
    /// Base URL of the quote proxy, without the trailing `/{symbol}/quote`
    pub api_base_url: String,

    /// Timeout for a single upstream call
    pub timeout_ms: u64,

    /// Candidate price fields in priority order
    pub price_fields: Vec<String>,
}

impl Default for QuoteFetcherConfig {
    fn default() -> Self {
        Self {
            api_base_url: DEFAULT_API_BASE_URL.to_string(),
            timeout_ms: DEFAULT_TIMEOUT_MS,
            price_fields: DEFAULT_PRICE_FIELDS.iter().map(|f| f.to_string()).collect(),
        }
    }
}

impl QuoteFetcherConfig {
    /// Create a config pointing at a custom base URL
    pub fn new(api_base_url: impl Into<String>) -> Self {
        Self { api_base_url: api_base_url.into(), ..Default::default() }
    }

    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self> {
        let mut config = Self::default();

        if let Ok(url) = std::env::var("STOCK_API_URL") {
            config.api_base_url = url;
        }

        if let Ok(timeout) = std::env::var("STOCK_API_TIMEOUT_MS") {
            config.timeout_ms = timeout
                .parse::<u64>()
                .map_err(|_| QuoteError::config("Invalid STOCK_API_TIMEOUT_MS"))?;
        }

        if let Ok(fields) = std::env::var("STOCK_PRICE_FIELDS") {
            config.price_fields = parse_price_fields(&fields);
        }

        config.validate()?;
        Ok(config)
    }

    /// Upstream timeout as a `Duration`
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }

    /// Build the quote URL for a symbol, percent-encoding the symbol segment
    pub fn quote_url(&self, symbol: &str) -> String {
        format!(
            "{}/{}/quote",
            self.api_base_url.trim_end_matches('/'),
            urlencoding::encode(symbol)
        )
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<()> {
        if reqwest::Url::parse(&self.api_base_url).is_err() {
            return Err(QuoteError::config(format!(
                "Invalid quote API base URL: {}",
                self.api_base_url
            )));
        }

        if self.timeout_ms == 0 {
            return Err(QuoteError::config("Quote timeout must be greater than 0"));
        }

        if self.price_fields.is_empty() {
            return Err(QuoteError::config("At least one price field is required"));
        }

        Ok(())
    }
}

/// Split a comma-separated field list, dropping blanks
pub fn parse_price_fields(raw: &str) -> Vec<String> {
    raw.split(',').map(str::trim).filter(|f| !f.is_empty()).map(str::to_string).collect()
}
