//! Error types for the quote fetcher

use thiserror::Error;

/// Result type for quote fetcher operations
pub type Result<T> = std::result::Result<T, QuoteError>;

/// Errors raised while talking to the upstream quote service
#[derive(Error, Debug)]
pub enum QuoteError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Quote request for {symbol} failed with status {status}")]
    Status { symbol: String, status: u16 },

    #[error("Price not found in quote response for {symbol}")]
    MissingPrice { symbol: String },

    #[error("Unusable price value for {symbol}: {value}")]
    InvalidPrice { symbol: String, value: String },

    #[error("Quote request for {symbol} timed out after {after_ms}ms")]
    Timeout { symbol: String, after_ms: u64 },

    #[error("Invalid configuration: {message}")]
    InvalidConfig { message: String },
}

impl QuoteError {
    /// Create a new configuration error
    pub fn config(message: impl Into<String>) -> Self {
        Self::InvalidConfig { message: message.into() }
    }
}
