//! Error types for the like ledger

use thiserror::Error;

/// Result type alias for ledger operations
pub type Result<T> = std::result::Result<T, LedgerError>;

/// Errors that can occur in the like ledger
#[derive(Error, Debug)]
pub enum LedgerError {
    /// Storage unavailable or a query failed
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Migration error: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),

    /// Symbol failed normalisation (empty, too long, whitespace)
    #[error("Invalid stock symbol: {0}")]
    InvalidSymbol(String),

    #[error("Invalid configuration: {message}")]
    InvalidConfig { message: String },
}

impl LedgerError {
    /// Create a new configuration error
    pub fn config(message: impl Into<String>) -> Self {
        Self::InvalidConfig { message: message.into() }
    }

    /// Create a new invalid symbol error
    pub fn invalid_symbol(msg: impl Into<String>) -> Self {
        Self::InvalidSymbol(msg.into())
    }
}
