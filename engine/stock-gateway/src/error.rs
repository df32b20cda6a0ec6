//! Error types for the StockGateway

use crate::messages::ErrorBody;
use like_ledger::LedgerError;
use quote_fetcher::QuoteError;
use thiserror::Error;
use warp::http::StatusCode;

/// Errors that can occur while serving a lookup
#[derive(Error, Debug)]
pub enum GatewayError {
    /// Missing or malformed `stock` parameter
    #[error("{0}")]
    Input(String),

    #[error("Upstream error: {0}")]
    Upstream(#[from] QuoteError),

    #[error("Storage error: {0}")]
    Storage(LedgerError),

    #[error("Rate limit exceeded: {0}")]
    RateLimit(String),

    #[error("Configuration error: {0}")]
    Config(String),
}

impl From<LedgerError> for GatewayError {
    fn from(err: LedgerError) -> Self {
        match err {
            LedgerError::InvalidSymbol(msg) => GatewayError::Input(msg),
            other => GatewayError::Storage(other),
        }
    }
}

impl GatewayError {
    pub fn status(&self) -> StatusCode {
        match self {
            GatewayError::Input(_) => StatusCode::BAD_REQUEST,
            GatewayError::RateLimit(_) => StatusCode::TOO_MANY_REQUESTS,
            GatewayError::Upstream(_) | GatewayError::Storage(_) | GatewayError::Config(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    /// Client-facing body: a short message, never a backtrace
    pub fn body(&self) -> ErrorBody {
        match self {
            GatewayError::Input(msg) | GatewayError::RateLimit(msg) => ErrorBody::new(msg.clone()),
            GatewayError::Upstream(_) | GatewayError::Storage(_) | GatewayError::Config(_) => {
                ErrorBody::with_detail("Internal error", self.to_string())
            }
        }
    }
}

/// Result type for StockGateway operations
pub type GatewayResult<T> = Result<T, GatewayError>;
