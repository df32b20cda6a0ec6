//! StockGateway - stock price lookups over HTTP
//!
//! Wires the quote fetcher and the like ledger together behind
//! `GET /api/stock-prices`, together with the surrounding HTTP concerns:
//! security headers, CORS, per-visitor rate limiting, static assets, health
//! and the test-mode reset route.

pub mod config;
pub mod error;
pub mod messages;
pub mod orchestrator;
pub mod rate_limiter;
pub mod rest_api;

#[cfg(test)]
pub(crate) mod test_support;

pub use config::{GatewayConfig, RateLimitConfig};
pub use error::{GatewayError, GatewayResult};
pub use messages::{StockData, StockQuery, StockPricesResponse};
pub use orchestrator::{LookupRequest, StockLookup};
pub use rest_api::{create_routes, AppState};

/// Path of the lookup endpoint
pub const STOCK_PRICES_PATH: &str = "/api/stock-prices";
