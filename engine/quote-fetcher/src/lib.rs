//! Quote Fetcher
//!
//! Resolves the current price of a ticker symbol by calling the upstream quote
//! proxy (`GET <base>/{symbol}/quote`) and picking the first usable price field
//! out of the JSON payload. One outbound call per lookup, no retries, no caching.

pub mod config;
pub mod error;
pub mod fetcher;

pub use config::QuoteFetcherConfig;
pub use error::{QuoteError, Result};
pub use fetcher::{extract_price, QuoteFetcher, QuoteSource};
