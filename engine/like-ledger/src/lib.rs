//! # Like Ledger
//!
//! Persists one [`StockRecord`] per ticker symbol: a like counter plus the set of
//! anonymised visitor hashes that produced those likes.
//!
//! ## Architecture
//!
//! - **LedgerBackend**: repository trait with `find_or_create` and the atomic
//!   `add_like_if_absent` conditional write
//! - **InMemoryLedger**: dashmap-backed implementation (tests, local development)
//! - **PostgresLedger**: sqlx/Postgres implementation
//! - **LikeLedger**: the facade the request path uses (`find_or_create`, `register_like`)
//! - **VisitorHash**: SHA-256 of a client address with its last segment masked
//!
//! ## Usage
//!
//! ```rust
//! use like_ledger::{InMemoryLedger, LikeLedger, VisitorHash};
//! use std::sync::Arc;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let ledger = LikeLedger::new(Arc::new(InMemoryLedger::new()));
//!     let visitor = VisitorHash::from_address("203.0.113.7");
//!
//!     let record = ledger.find_or_create("goog").await?;
//!     let record = ledger.register_like(record, &visitor, true).await?;
//!     assert_eq!(record.likes, 1);
//!
//!     Ok(())
//! }
//! ```

pub mod backend;
pub mod config;
pub mod error;
pub mod ledger;
pub mod postgres;
pub mod record;
pub mod visitor;

pub use backend::{InMemoryLedger, LedgerBackend};
pub use config::{BackendKind, LedgerConfig};
pub use error::{LedgerError, Result};
pub use ledger::{connect, LikeLedger};
pub use postgres::PostgresLedger;
pub use record::{normalize_symbol, StockRecord, MAX_SYMBOL_LEN};
pub use visitor::VisitorHash;
