//! LikeLedger facade used on the request path

use crate::backend::{InMemoryLedger, LedgerBackend};
use crate::config::{BackendKind, LedgerConfig};
use crate::error::Result;
use crate::postgres::PostgresLedger;
use crate::record::{normalize_symbol, StockRecord};
use crate::visitor::VisitorHash;
use std::sync::Arc;
use tracing::{debug, info};

/// Find-or-create and like registration over any [`LedgerBackend`]
#[derive(Clone)]
pub struct LikeLedger {
    backend: Arc<dyn LedgerBackend>,
}

impl std::fmt::Debug for LikeLedger {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LikeLedger").field("backend", &self.backend.name()).finish()
    }
}

impl LikeLedger {
    pub fn new(backend: Arc<dyn LedgerBackend>) -> Self {
        Self { backend }
    }

    pub fn backend_name(&self) -> &'static str {
        self.backend.name()
    }

    /// Case-insensitive find-or-create; the stored symbol is upper-case
    pub async fn find_or_create(&self, symbol: &str) -> Result<StockRecord> {
        let symbol = normalize_symbol(symbol)?;
        self.backend.find_or_create(&symbol).await
    }

    /// Read a record without creating it
    pub async fn find(&self, symbol: &str) -> Result<Option<StockRecord>> {
        let symbol = normalize_symbol(symbol)?;
        self.backend.find(&symbol).await
    }

    /// Apply a like from `visitor` to `record` if one was requested.
    ///
    /// No-op when `wants_like` is false or the visitor is already recorded.
    /// Otherwise the storage-level conditional write decides, so a stale
    /// `record` can never produce a second increment.
    pub async fn register_like(
        &self,
        record: StockRecord,
        visitor: &VisitorHash,
        wants_like: bool,
    ) -> Result<StockRecord> {
        if !wants_like || record.has_liked(visitor) {
            return Ok(record);
        }

        let updated = self.backend.add_like_if_absent(&record.symbol, visitor).await?;
        debug!(
            "Like from {} on {}: {} -> {}",
            visitor.short(),
            updated.symbol,
            record.likes,
            updated.likes
        );

        Ok(updated)
    }

    /// Administrative reset; removes every record
    pub async fn clear(&self) -> Result<u64> {
        self.backend.clear().await
    }

    pub async fn ping(&self) -> Result<()> {
        self.backend.ping().await
    }
}

/// Open the configured backend and confirm it answers before returning
pub async fn connect(config: &LedgerConfig) -> Result<LikeLedger> {
    config.validate()?;

    let backend: Arc<dyn LedgerBackend> = match config.backend {
        BackendKind::Postgres => Arc::new(PostgresLedger::connect(config).await?),
        BackendKind::Memory => Arc::new(InMemoryLedger::new()),
    };

    backend.ping().await?;
    info!("Like ledger ready ({} backend)", backend.name());

    Ok(LikeLedger::new(backend))
}
