//! Ledger backend trait and the in-memory implementation

use crate::error::Result;
use crate::record::StockRecord;
use crate::visitor::VisitorHash;
use dashmap::DashMap;
use std::sync::Arc;

/// Repository over [`StockRecord`]s keyed by normalised symbol.
///
/// Callers pass symbols that already went through
/// [`normalize_symbol`](crate::record::normalize_symbol).
#[async_trait::async_trait]
pub trait LedgerBackend: Send + Sync {
    /// Look a record up without creating it
    async fn find(&self, symbol: &str) -> Result<Option<StockRecord>>;

    /// Return the record for `symbol`, creating a zero-state one if absent
    async fn find_or_create(&self, symbol: &str) -> Result<StockRecord>;

    /// Atomically add `visitor` and bump the counter, only if the hash is absent.
    ///
    /// Creates the record if needed. Returns the record as stored afterwards,
    /// whether or not this call changed it.
    async fn add_like_if_absent(&self, symbol: &str, visitor: &VisitorHash)
        -> Result<StockRecord>;

    /// Remove every record, returning how many were deleted
    async fn clear(&self) -> Result<u64>;

    /// Check the storage is reachable
    async fn ping(&self) -> Result<()>;

    /// Short backend name for logs and health output
    fn name(&self) -> &'static str;
}

/// In-memory ledger backend (for testing and local runs)
///
/// Each symbol lives in a dashmap shard; the check-and-increment runs while the
/// shard's write lock is held, so it cannot interleave with another like.
#[derive(Debug, Default, Clone)]
pub struct InMemoryLedger {
    records: Arc<DashMap<String, StockRecord>>,
}

impl InMemoryLedger {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

#[async_trait::async_trait]
impl LedgerBackend for InMemoryLedger {
    async fn find(&self, symbol: &str) -> Result<Option<StockRecord>> {
        Ok(self.records.get(symbol).map(|entry| entry.value().clone()))
    }

    async fn find_or_create(&self, symbol: &str) -> Result<StockRecord> {
        let entry = self
            .records
            .entry(symbol.to_string())
            .or_insert_with(|| {
                tracing::debug!("Creating ledger record for {}", symbol);
                StockRecord::new(symbol)
            });

        Ok(entry.value().clone())
    }

    async fn add_like_if_absent(
        &self,
        symbol: &str,
        visitor: &VisitorHash,
    ) -> Result<StockRecord> {
        let mut entry =
            self.records.entry(symbol.to_string()).or_insert_with(|| StockRecord::new(symbol));

        if !entry.value_mut().apply_like(visitor) {
            tracing::debug!("Visitor {} already liked {}", visitor.short(), symbol);
        }

        Ok(entry.value().clone())
    }

    async fn clear(&self) -> Result<u64> {
        let removed = self.records.len() as u64;
        self.records.clear();

        tracing::info!("Cleared {} in-memory ledger records", removed);

        Ok(removed)
    }

    async fn ping(&self) -> Result<()> {
        Ok(())
    }

    fn name(&self) -> &'static str {
        "memory"
    }
}
