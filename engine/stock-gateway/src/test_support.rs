//! Stubs shared by the gateway tests

use crate::config::GatewayConfig;
use crate::orchestrator::StockLookup;
use crate::rest_api::AppState;
use async_trait::async_trait;
use like_ledger::{InMemoryLedger, LedgerBackend, LedgerError, LikeLedger, StockRecord, VisitorHash};
use quote_fetcher::{QuoteError, QuoteSource};
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

/// Fixed price table; unknown symbols answer like a 404 from upstream
#[derive(Debug, Default)]
pub struct StaticQuotes {
    prices: HashMap<String, f64>,
    calls: AtomicUsize,
}

impl StaticQuotes {
    pub fn new(prices: &[(&str, f64)]) -> Self {
        Self {
            prices: prices.iter().map(|(s, p)| (s.to_string(), *p)).collect(),
            calls: AtomicUsize::new(0),
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl QuoteSource for StaticQuotes {
    async fn fetch_price(&self, symbol: &str) -> quote_fetcher::Result<f64> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.prices
            .get(symbol)
            .copied()
            .ok_or_else(|| QuoteError::Status { symbol: symbol.to_string(), status: 404 })
    }
}

/// Backend whose storage is permanently down
#[derive(Debug, Default)]
pub struct OfflineLedger;

fn offline() -> LedgerError {
    LedgerError::config("storage offline")
}

#[async_trait]
impl LedgerBackend for OfflineLedger {
    async fn find(&self, _symbol: &str) -> like_ledger::Result<Option<StockRecord>> {
        Err(offline())
    }

    async fn find_or_create(&self, _symbol: &str) -> like_ledger::Result<StockRecord> {
        Err(offline())
    }

    async fn add_like_if_absent(
        &self,
        _symbol: &str,
        _visitor: &VisitorHash,
    ) -> like_ledger::Result<StockRecord> {
        Err(offline())
    }

    async fn clear(&self) -> like_ledger::Result<u64> {
        Err(offline())
    }

    async fn ping(&self) -> like_ledger::Result<()> {
        Err(offline())
    }

    fn name(&self) -> &'static str {
        "offline"
    }
}

pub fn default_quotes() -> Arc<StaticQuotes> {
    Arc::new(StaticQuotes::new(&[("GOOG", 2801.12), ("MSFT", 299.35), ("AAPL", 148.6)]))
}

pub struct Harness {
    pub quotes: Arc<StaticQuotes>,
    pub backend: InMemoryLedger,
    pub state: Arc<AppState>,
}

/// In-memory ledger plus static quotes behind a test-mode gateway
pub fn harness(config: GatewayConfig) -> Harness {
    let quotes = default_quotes();
    let backend = InMemoryLedger::new();
    let ledger = LikeLedger::new(Arc::new(backend.clone()));
    let lookup = StockLookup::new(quotes.clone(), ledger.clone());
    let state = Arc::new(AppState::new(lookup, ledger, config));

    Harness { quotes, backend, state }
}

/// Same as [`harness`] but every storage call fails
pub fn offline_state() -> Arc<AppState> {
    let ledger = LikeLedger::new(Arc::new(OfflineLedger));
    let lookup = StockLookup::new(default_quotes(), ledger.clone());
    Arc::new(AppState::new(lookup, ledger, GatewayConfig::for_tests()))
}
