//! Stock lookup orchestration
//!
//! One symbol: price fetch and ledger find-or-create run together, then the
//! like (if any) is applied. Two symbols: all four reads run together, both
//! likes run together, and each side reports its likes relative to the other
//! using the post-like counts.

use crate::error::{GatewayError, GatewayResult};
use crate::messages::{RelativeStockQuote, StockData, StockQuote};
use like_ledger::{normalize_symbol, LikeLedger, StockRecord, VisitorHash};
use quote_fetcher::QuoteSource;
use std::sync::Arc;
use tracing::debug;

/// Everything one lookup needs
#[derive(Debug, Clone)]
pub struct LookupRequest {
    /// Raw symbols in request order; one or two
    pub symbols: Vec<String>,
    pub wants_like: bool,
    pub visitor: VisitorHash,
}

/// Combines quote prices with ledger like counts
#[derive(Clone)]
pub struct StockLookup {
    quotes: Arc<dyn QuoteSource>,
    ledger: LikeLedger,
}

impl StockLookup {
    pub fn new(quotes: Arc<dyn QuoteSource>, ledger: LikeLedger) -> Self {
        Self { quotes, ledger }
    }

    /// Resolve one or two symbols; any other count is an input error
    pub async fn lookup(&self, request: &LookupRequest) -> GatewayResult<StockData> {
        match request.symbols.as_slice() {
            [symbol] => {
                let quote = self.lookup_single(symbol, request.wants_like, &request.visitor).await?;
                Ok(StockData::Single(quote))
            }
            [first, second] => {
                let pair = self
                    .lookup_pair(first, second, request.wants_like, &request.visitor)
                    .await?;
                Ok(StockData::Pair(pair))
            }
            other => Err(GatewayError::Input(format!("pass one or two stocks, got {}", other.len()))),
        }
    }

    async fn lookup_single(
        &self,
        raw: &str,
        wants_like: bool,
        visitor: &VisitorHash,
    ) -> GatewayResult<StockQuote> {
        let symbol = normalize_symbol(raw)?;

        let (price, record) = tokio::try_join!(self.price(&symbol), self.record(&symbol))?;
        let record = self.like(record, visitor, wants_like).await?;

        debug!("Lookup {} -> price {} likes {}", symbol, price, record.likes);

        Ok(StockQuote { stock: symbol, price, likes: record.likes })
    }

    async fn lookup_pair(
        &self,
        first_raw: &str,
        second_raw: &str,
        wants_like: bool,
        visitor: &VisitorHash,
    ) -> GatewayResult<[RelativeStockQuote; 2]> {
        let first = normalize_symbol(first_raw)?;
        let second = normalize_symbol(second_raw)?;

        let (first_price, second_price, first_record, second_record) = tokio::try_join!(
            self.price(&first),
            self.price(&second),
            self.record(&first),
            self.record(&second),
        )?;

        let (first_record, second_record) = tokio::try_join!(
            self.like(first_record, visitor, wants_like),
            self.like(second_record, visitor, wants_like),
        )?;

        let rel_likes = first_record.likes - second_record.likes;
        debug!("Lookup {} vs {} -> rel_likes {}", first, second, rel_likes);

        Ok([
            RelativeStockQuote { stock: first, price: first_price, rel_likes },
            RelativeStockQuote { stock: second, price: second_price, rel_likes: -rel_likes },
        ])
    }

    async fn price(&self, symbol: &str) -> GatewayResult<f64> {
        Ok(self.quotes.fetch_price(symbol).await?)
    }

    async fn record(&self, symbol: &str) -> GatewayResult<StockRecord> {
        Ok(self.ledger.find_or_create(symbol).await?)
    }

    async fn like(
        &self,
        record: StockRecord,
        visitor: &VisitorHash,
        wants_like: bool,
    ) -> GatewayResult<StockRecord> {
        Ok(self.ledger.register_like(record, visitor, wants_like).await?)
    }
}
