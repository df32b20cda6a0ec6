//! Persisted per-symbol like state

use crate::error::{LedgerError, Result};
use crate::visitor::VisitorHash;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// Longest ticker symbol accepted after trimming
pub const MAX_SYMBOL_LEN: usize = 16;

/// One record per upper-cased ticker symbol
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StockRecord {
    pub symbol: String,
    pub likes: i64,
    pub visitor_hashes: BTreeSet<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl StockRecord {
    /// Zero-state record for a freshly seen symbol
    pub fn new(symbol: impl Into<String>) -> Self {
        let now = Utc::now();
        Self {
            symbol: symbol.into(),
            likes: 0,
            visitor_hashes: BTreeSet::new(),
            created_at: now,
            updated_at: now,
        }
    }

    pub fn has_liked(&self, visitor: &VisitorHash) -> bool {
        self.visitor_hashes.contains(visitor.as_str())
    }

    /// Record a like from `visitor` unless it is already present.
    ///
    /// Counter and hash set move together; returns whether anything changed.
    pub(crate) fn apply_like(&mut self, visitor: &VisitorHash) -> bool {
        if !self.visitor_hashes.insert(visitor.as_str().to_string()) {
            return false;
        }
        self.likes += 1;
        self.updated_at = Utc::now();
        true
    }

    /// `likes == |visitor_hashes|`
    pub fn is_consistent(&self) -> bool {
        usize::try_from(self.likes).map_or(false, |likes| likes == self.visitor_hashes.len())
    }
}

/// Trim and upper-case a ticker symbol, rejecting values that cannot be a ticker
pub fn normalize_symbol(raw: &str) -> Result<String> {
    let symbol = raw.trim().to_uppercase();

    if symbol.is_empty() {
        return Err(LedgerError::invalid_symbol("stock symbol must not be empty"));
    }

    if symbol.chars().count() > MAX_SYMBOL_LEN {
        return Err(LedgerError::invalid_symbol(format!(
            "stock symbol longer than {} characters",
            MAX_SYMBOL_LEN
        )));
    }

    if symbol.chars().any(|c| c.is_whitespace() || c.is_control()) {
        return Err(LedgerError::invalid_symbol(format!("unexpected whitespace in {:?}", symbol)));
    }

    Ok(symbol)
}
