//! Request and response shapes for `/api/stock-prices`

use crate::error::{GatewayError, GatewayResult};
use serde::{Deserialize, Serialize};

/// Single-symbol lookup result
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StockQuote {
    pub stock: String,
    pub price: f64,
    pub likes: i64,
}

/// One side of a two-symbol lookup
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RelativeStockQuote {
    pub stock: String,
    pub price: f64,
    pub rel_likes: i64,
}

/// `stockData` payload: an object for one symbol, a two-element array for two
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum StockData {
    Single(StockQuote),
    Pair([RelativeStockQuote; 2]),
}

/// Success body
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StockPricesResponse {
    #[serde(rename = "stockData")]
    pub stock_data: StockData,
}

/// Error body
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorBody {
    pub error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub detail: Option<String>,
}

impl ErrorBody {
    pub fn new(error: impl Into<String>) -> Self {
        Self { error: error.into(), detail: None }
    }

    pub fn with_detail(error: impl Into<String>, detail: impl Into<String>) -> Self {
        Self { error: error.into(), detail: Some(detail.into()) }
    }
}

/// Parsed query string of a lookup request
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StockQuery {
    /// Raw symbols in request order
    pub symbols: Vec<String>,
    pub wants_like: bool,
}

impl StockQuery {
    /// Parse `stock` (repeatable, also accepted as `stock[]`) and `like`.
    ///
    /// Cardinality is checked here; symbol contents are validated by the lookup.
    pub fn parse(raw: &str) -> GatewayResult<Self> {
        let mut symbols = Vec::new();
        let mut like = None;

        for (key, value) in url::form_urlencoded::parse(raw.as_bytes()) {
            match key.as_ref() {
                "stock" | "stock[]" => symbols.push(value.into_owned()),
                "like" if like.is_none() => like = Some(value.into_owned()),
                _ => {}
            }
        }

        match symbols.len() {
            0 => Err(GatewayError::Input("stock query parameter is required".to_string())),
            1 | 2 => Ok(Self { symbols, wants_like: like.as_deref().is_some_and(is_truthy) }),
            n => Err(GatewayError::Input(format!("pass one or two stocks, got {}", n))),
        }
    }
}

/// `"true"` in any case, or `"on"` (checkbox value)
pub fn is_truthy(value: &str) -> bool {
    value.eq_ignore_ascii_case("true") || value == "on"
}
