use crate::config::QuoteFetcherConfig;
use crate::error::{QuoteError, Result};
use async_trait::async_trait;
use reqwest::Client;
use serde_json::Value;
use tracing::{debug, error};

/// Anything that can price a ticker symbol
#[async_trait]
pub trait QuoteSource: Send + Sync {
    /// Fetch the current price for `symbol`
    async fn fetch_price(&self, symbol: &str) -> Result<f64>;
}

/// reqwest-backed client for the upstream quote proxy
#[derive(Debug, Clone)]
pub struct QuoteFetcher {
    config: QuoteFetcherConfig,
    client: Client,
}

impl QuoteFetcher {
    /// Create a new fetcher; the configured timeout bounds every call
    pub fn new(config: QuoteFetcherConfig) -> Result<Self> {
        config.validate()?;

        let client = Client::builder().timeout(config.timeout()).build()?;

        Ok(Self { config, client })
    }

    pub fn config(&self) -> &QuoteFetcherConfig {
        &self.config
    }

    fn classify(&self, symbol: &str, err: reqwest::Error) -> QuoteError {
        if err.is_timeout() {
            QuoteError::Timeout { symbol: symbol.to_string(), after_ms: self.config.timeout_ms }
        } else {
            QuoteError::Http(err)
        }
    }
}

#[async_trait]
impl QuoteSource for QuoteFetcher {
    async fn fetch_price(&self, symbol: &str) -> Result<f64> {
        let url = self.config.quote_url(symbol);
        debug!("Fetching quote for {} from {}", symbol, url);

        let response =
            self.client.get(&url).send().await.map_err(|e| self.classify(symbol, e))?;

        let status = response.status();
        if !status.is_success() {
            error!("Quote service returned {} for {}", status, symbol);
            return Err(QuoteError::Status {
                symbol: symbol.to_string(),
                status: status.as_u16(),
            });
        }

        let payload: Value = response.json().await.map_err(|e| self.classify(symbol, e))?;

        let price = extract_price(symbol, &payload, &self.config.price_fields)?;
        debug!("Resolved {} at {}", symbol, price);
        Ok(price)
    }
}

/// Pick the first present, non-null price field in `fields` order.
///
/// Numeric strings are accepted; anything else that is present but not a finite
/// number is an error rather than a fallthrough to the next field.
pub fn extract_price(symbol: &str, payload: &Value, fields: &[String]) -> Result<f64> {
    let candidate = fields.iter().filter_map(|field| payload.get(field)).find(|v| !v.is_null());

    let Some(value) = candidate else {
        return Err(QuoteError::MissingPrice { symbol: symbol.to_string() });
    };

    let price = match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    };

    match price {
        Some(p) if p.is_finite() => Ok(p),
        _ => Err(QuoteError::InvalidPrice { symbol: symbol.to_string(), value: value.to_string() }),
    }
}
