//! Rate limiting for the StockGateway

use crate::config::RateLimitConfig;
use crate::error::GatewayError;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Instant;
use tokio::sync::RwLock;

/// Above this many tracked visitors, idle entries are dropped on the next check
const PRUNE_THRESHOLD: usize = 10_000;

/// Sliding-window limiter keyed by visitor hash
#[derive(Debug, Clone)]
pub struct RateLimiter {
    requests: Arc<RwLock<HashMap<String, Vec<Instant>>>>,
    config: RateLimitConfig,
    enabled: bool,
}

impl RateLimiter {
    pub fn new(config: RateLimitConfig, enabled: bool) -> Self {
        Self { requests: Arc::new(RwLock::new(HashMap::new())), config, enabled }
    }

    /// A limiter that lets everything through
    pub fn disabled() -> Self {
        Self::new(RateLimitConfig::default(), false)
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// Record a request for `key`, failing once the window budget is spent
    pub async fn check(&self, key: &str) -> Result<(), GatewayError> {
        if !self.enabled {
            return Ok(());
        }

        let now = Instant::now();
        let window = self.config.window();

        let mut limiter = self.requests.write().await;

        if limiter.len() > PRUNE_THRESHOLD {
            limiter.retain(|_, times| times.iter().any(|&t| now.duration_since(t) < window));
        }

        let visitor_requests = limiter.entry(key.to_string()).or_insert_with(Vec::new);

        // Remove old requests outside the window
        visitor_requests.retain(|&time| now.duration_since(time) < window);

        if visitor_requests.len() >= self.config.max_requests as usize {
            return Err(GatewayError::RateLimit("Too many requests, try again later".to_string()));
        }

        visitor_requests.push(now);
        Ok(())
    }

    /// Number of visitors currently tracked
    pub async fn tracked(&self) -> usize {
        self.requests.read().await.len()
    }
}
