//! Service state management and component initialization

use anyhow::{Context, Result};
use std::future::Future;
use std::net::SocketAddr;
use std::sync::Arc;
use tracing::info;

use crate::config::ServiceConfig;
use like_ledger::LikeLedger;
use quote_fetcher::QuoteFetcher;
use stock_gateway::{create_routes, AppState, StockLookup};

/// Service state containing all initialized components
pub struct ServiceState {
    /// Service configuration
    pub config: ServiceConfig,

    /// Like storage, connected and migrated
    pub ledger: LikeLedger,

    /// Shared HTTP state
    pub gateway: Arc<AppState>,
}

impl ServiceState {
    /// Connect storage first; nothing listens until it is reachable
    pub async fn new(config: ServiceConfig) -> Result<Self> {
        info!("Initializing service components...");

        info!("Connecting {} ledger...", config.ledger.backend);
        let ledger = like_ledger::connect(&config.ledger)
            .await
            .context("Failed to connect to like storage")?;

        info!("Initializing QuoteFetcher for {}...", config.quotes.api_base_url);
        let fetcher =
            QuoteFetcher::new(config.quotes.clone()).context("Failed to create QuoteFetcher")?;

        let lookup = StockLookup::new(Arc::new(fetcher), ledger.clone());
        let gateway = Arc::new(AppState::new(lookup, ledger.clone(), config.gateway.clone()));

        if config.gateway.test_mode {
            info!("Test mode enabled: reset route mounted, rate limiting off");
        }

        Ok(Self { config, ledger, gateway })
    }

    /// Bind the listener; the returned future serves until `shutdown` resolves
    pub fn bind(
        &self,
        shutdown: impl Future<Output = ()> + Send + 'static,
    ) -> Result<(SocketAddr, impl Future<Output = ()>)> {
        let routes = create_routes(self.gateway.clone());
        let addr = self.config.socket_addr();

        let (bound, server) = warp::serve(routes)
            .try_bind_with_graceful_shutdown(addr, shutdown)
            .with_context(|| format!("Failed to bind {}", addr))?;

        info!("Stock Price Checker listening on http://{}", bound);
        Ok((bound, server))
    }
}
