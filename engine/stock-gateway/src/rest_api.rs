//! REST API endpoints for the StockGateway
//!
//! - `GET /api/stock-prices` - price + likes for one or two symbols
//! - `GET /health` - liveness and storage reachability
//! - `DELETE /api/test/stocks` - wipe the ledger (test mode only)
//! - `GET /` and `GET /public/*` - static front end

use crate::config::GatewayConfig;
use crate::error::GatewayError;
use crate::messages::{ErrorBody, StockPricesResponse, StockQuery};
use crate::orchestrator::{LookupRequest, StockLookup};
use crate::rate_limiter::RateLimiter;
use like_ledger::{LikeLedger, VisitorHash};
use std::convert::Infallible;
use std::net::SocketAddr;
use std::sync::Arc;
use tracing::{error, info, warn};
use warp::http::header::{
    HeaderMap, HeaderValue, CONTENT_SECURITY_POLICY, REFERRER_POLICY, X_CONTENT_TYPE_OPTIONS,
    X_FRAME_OPTIONS,
};
use warp::http::StatusCode;
use warp::reply::Response;
use warp::{Filter, Rejection, Reply};

const CSP: &str = "default-src 'self'; script-src 'self'; style-src 'self'";

/// Shared state handed to every handler
pub struct AppState {
    pub lookup: StockLookup,
    pub ledger: LikeLedger,
    pub rate_limiter: RateLimiter,
    pub config: GatewayConfig,
}

impl AppState {
    pub fn new(lookup: StockLookup, ledger: LikeLedger, config: GatewayConfig) -> Self {
        let rate_limiter =
            RateLimiter::new(config.rate_limit.clone(), config.rate_limit_enabled());
        Self { lookup, ledger, rate_limiter, config }
    }
}

fn json_reply<T: serde::Serialize>(body: &T, status: StatusCode) -> Response {
    warp::reply::with_status(warp::reply::json(body), status).into_response()
}

fn error_reply(err: &GatewayError) -> Response {
    match err {
        GatewayError::Input(_) | GatewayError::RateLimit(_) => warn!("Rejected lookup: {}", err),
        _ => error!("Lookup failed: {}", err),
    }
    json_reply(&err.body(), err.status())
}

/// Look up one or two stocks, optionally liking them
pub async fn get_stock_prices(
    raw_query: String,
    forwarded_for: Option<String>,
    remote: Option<SocketAddr>,
    state: Arc<AppState>,
) -> Result<Response, Rejection> {
    let forwarded = forwarded_for.as_deref().filter(|_| state.config.trust_proxy);
    let visitor = VisitorHash::from_request(forwarded, remote.map(|addr| addr.ip()));

    if let Err(e) = state.rate_limiter.check(visitor.as_str()).await {
        return Ok(error_reply(&e));
    }

    let query = match StockQuery::parse(&raw_query) {
        Ok(query) => query,
        Err(e) => return Ok(error_reply(&e)),
    };

    let request =
        LookupRequest { symbols: query.symbols, wants_like: query.wants_like, visitor };

    match state.lookup.lookup(&request).await {
        Ok(stock_data) => Ok(json_reply(&StockPricesResponse { stock_data }, StatusCode::OK)),
        Err(e) => Ok(error_reply(&e)),
    }
}

/// Liveness plus a storage ping
pub async fn health_check(state: Arc<AppState>) -> Result<Response, Rejection> {
    let (storage, status) = match state.ledger.ping().await {
        Ok(()) => ("ok", StatusCode::OK),
        Err(e) => {
            error!("Health check storage ping failed: {}", e);
            ("unavailable", StatusCode::SERVICE_UNAVAILABLE)
        }
    };

    let body = serde_json::json!({
        "status": if status == StatusCode::OK { "healthy" } else { "degraded" },
        "storage": storage,
        "backend": state.ledger.backend_name(),
        "timestamp": chrono::Utc::now().to_rfc3339(),
    });

    Ok(json_reply(&body, status))
}

/// Administrative reset used by functional test runs
pub async fn reset_stocks(state: Arc<AppState>) -> Result<Response, Rejection> {
    match state.ledger.clear().await {
        Ok(deleted) => {
            info!("Test reset removed {} stock records", deleted);
            Ok(json_reply(&serde_json::json!({ "deleted": deleted }), StatusCode::OK))
        }
        Err(e) => Ok(error_reply(&GatewayError::from(e))),
    }
}

/// Map leftover rejections to JSON bodies
pub async fn handle_rejection(err: Rejection) -> Result<Response, Infallible> {
    if err.is_not_found() {
        return Ok(json_reply(&ErrorBody::new("Not found"), StatusCode::NOT_FOUND));
    }

    if let Some(forbidden) = err.find::<warp::cors::CorsForbidden>() {
        warn!("CORS request refused: {}", forbidden);
        return Ok(json_reply(&ErrorBody::new("Forbidden"), StatusCode::FORBIDDEN));
    }

    if err.find::<warp::reject::MethodNotAllowed>().is_some() {
        return Ok(json_reply(
            &ErrorBody::new("Method not allowed"),
            StatusCode::METHOD_NOT_ALLOWED,
        ));
    }

    error!("Unhandled rejection: {:?}", err);
    Ok(json_reply(&ErrorBody::new("Internal error"), StatusCode::INTERNAL_SERVER_ERROR))
}

/// Headers attached to every response
pub fn security_headers() -> HeaderMap {
    let mut headers = HeaderMap::new();
    headers.insert(CONTENT_SECURITY_POLICY, HeaderValue::from_static(CSP));
    headers.insert(X_CONTENT_TYPE_OPTIONS, HeaderValue::from_static("nosniff"));
    headers.insert(X_FRAME_OPTIONS, HeaderValue::from_static("SAMEORIGIN"));
    headers.insert(REFERRER_POLICY, HeaderValue::from_static("no-referrer"));
    headers
}

/// Create all routes
pub fn create_routes(
    state: Arc<AppState>,
) -> impl Filter<Extract = impl Reply, Error = Infallible> + Clone {
    let test_mode = state.config.test_mode;
    let public_dir = state.config.public_dir.clone();
    let index_file = state.config.index_file.clone();
    let state_filter = warp::any().map(move || state.clone());

    // An absent query string is a 400 from the handler, not a rejection
    let raw_query = warp::query::raw().or(warp::any().map(String::new)).unify();

    let stock_prices = warp::path!("api" / "stock-prices")
        .and(warp::get())
        .and(raw_query)
        .and(warp::header::optional::<String>("x-forwarded-for"))
        .and(warp::addr::remote())
        .and(state_filter.clone())
        .and_then(get_stock_prices);

    let health = warp::path("health")
        .and(warp::path::end())
        .and(warp::get())
        .and(state_filter.clone())
        .and_then(health_check);

    let only_in_test_mode = warp::any()
        .and_then(move || async move {
            if test_mode {
                Ok(())
            } else {
                Err(warp::reject::not_found())
            }
        })
        .untuple_one();

    let reset = warp::path!("api" / "test" / "stocks")
        .and(warp::delete())
        .and(only_in_test_mode)
        .and(state_filter)
        .and_then(reset_stocks);

    let index = warp::path::end().and(warp::get()).and(warp::fs::file(index_file));

    let public = warp::path("public").and(warp::get()).and(warp::fs::dir(public_dir));

    let cors = warp::cors().allow_any_origin().allow_methods(vec!["GET"]);

    stock_prices
        .or(health)
        .or(reset)
        .or(index)
        .or(public)
        .with(cors)
        .recover(handle_rejection)
        .with(warp::reply::with::headers(security_headers()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::RateLimitConfig;
    use crate::test_support::{harness, offline_state};
    use like_ledger::LedgerBackend;
    use serde_json::Value;

    const VISITOR: &str = "198.51.100.23";

    async fn get(state: &Arc<AppState>, path: &str, forwarded: &str) -> (StatusCode, Value) {
        let routes = create_routes(state.clone());
        let response = warp::test::request()
            .method("GET")
            .path(path)
            .header("x-forwarded-for", forwarded)
            .reply(&routes)
            .await;

        let body = serde_json::from_slice(response.body()).unwrap_or(Value::Null);
        (response.status(), body)
    }

    #[tokio::test]
    async fn test_single_stock_lookup() {
        let h = harness(GatewayConfig::for_tests());

        let (status, body) = get(&h.state, "/api/stock-prices?stock=GOOG", VISITOR).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["stockData"]["stock"], "GOOG");
        assert!(body["stockData"]["price"].is_f64());
        assert_eq!(body["stockData"]["likes"], 0);
    }

    #[tokio::test]
    async fn test_like_scenario_end_to_end() {
        let h = harness(GatewayConfig::for_tests());

        let (status, body) = get(&h.state, "/api/stock-prices?stock=GOOG", VISITOR).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["stockData"]["stock"], "GOOG");

        let (_, liked) = get(&h.state, "/api/stock-prices?stock=GOOG&like=true", VISITOR).await;
        let likes = liked["stockData"]["likes"].as_i64().unwrap();
        assert!(likes >= 1);

        let (_, again) = get(&h.state, "/api/stock-prices?stock=GOOG&like=true", VISITOR).await;
        assert_eq!(again["stockData"]["likes"].as_i64().unwrap(), likes);

        let (status, both) =
            get(&h.state, "/api/stock-prices?stock=GOOG&stock=MSFT", VISITOR).await;
        assert_eq!(status, StatusCode::OK);
        let entries = both["stockData"].as_array().unwrap();
        assert_eq!(entries.len(), 2);
        for entry in entries {
            assert!(entry.get("stock").is_some());
            assert!(entry["price"].is_number());
            assert!(entry.get("rel_likes").is_some());
        }

        let (_, liked_both) =
            get(&h.state, "/api/stock-prices?stock=GOOG&stock=MSFT&like=true", VISITOR).await;
        let entries = liked_both["stockData"].as_array().unwrap();
        assert_eq!(entries[0]["stock"], "GOOG");
        assert_eq!(entries[1]["stock"], "MSFT");
        let sum = entries[0]["rel_likes"].as_i64().unwrap() + entries[1]["rel_likes"].as_i64().unwrap();
        assert_eq!(sum, 0);
    }

    #[tokio::test]
    async fn test_like_on_checkbox_value() {
        let h = harness(GatewayConfig::for_tests());

        let (_, body) = get(&h.state, "/api/stock-prices?stock=msft&like=on", VISITOR).await;

        assert_eq!(body["stockData"]["stock"], "MSFT");
        assert_eq!(body["stockData"]["likes"], 1);
    }

    #[tokio::test]
    async fn test_missing_stock_is_400_without_side_effects() {
        let h = harness(GatewayConfig::for_tests());

        for path in ["/api/stock-prices", "/api/stock-prices?like=true", "/api/stock-prices?stock="] {
            let (status, body) = get(&h.state, path, VISITOR).await;
            assert_eq!(status, StatusCode::BAD_REQUEST, "{}", path);
            assert!(body["error"].is_string());
        }

        assert!(h.backend.is_empty());
        assert_eq!(h.quotes.calls(), 0);
    }

    #[tokio::test]
    async fn test_three_stocks_is_400() {
        let h = harness(GatewayConfig::for_tests());

        let (status, body) =
            get(&h.state, "/api/stock-prices?stock=A&stock=B&stock=C", VISITOR).await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(body["error"].as_str().unwrap().contains("one or two"));
    }

    #[tokio::test]
    async fn test_upstream_failure_is_500_with_detail() {
        let h = harness(GatewayConfig::for_tests());

        let (status, body) = get(&h.state, "/api/stock-prices?stock=ZZZZ", VISITOR).await;

        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body["error"], "Internal error");
        assert!(body["detail"].as_str().unwrap().contains("ZZZZ"));
    }

    #[tokio::test]
    async fn test_storage_failure_is_500() {
        let state = offline_state();

        let (status, body) = get(&state, "/api/stock-prices?stock=GOOG", VISITOR).await;

        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body["error"], "Internal error");
    }

    #[tokio::test]
    async fn test_visitor_from_forwarded_header_and_peer() {
        let h = harness(GatewayConfig::for_tests());
        let routes = create_routes(h.state.clone());

        // Same /24 through the proxy header counts as one visitor
        get(&h.state, "/api/stock-prices?stock=AAPL&like=true", "203.0.113.9, 10.0.0.1").await;
        let (_, body) = get(&h.state, "/api/stock-prices?stock=AAPL&like=true", "203.0.113.77").await;
        assert_eq!(body["stockData"]["likes"], 1);

        // No header: the peer address identifies the visitor
        let response = warp::test::request()
            .method("GET")
            .path("/api/stock-prices?stock=AAPL&like=true")
            .remote_addr("192.0.2.50:40000".parse().unwrap())
            .reply(&routes)
            .await;
        let body: Value = serde_json::from_slice(response.body()).unwrap();
        assert_eq!(body["stockData"]["likes"], 2);
    }

    #[tokio::test]
    async fn test_untrusted_proxy_header_is_ignored() {
        let config = GatewayConfig { trust_proxy: false, ..GatewayConfig::for_tests() };
        let h = harness(config);
        let routes = create_routes(h.state.clone());

        for forwarded in ["198.51.100.1", "203.0.113.1"] {
            warp::test::request()
                .method("GET")
                .path("/api/stock-prices?stock=GOOG&like=true")
                .header("x-forwarded-for", forwarded)
                .remote_addr("192.0.2.50:40000".parse().unwrap())
                .reply(&routes)
                .await;
        }

        let record = h.backend.find("GOOG").await.unwrap().unwrap();
        assert_eq!(record.likes, 1);
    }

    #[tokio::test]
    async fn test_security_headers_present() {
        let h = harness(GatewayConfig::for_tests());
        let routes = create_routes(h.state.clone());

        let response =
            warp::test::request().method("GET").path("/api/stock-prices?stock=GOOG").reply(&routes).await;

        assert_eq!(response.headers()[CONTENT_SECURITY_POLICY], CSP);
        assert_eq!(response.headers()[X_CONTENT_TYPE_OPTIONS], "nosniff");
        assert!(response.headers().get("x-powered-by").is_none());

        // Error responses carry them too
        let response = warp::test::request().method("GET").path("/nope").reply(&routes).await;
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        assert_eq!(response.headers()[CONTENT_SECURITY_POLICY], CSP);
    }

    #[tokio::test]
    async fn test_cors_allows_any_origin() {
        let h = harness(GatewayConfig::for_tests());
        let routes = create_routes(h.state.clone());

        let response = warp::test::request()
            .method("GET")
            .path("/api/stock-prices?stock=GOOG")
            .header("origin", "https://example.org")
            .reply(&routes)
            .await;

        assert_eq!(response.status(), StatusCode::OK);
        assert!(response.headers().contains_key("access-control-allow-origin"));
    }

    #[tokio::test]
    async fn test_rate_limit_outside_test_mode() {
        let config = GatewayConfig {
            rate_limit: RateLimitConfig { max_requests: 2, window_seconds: 60 },
            ..Default::default()
        };
        let h = harness(config);

        for _ in 0..2 {
            let (status, _) = get(&h.state, "/api/stock-prices?stock=GOOG", VISITOR).await;
            assert_eq!(status, StatusCode::OK);
        }

        let (status, body) = get(&h.state, "/api/stock-prices?stock=GOOG", VISITOR).await;
        assert_eq!(status, StatusCode::TOO_MANY_REQUESTS);
        assert!(body["error"].is_string());

        let (status, _) = get(&h.state, "/api/stock-prices?stock=GOOG", "192.0.2.99").await;
        assert_eq!(status, StatusCode::OK);
    }

    #[tokio::test]
    async fn test_health_reports_storage() {
        let h = harness(GatewayConfig::for_tests());
        let (status, body) = get(&h.state, "/health", VISITOR).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "healthy");
        assert_eq!(body["backend"], "memory");

        let (status, body) = get(&offline_state(), "/health", VISITOR).await;
        assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
        assert_eq!(body["storage"], "unavailable");
    }

    #[tokio::test]
    async fn test_reset_route_only_in_test_mode() {
        let h = harness(GatewayConfig::for_tests());
        get(&h.state, "/api/stock-prices?stock=GOOG", VISITOR).await;
        assert_eq!(h.backend.len(), 1);

        let routes = create_routes(h.state.clone());
        let response =
            warp::test::request().method("DELETE").path("/api/test/stocks").reply(&routes).await;
        assert_eq!(response.status(), StatusCode::OK);
        let body: Value = serde_json::from_slice(response.body()).unwrap();
        assert_eq!(body["deleted"], 1);
        assert!(h.backend.is_empty());

        let prod = harness(GatewayConfig::default());
        let routes = create_routes(prod.state.clone());
        let response =
            warp::test::request().method("DELETE").path("/api/test/stocks").reply(&routes).await;
        assert_ne!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn test_static_index_and_public_files() {
        let dir = tempfile::TempDir::new().unwrap();
        let public_dir = dir.path().join("public");
        std::fs::create_dir_all(&public_dir).unwrap();
        std::fs::write(public_dir.join("style.css"), "body { margin: 0; }").unwrap();
        let index_file = dir.path().join("index.html");
        std::fs::write(&index_file, "<h1>Stock Price Checker</h1>").unwrap();

        let config = GatewayConfig { public_dir, index_file, ..GatewayConfig::for_tests() };
        let h = harness(config);
        let routes = create_routes(h.state.clone());

        let response = warp::test::request().method("GET").path("/").reply(&routes).await;
        assert_eq!(response.status(), StatusCode::OK);
        assert!(String::from_utf8_lossy(response.body()).contains("Stock Price Checker"));

        let response =
            warp::test::request().method("GET").path("/public/style.css").reply(&routes).await;
        assert_eq!(response.status(), StatusCode::OK);
    }
}
