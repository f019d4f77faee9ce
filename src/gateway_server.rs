//! Gateway HTTP surface: `POST /orders` (proxy), `POST /seed/{shardId}`
//! (passthrough), `GET /health`.
//!
//! Grounded on `src/gateway/mod.rs`'s `run_server` + `AppState` shape, with
//! its auth middleware, WebSocket fan-out, and multi-subsystem state
//! stripped: the gateway here does exactly one thing, look up the owning
//! shard for a symbol and reverse-proxy the request with `reqwest`, meeting
//! the contract's 400/404/502/504 error classification.

use axum::body::Bytes;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use std::sync::Arc;
use std::time::Duration;

use crate::error::GatewayError;
use crate::metrics::MetricsRegistry;
use crate::router::{RouteError, SymbolRouter};

pub struct GatewayState {
    pub router: SymbolRouter,
    pub client: reqwest::Client,
    pub metrics: Arc<MetricsRegistry>,
}

impl GatewayState {
    pub fn new(router: SymbolRouter, metrics: Arc<MetricsRegistry>) -> Self {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(5))
            .build()
            .expect("failed to build reqwest client");
        Self { router, client, metrics }
    }
}

/// Extract `symbol` from an already-parsed JSON body without fully
/// deserializing the order — the gateway only needs to route, not validate.
fn extract_symbol(body: &[u8]) -> Option<String> {
    let value: serde_json::Value = serde_json::from_slice(body).ok()?;
    value.get("symbol")?.as_str().map(str::to_string)
}

async fn proxy_order(State(state): State<Arc<GatewayState>>, body: Bytes) -> Response {
    let Some(symbol) = extract_symbol(&body) else {
        state.metrics.gw_routing_errors_total.with_label_values(&["bad_body"]).inc();
        return GatewayError::Validation("body missing or malformed \"symbol\" field".to_string()).into_response();
    };

    let shard_id = match state.router.shard_id(&symbol) {
        Ok(id) => id.clone(),
        Err(RouteError::UnknownSymbol) => {
            state.metrics.gw_routing_errors_total.with_label_values(&["unknown_symbol"]).inc();
            return GatewayError::UnknownSymbol(symbol).into_response();
        }
        Err(RouteError::Misconfigured) => {
            state.metrics.gw_routing_errors_total.with_label_values(&["misconfigured"]).inc();
            return GatewayError::Misconfigured(symbol).into_response();
        }
    };
    let base_url = state.router.shard_url(&symbol).expect("shard_id succeeded so shard_url must too, barring a race on immutable config");

    let timer = state.metrics.gw_request_duration_seconds.with_label_values(&[&shard_id]).start_timer();
    let result = state
        .client
        .post(format!("{base_url}/orders"))
        .header("content-type", "application/json")
        .body(body)
        .send()
        .await;
    drop(timer);

    match result {
        Ok(response) => {
            let status = response.status();
            state
                .metrics
                .gw_requests_total
                .with_label_values(&[&shard_id, if status.is_success() { "ok" } else { "error" }])
                .inc();
            let status_code = StatusCode::from_u16(status.as_u16()).unwrap_or(StatusCode::BAD_GATEWAY);
            let bytes = response.bytes().await.unwrap_or_default();
            (status_code, bytes).into_response()
        }
        Err(err) => {
            state.metrics.gw_requests_total.with_label_values(&[&shard_id, "error"]).inc();
            if err.is_timeout() {
                GatewayError::ShardTimeout.into_response()
            } else {
                GatewayError::ShardUnreachable(err.to_string()).into_response()
            }
        }
    }
}

async fn proxy_seed(State(state): State<Arc<GatewayState>>, Path(shard_id): Path<String>, body: Bytes) -> Response {
    let Some(base_url) = state.router.shard_url_by_id(&shard_id) else {
        return GatewayError::UnknownShard(shard_id).into_response();
    };

    let result = state
        .client
        .post(format!("{base_url}/seed"))
        .header("content-type", "application/json")
        .body(body)
        .send()
        .await;

    match result {
        Ok(response) => {
            let status_code = StatusCode::from_u16(response.status().as_u16()).unwrap_or(StatusCode::BAD_GATEWAY);
            let bytes = response.bytes().await.unwrap_or_default();
            (status_code, bytes).into_response()
        }
        Err(err) if err.is_timeout() => GatewayError::ShardTimeout.into_response(),
        Err(err) => GatewayError::ShardUnreachable(err.to_string()).into_response(),
    }
}

async fn health() -> impl IntoResponse {
    Json(serde_json::json!({ "status": "UP" }))
}

async fn metrics_endpoint(State(state): State<Arc<GatewayState>>) -> impl IntoResponse {
    state.metrics.render()
}

pub fn router(state: Arc<GatewayState>) -> Router {
    Router::new()
        .route("/orders", post(proxy_order))
        .route("/seed/{shardId}", post(proxy_seed))
        .route("/health", get(health))
        .route("/metrics", get(metrics_endpoint))
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rustc_hash::FxHashMap;
    use tower::ServiceExt;

    fn state_with(base_urls: FxHashMap<String, String>, symbols: FxHashMap<String, String>) -> Arc<GatewayState> {
        Arc::new(GatewayState::new(SymbolRouter::new(base_urls, symbols), Arc::new(MetricsRegistry::new())))
    }

    #[tokio::test]
    async fn unknown_symbol_returns_404() {
        let app = router(state_with(FxHashMap::default(), FxHashMap::default()));
        let body = serde_json::json!({"orderId": "o1", "symbol": "X", "side": "BUY", "price": 100, "quantity": 5});
        let response = app
            .oneshot(
                axum::http::Request::post("/orders")
                    .header("content-type", "application/json")
                    .body(axum::body::Body::from(serde_json::to_vec(&body).unwrap()))
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn malformed_body_returns_400() {
        let app = router(state_with(FxHashMap::default(), FxHashMap::default()));
        let response = app
            .oneshot(
                axum::http::Request::post("/orders")
                    .header("content-type", "application/json")
                    .body(axum::body::Body::from("not json"))
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn unmapped_shard_id_returns_404_on_seed() {
        let app = router(state_with(FxHashMap::default(), FxHashMap::default()));
        let response = app
            .oneshot(
                axum::http::Request::post("/seed/zz")
                    .header("content-type", "application/json")
                    .body(axum::body::Body::from("{\"orders\":[]}"))
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn health_reports_up() {
        let app = router(state_with(FxHashMap::default(), FxHashMap::default()));
        let response = app
            .oneshot(axum::http::Request::get("/health").body(axum::body::Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }
}
