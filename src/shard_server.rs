//! Shard HTTP surface: `POST /orders`, `GET /health`, `POST /seed`.
//!
//! Grounded on `src/gateway/handlers/order.rs` and `handlers/health.rs`'s
//! `State<Arc<AppState>>` + handler-per-route shape: validate, push onto the
//! queue (here, the claim ring), and translate a full queue into 503 instead
//! of blocking. The generic `{code, msg, data}` envelope and the auth/utoipa
//! machinery are dropped; this shard emits the literal JSON bodies the
//! external interface contract fixes.

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::sync::Mutex;
use std::time::{SystemTime, UNIX_EPOCH};

use crate::core_types::{OrderType, Side};
use crate::metrics::MetricsRegistry;
use crate::models::Order;
use crate::order_book_manager::OrderBookManager;
use crate::ring::ClaimRing;

#[derive(Debug, Deserialize)]
pub struct OrderRequest {
    #[serde(rename = "orderId")]
    pub order_id: String,
    pub symbol: String,
    pub side: Side,
    #[serde(rename = "type", default)]
    pub order_type: OrderType,
    pub price: i64,
    pub quantity: u64,
    #[serde(default)]
    pub timestamp: Option<u64>,
}

#[derive(Debug, Serialize)]
struct OrderAccepted {
    status: &'static str,
    #[serde(rename = "orderId")]
    order_id: String,
    #[serde(rename = "shardId")]
    shard_id: String,
    timestamp: u64,
}

#[derive(Debug, Serialize)]
struct OrderRejected {
    status: &'static str,
    #[serde(rename = "orderId", skip_serializing_if = "Option::is_none")]
    order_id: Option<String>,
    reason: String,
}

#[derive(Debug, Serialize)]
struct HealthBody {
    status: &'static str,
    #[serde(rename = "shardId")]
    shard_id: String,
}

#[derive(Debug, Deserialize)]
struct SeedOrder {
    #[serde(rename = "orderId")]
    order_id: String,
    symbol: String,
    side: Side,
    #[serde(rename = "type", default)]
    order_type: OrderType,
    price: i64,
    quantity: u64,
}

#[derive(Debug, Deserialize)]
pub struct SeedRequest {
    orders: Vec<SeedOrder>,
}

#[derive(Debug, Serialize)]
struct SeedResponse {
    inserted: usize,
}

/// Shared, process-wide shard state. `books` is the same instance the
/// consumer thread matches against, behind a mutex the consumer only takes
/// once per drained batch; `/seed` is an explicit setup-only backdoor that
/// bypasses the ring and the matcher entirely and is never called once load
/// starts.
pub struct ShardState {
    pub shard_id: String,
    pub symbols: std::collections::HashSet<String>,
    pub ring: Arc<ClaimRing>,
    pub metrics: Arc<MetricsRegistry>,
    pub books: Arc<Mutex<OrderBookManager>>,
}

fn wall_clock_millis() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as u64)
        .unwrap_or(0)
}

fn validate(req: &OrderRequest, symbols: &std::collections::HashSet<String>) -> Result<(), String> {
    if !symbols.contains(&req.symbol) {
        return Err(format!("symbol {} not owned by this shard", req.symbol));
    }
    if req.price <= 0 {
        return Err("price must be > 0".to_string());
    }
    if req.quantity == 0 {
        return Err("quantity must be > 0".to_string());
    }
    Ok(())
}

async fn create_order(State(state): State<Arc<ShardState>>, Json(req): Json<OrderRequest>) -> impl IntoResponse {
    let validation_timer = state
        .metrics
        .order_validation_duration_seconds
        .with_label_values(&[&state.shard_id])
        .start_timer();
    let validation = validate(&req, &state.symbols);
    drop(validation_timer);

    if let Err(reason) = validation {
        let body = OrderRejected {
            status: "REJECTED",
            order_id: Some(req.order_id.clone()),
            reason,
        };
        return (StatusCode::BAD_REQUEST, Json(body)).into_response();
    }

    let sequence = match state.ring.try_claim() {
        Ok(seq) => seq,
        Err(_) => {
            let body = OrderRejected {
                status: "REJECTED",
                order_id: None,
                reason: "Ring buffer full".to_string(),
            };
            return (StatusCode::SERVICE_UNAVAILABLE, Json(body)).into_response();
        }
    };

    let now = wall_clock_millis();
    {
        let slot = state.ring.slot(sequence);
        slot.order_id = Some(req.order_id.clone());
        slot.symbol = req.symbol.clone();
        slot.side = Some(req.side);
        slot.order_type = req.order_type;
        slot.price_cents = req.price;
        slot.quantity = req.quantity;
        slot.wall_clock_millis = req.timestamp.unwrap_or(now);
        slot.received_monotonic_nanos = state.ring.monotonic_nanos();
    }
    state.ring.publish(sequence);

    let body = OrderAccepted {
        status: "ACCEPTED",
        order_id: req.order_id,
        shard_id: state.shard_id.clone(),
        timestamp: now,
    };
    (StatusCode::OK, Json(body)).into_response()
}

async fn health(State(state): State<Arc<ShardState>>) -> impl IntoResponse {
    Json(HealthBody {
        status: "UP",
        shard_id: state.shard_id.clone(),
    })
}

/// Setup-only backdoor: inserts directly into the book, bypassing the ring
/// and the matcher. Must never be used under load.
async fn seed(State(state): State<Arc<ShardState>>, Json(req): Json<SeedRequest>) -> impl IntoResponse {
    let mut books = state.books.lock().expect("order book manager mutex poisoned");
    let inserted = req.orders.len();
    let now = wall_clock_millis();
    for order in req.orders {
        let book = books.book_mut(&order.symbol);
        book.add(Order::new(
            order.order_id,
            order.symbol.clone(),
            order.side,
            order.order_type,
            order.price,
            order.quantity,
            now,
        ));
    }
    Json(SeedResponse { inserted })
}

async fn metrics_endpoint(State(state): State<Arc<ShardState>>) -> impl IntoResponse {
    state.metrics.render()
}

pub fn router(state: Arc<ShardState>) -> Router {
    Router::new()
        .route("/orders", post(create_order))
        .route("/health", get(health))
        .route("/seed", post(seed))
        .route("/metrics", get(metrics_endpoint))
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use super::*;
    use http_body_util::BodyExt;
    use tower::ServiceExt;

    fn state() -> Arc<ShardState> {
        let mut symbols = std::collections::HashSet::new();
        symbols.insert("X".to_string());
        Arc::new(ShardState {
            shard_id: "a".to_string(),
            symbols,
            ring: Arc::new(ClaimRing::new(8)),
            metrics: Arc::new(MetricsRegistry::new()),
            books: Arc::new(Mutex::new(OrderBookManager::new())),
        })
    }

    fn order_body(order_id: &str, symbol: &str) -> Vec<u8> {
        serde_json::to_vec(&serde_json::json!({
            "orderId": order_id, "symbol": symbol, "side": "BUY", "price": 100, "quantity": 5
        }))
        .unwrap()
    }

    #[tokio::test]
    async fn accepted_order_returns_200() {
        let app = router(state());
        let response = app
            .oneshot(
                axum::http::Request::post("/orders")
                    .header("content-type", "application/json")
                    .body(axum::body::Body::from(order_body("o1", "X")))
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn unowned_symbol_is_rejected_with_400() {
        let app = router(state());
        let response = app
            .oneshot(
                axum::http::Request::post("/orders")
                    .header("content-type", "application/json")
                    .body(axum::body::Body::from(order_body("o1", "UNKNOWN")))
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn full_ring_rejects_with_503() {
        let s = state();
        for _ in 0..8 {
            s.ring.try_claim().unwrap();
        }
        let app = router(s);
        let response = app
            .oneshot(
                axum::http::Request::post("/orders")
                    .header("content-type", "application/json")
                    .body(axum::body::Body::from(order_body("o9", "X")))
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
    }

    #[tokio::test]
    async fn health_reports_shard_id() {
        let app = router(state());
        let response = app
            .oneshot(axum::http::Request::get("/health").body(axum::body::Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        let json: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(json["shardId"], "a");
    }
}
