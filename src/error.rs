//! Error taxonomy for the gateway's routing failures.
//!
//! Grounded on the *shape* (not the envelope) of
//! `src/gateway/types/response.rs`'s `ApiError`/`IntoResponse` pairing —
//! a `thiserror` enum whose variants map onto HTTP status codes via a single
//! `impl IntoResponse` — but emitting the `{error, message}` body the
//! external interface contract fixes instead of the teacher's generic
//! `{code, msg, data}` envelope.
//!
//! The shard process has no equivalent type: its `/orders` responses are the
//! spec-pinned `OrderAccepted`/`OrderRejected` shapes (`shard_server.rs`),
//! not a generic error envelope, so a `ShardError` enum would have no body
//! format to produce and nothing to call it. Shard startup failures exit the
//! process directly (`bin/shard.rs`) rather than becoming an HTTP response.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;

/// Errors raised inside the gateway process while routing a request onward
/// to the owning shard.
#[derive(Debug, thiserror::Error)]
pub enum GatewayError {
    #[error("invalid order: {0}")]
    Validation(String),

    #[error("unknown symbol: {0}")]
    UnknownSymbol(String),

    #[error("symbol {0} has no configured shard")]
    Misconfigured(String),

    #[error("unknown shard: {0}")]
    UnknownShard(String),

    #[error("shard unreachable: {0}")]
    ShardUnreachable(String),

    #[error("shard timed out")]
    ShardTimeout,
}

impl IntoResponse for GatewayError {
    fn into_response(self) -> Response {
        let (status, error_code) = match &self {
            GatewayError::Validation(_) => (StatusCode::BAD_REQUEST, "INVALID_ORDER"),
            GatewayError::UnknownSymbol(_) => (StatusCode::NOT_FOUND, "UNKNOWN_SYMBOL"),
            GatewayError::Misconfigured(_) => (StatusCode::NOT_FOUND, "MISCONFIGURED_SYMBOL"),
            GatewayError::UnknownShard(_) => (StatusCode::NOT_FOUND, "UNKNOWN_SHARD"),
            GatewayError::ShardUnreachable(_) => (StatusCode::BAD_GATEWAY, "SHARD_UNREACHABLE"),
            GatewayError::ShardTimeout => (StatusCode::GATEWAY_TIMEOUT, "SHARD_TIMEOUT"),
        };
        let body = Json(json!({
            "error": error_code,
            "message": self.to_string(),
        }));
        (status, body).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn misconfigured_symbol_maps_to_not_found() {
        let response = GatewayError::Misconfigured("XYZ".into()).into_response();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[test]
    fn shard_unreachable_maps_to_bad_gateway() {
        let response = GatewayError::ShardUnreachable("http://shard-a".into()).into_response();
        assert_eq!(response.status(), StatusCode::BAD_GATEWAY);
    }

    #[test]
    fn shard_timeout_maps_to_gateway_timeout() {
        let response = GatewayError::ShardTimeout.into_response();
        assert_eq!(response.status(), StatusCode::GATEWAY_TIMEOUT);
    }
}
