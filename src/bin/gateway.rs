//! Gateway process entry point.
//!
//! Mirrors `bin/shard.rs`'s load-config/init-logging/bind-or-exit shape,
//! minus the consumer thread: the gateway has no book or ring of its own, it
//! only routes.

use shardbook::config::GatewayConfig;
use shardbook::gateway_server::{router, GatewayState};
use shardbook::logging::init_logging;
use shardbook::metrics::MetricsRegistry;
use shardbook::router::SymbolRouter;
use std::sync::Arc;

#[tokio::main]
async fn main() {
    let config = match GatewayConfig::from_env() {
        Ok(c) => c,
        Err(err) => {
            eprintln!("startup failure: {err}");
            std::process::exit(1);
        }
    };

    let _log_guard = init_logging("gateway", &config.common);
    tracing::info!(git_hash = env!("GIT_HASH"), "starting gateway");

    let symbol_router = SymbolRouter::new(config.shard_base_urls, config.symbol_to_shard);
    let metrics = Arc::new(MetricsRegistry::new());
    let state = Arc::new(GatewayState::new(symbol_router, metrics));

    let app = router(state);
    let addr = format!("0.0.0.0:{}", config.common.http_port);
    let listener = match tokio::net::TcpListener::bind(&addr).await {
        Ok(l) => l,
        Err(err) => {
            tracing::error!(address = %addr, error = %err, "failed to bind HTTP listener");
            std::process::exit(1);
        }
    };

    tracing::info!(address = %addr, "gateway listening");
    if let Err(err) = axum::serve(listener, app).await {
        tracing::error!(error = %err, "HTTP server error");
        std::process::exit(1);
    }
}
