//! Shard process entry point.
//!
//! Sequencing follows `gateway/mod.rs::run_server` and `pipeline_mt.rs`'s
//! spawn-thread-then-serve structure: load config, init logging, build the
//! shared resources (ring, book manager, WAL, publisher, metrics), spawn the
//! consumer thread, then serve the HTTP listener. A bind failure or any
//! other startup error exits non-zero per the Startup error kind.

use shardbook::config::ShardConfig;
use shardbook::handler::spawn_consumer;
use shardbook::logging::init_logging;
use shardbook::metrics::MetricsRegistry;
use shardbook::order_book_manager::OrderBookManager;
use shardbook::publisher::EventPublisher;
use shardbook::ring::ClaimRing;
use shardbook::shard_server::{router, ShardState};
use shardbook::wal::{WalConfig, WriteAheadLog};
use std::sync::atomic::AtomicBool;
use std::sync::{Arc, Mutex};

#[tokio::main]
async fn main() {
    let config = match ShardConfig::from_env() {
        Ok(c) => c,
        Err(err) => {
            eprintln!("startup failure: {err}");
            std::process::exit(1);
        }
    };

    let _log_guard = init_logging(&format!("shard-{}", config.shard_id), &config.common);
    tracing::info!(git_hash = env!("GIT_HASH"), shard_id = %config.shard_id, "starting shard");

    let ring = Arc::new(ClaimRing::new(config.ring_buffer_size));

    let mut books = OrderBookManager::new();
    for symbol in &config.symbols {
        books.register(symbol);
    }
    let books = Arc::new(Mutex::new(books));

    let wal_config = WalConfig::new(config.wal_path.clone(), config.wal_size_mb);
    let wal = match WriteAheadLog::open(&wal_config) {
        Ok(w) => w,
        Err(err) => {
            tracing::error!(error = %err, "failed to open WAL, aborting startup");
            std::process::exit(1);
        }
    };

    let publisher = Arc::new(EventPublisher::new(config.kafka_bootstrap.clone(), 4096));
    let metrics = Arc::new(MetricsRegistry::new());
    let shutdown = Arc::new(AtomicBool::new(false));

    let consumer = spawn_consumer(
        config.shard_id.clone(),
        ring.clone(),
        books.clone(),
        wal,
        publisher.clone(),
        metrics.clone(),
        shutdown.clone(),
    );

    let symbols: std::collections::HashSet<String> = config.symbols.iter().cloned().collect();
    let state = Arc::new(ShardState {
        shard_id: config.shard_id.clone(),
        symbols,
        ring,
        metrics,
        books,
    });

    let app = router(state);
    let addr = format!("0.0.0.0:{}", config.common.http_port);
    let listener = match tokio::net::TcpListener::bind(&addr).await {
        Ok(l) => l,
        Err(err) => {
            tracing::error!(address = %addr, error = %err, "failed to bind HTTP listener");
            std::process::exit(1);
        }
    };

    tracing::info!(address = %addr, "shard listening");
    if let Err(err) = axum::serve(listener, app).await {
        tracing::error!(error = %err, "HTTP server error");
        std::process::exit(1);
    }

    shutdown.store(true, std::sync::atomic::Ordering::Relaxed);
    let _ = consumer.join();
}
