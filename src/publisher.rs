//! `EventPublisher` — a non-blocking, fire-and-forget sink for
//! `ORDER_PLACED` and `MATCH_EXECUTED` events.
//!
//! Grounded on the "never let the event bus stall matching" framing already
//! present in the teacher's pipeline doc comments (`pipeline_mt.rs`'s
//! fan-out-to-Settlement design), but built here as a standalone bounded
//! `crossbeam_queue::ArrayQueue` drained by a background thread rather than a
//! cross-stage queue. No real broker client is wired up: `KAFKA_BOOTSTRAP` is
//! accepted and logged per the spec's note that the event bus is "treated as
//! an at-most-once, non-blocking sink", out of this crate's scope.

use crossbeam_queue::ArrayQueue;
use serde::Serialize;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;
use std::thread::JoinHandle;
use std::time::Duration;

#[derive(Debug, Clone, Serialize)]
#[serde(tag = "event_type")]
pub enum PublishedEvent {
    OrderPlaced {
        order_id: String,
        symbol: String,
        side: crate::core_types::Side,
        price_cents: i64,
        quantity: u64,
    },
    MatchExecuted {
        match_id: uuid::Uuid,
        taker_order_id: String,
        maker_order_id: String,
        symbol: String,
        execution_price: i64,
        execution_quantity: u64,
    },
}

/// Non-blocking sink. `send` never blocks the consumer thread: on overflow it
/// drops the event and logs once (the failure counter suppresses per-event
/// log spam).
pub struct EventPublisher {
    queue: Arc<ArrayQueue<PublishedEvent>>,
    dropped: Arc<AtomicU64>,
    shutdown: Arc<AtomicBool>,
    worker: Option<JoinHandle<()>>,
}

impl EventPublisher {
    /// `bootstrap` is logged only; this generation never opens a real
    /// connection to it.
    pub fn new(bootstrap: impl Into<String>, buffer_capacity: usize) -> Self {
        let bootstrap = bootstrap.into();
        let queue = Arc::new(ArrayQueue::new(buffer_capacity));
        let dropped = Arc::new(AtomicU64::new(0));
        let shutdown = Arc::new(AtomicBool::new(false));

        let worker_queue = queue.clone();
        let worker_shutdown = shutdown.clone();
        let worker = std::thread::Builder::new()
            .name("event-publisher".into())
            .spawn(move || {
                tracing::info!(bootstrap = %bootstrap, "event publisher worker started");
                while !worker_shutdown.load(Ordering::Relaxed) {
                    match worker_queue.pop() {
                        Some(event) => {
                            tracing::trace!(?event, "publishing event");
                        }
                        None => std::thread::sleep(Duration::from_micros(200)),
                    }
                }
            })
            .expect("failed to spawn event publisher worker");

        Self {
            queue,
            dropped,
            shutdown,
            worker: Some(worker),
        }
    }

    /// Enqueue an event. Never blocks; returns `false` if the buffer was
    /// full and the event was dropped.
    pub fn send(&self, event: PublishedEvent) -> bool {
        match self.queue.push(event) {
            Ok(()) => true,
            Err(_) => {
                let total = self.dropped.fetch_add(1, Ordering::Relaxed) + 1;
                if total == 1 || total.is_power_of_two() {
                    tracing::warn!(total_dropped = total, "event publisher buffer full, dropping event");
                }
                false
            }
        }
    }

    pub fn dropped_count(&self) -> u64 {
        self.dropped.load(Ordering::Relaxed)
    }

    /// Best-effort flush: give the worker a brief window to drain, then stop
    /// it. Never blocks indefinitely.
    pub fn close(mut self) {
        let deadline = std::time::Instant::now() + Duration::from_millis(200);
        while !self.queue.is_empty() && std::time::Instant::now() < deadline {
            std::thread::sleep(Duration::from_millis(5));
        }
        self.shutdown.store(true, Ordering::Relaxed);
        if let Some(handle) = self.worker.take() {
            let _ = handle.join();
        }
    }
}
