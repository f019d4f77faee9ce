//! `OrderEventHandler` — the single consumer thread: drains the claim ring,
//! matches, journals, publishes, and observes metrics for one shard.
//!
//! Grounded on `pipeline_mt.rs`'s per-stage pop → process → push-forward
//! shape (its Ingestion/UBSCore/ME/Settlement threads), collapsed here into
//! one in-process pipeline running on a single thread, since the concurrency
//! model pins all book/WAL/index mutation to exactly one consumer. Per-event
//! failures are swallowed and logged with the claim sequence — a poisoned
//! slot must never stop the consumer loop.

use crate::core_types::{OrderType, Quantity, Side};
use crate::matcher::match_order;
use crate::metrics::MetricsRegistry;
use crate::models::Order;
use crate::order_book_manager::OrderBookManager;
use crate::publisher::{EventPublisher, PublishedEvent};
use crate::ring::{ClaimRing, OrderEvent};
use crate::wal::WriteAheadLog;
use serde::Serialize;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::time::{SystemTime, UNIX_EPOCH};

fn wall_clock_millis() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as u64)
        .unwrap_or(0)
}

/// The journaled record for one processed order: its own identity plus what
/// the matcher did with it. Built from the order's fields rather than
/// `result.fills` alone, since a resting (non-crossing) order produces no
/// fills but must still be recoverable from the log.
#[derive(Debug, Serialize)]
struct WalRecord<'a> {
    order_id: &'a str,
    symbol: &'a str,
    side: Side,
    price_cents: i64,
    quantity: Quantity,
    match_count: usize,
    total_filled_quantity: Quantity,
}

/// Processes one claimed slot end to end. Kept free of any locking: this
/// function runs only on the consumer thread.
fn process_event(
    shard_id: &str,
    event: &OrderEvent,
    books: &mut OrderBookManager,
    wal: &mut WriteAheadLog,
    publisher: &EventPublisher,
    metrics: &MetricsRegistry,
    now_nanos: u64,
) {
    let Some(order_id) = event.order_id.clone() else {
        tracing::error!("order event slot had no order_id, dropping");
        return;
    };
    let Some(side) = event.side else {
        tracing::error!(order_id, "order event slot had no side, dropping");
        return;
    };

    let now = wall_clock_millis();
    let mut order = Order::new(
        order_id.clone(),
        event.symbol.clone(),
        side,
        event.order_type,
        event.price_cents,
        event.quantity,
        now,
    );

    let insertion_timer = metrics.orderbook_insertion_duration_seconds.with_label_values(&[shard_id]).start_timer();
    let book = books.book_mut(&event.symbol);
    drop(insertion_timer);

    metrics
        .orders_received_total
        .with_label_values(&[shard_id, if side == Side::Buy { "BUY" } else { "SELL" }])
        .inc();

    let match_timer = metrics.matching_algorithm_duration_seconds.with_label_values(&[shard_id]).start_timer();
    let result = match_order(&mut order, book, now);
    drop(match_timer);

    metrics.matches_total.with_label_values(&[shard_id]).inc_by(result.match_count() as f64);

    let record = WalRecord {
        order_id: &order_id,
        symbol: &event.symbol,
        side,
        price_cents: event.price_cents,
        quantity: event.quantity,
        match_count: result.match_count(),
        total_filled_quantity: result.total_filled_quantity,
    };
    let payload = match serde_json::to_vec(&record) {
        Ok(bytes) => bytes,
        Err(err) => {
            tracing::error!(order_id, error = %err, "failed to serialize order for WAL, skipping append");
            return;
        }
    };
    let wal_timer = metrics.wal_append_duration_seconds.with_label_values(&[shard_id]).start_timer();
    match wal.append(&payload) {
        Ok(true) => {}
        Ok(false) => {
            tracing::warn!(order_id, "WAL full or became full on this append, record dropped");
        }
        Err(err) => {
            tracing::error!(order_id, error = %err, "WAL append I/O error");
        }
    }
    drop(wal_timer);

    let placed = PublishedEvent::OrderPlaced {
        order_id: order_id.clone(),
        symbol: event.symbol.clone(),
        side,
        price_cents: event.price_cents,
        quantity: event.quantity,
    };
    let publish_timer = metrics.event_publish_duration_seconds.with_label_values(&[shard_id]).start_timer();
    publisher.send(placed);
    for fill in &result.fills {
        publisher.send(PublishedEvent::MatchExecuted {
            match_id: fill.match_id,
            taker_order_id: fill.taker_order_id.clone(),
            maker_order_id: fill.maker_order_id.clone(),
            symbol: fill.symbol.clone(),
            execution_price: fill.execution_price,
            execution_quantity: fill.execution_quantity,
        });
    }
    drop(publish_timer);

    let latency_seconds = now_nanos.saturating_sub(event.received_monotonic_nanos) as f64 / 1e9;
    metrics.match_duration_seconds.with_label_values(&[shard_id]).observe(latency_seconds);
}

/// Snapshot resting quantity and distinct price-level counts across every
/// book this shard owns, summed by side. Read through the same single-writer
/// reference the consumer already holds, so a one-batch staleness window is
/// acceptable rather than a hazard.
fn report_book_gauges(shard_id: &str, books: &OrderBookManager, metrics: &MetricsRegistry) {
    let (mut bid_qty, mut ask_qty) = (0u64, 0u64);
    let (mut bid_levels, mut ask_levels) = (0usize, 0usize);
    for symbol in books.symbols() {
        let book = books.book(symbol).expect("symbol came from this manager's own iterator");
        let (q_bid, q_ask) = book.quantity_depth();
        let (levels_bid, levels_ask) = book.depth();
        bid_qty += q_bid;
        ask_qty += q_ask;
        bid_levels += levels_bid;
        ask_levels += levels_ask;
    }
    metrics.orderbook_depth.with_label_values(&[shard_id, "BUY"]).set(bid_qty as f64);
    metrics.orderbook_depth.with_label_values(&[shard_id, "SELL"]).set(ask_qty as f64);
    metrics.orderbook_price_levels.with_label_values(&[shard_id, "BUY"]).set(bid_levels as f64);
    metrics.orderbook_price_levels.with_label_values(&[shard_id, "SELL"]).set(ask_levels as f64);
}

/// Spawn the consumer thread. Runs until `shutdown` is set; on shutdown it
/// drains whatever has already been claimed, forces the WAL, and returns.
///
/// `books` is shared behind a mutex rather than moved in outright, so that
/// the shard's `/seed` backdoor can insert into the very same books the
/// consumer matches against. The consumer locks once per drained batch, not
/// per event, keeping contention off the hot path; `/seed` is documented as
/// a setup-only call that is never made once load starts.
pub fn spawn_consumer(
    shard_id: String,
    ring: Arc<ClaimRing>,
    books: Arc<Mutex<OrderBookManager>>,
    mut wal: WriteAheadLog,
    publisher: Arc<EventPublisher>,
    metrics: Arc<MetricsRegistry>,
    shutdown: Arc<AtomicBool>,
) -> std::thread::JoinHandle<()> {
    std::thread::Builder::new()
        .name(format!("consumer-{shard_id}"))
        .spawn(move || {
            tracing::info!(shard_id = %shard_id, "consumer thread started");
            loop {
                match ring.poll_batch(256) {
                    Some((start, count)) => {
                        let mut guard = books.lock().expect("order book manager mutex poisoned");
                        for offset in 0..count {
                            let seq = start + offset;
                            let event = ring.consumer_slot(seq);
                            let now_nanos = ring.monotonic_nanos();
                            process_event(&shard_id, event, &mut guard, &mut wal, &publisher, &metrics, now_nanos);
                            event.clear();
                        }
                        report_book_gauges(&shard_id, &guard, &metrics);
                        drop(guard);
                        ring.advance_consumer(start + count);
                        let _ = wal.flush();
                        metrics.ringbuffer_utilization.with_label_values(&[&shard_id]).set(ring.utilization());
                    }
                    None => {
                        if shutdown.load(Ordering::Relaxed) {
                            break;
                        }
                        std::thread::yield_now();
                    }
                }
            }
            tracing::info!(shard_id = %shard_id, "consumer thread draining and shutting down");
        })
        .expect("failed to spawn consumer thread")
}
