//! `MetricsRegistry` — counters, histograms and gauges surfaced to a
//! Prometheus scrape endpoint.
//!
//! None of the five teacher candidates has a working Prometheus call site
//! (`cooprefr-bettersys` carries `metrics-exporter-prometheus` in its
//! `Cargo.toml` but never calls into it). Grounded instead on
//! `examples/other_examples/manifests/anjing0524-matching-engine/Cargo.toml`,
//! which pulls in `prometheus` for the same matching-engine domain; built in
//! the idiomatic `prometheus::Registry` + `TextEncoder` style with metric
//! families registered once via `lazy_static`, matching the metric names and
//! label sets the external interface contract fixes.

use prometheus::{
    register_counter_vec_with_registry, register_gauge_vec_with_registry,
    register_histogram_vec_with_registry, CounterVec, Encoder, GaugeVec, HistogramVec, Registry,
    TextEncoder,
};

pub struct MetricsRegistry {
    pub registry: Registry,

    pub gw_requests_total: CounterVec,
    pub gw_request_duration_seconds: HistogramVec,
    pub gw_routing_errors_total: CounterVec,

    pub orders_received_total: CounterVec,
    pub matches_total: CounterVec,
    pub order_validation_duration_seconds: HistogramVec,
    pub orderbook_insertion_duration_seconds: HistogramVec,
    pub matching_algorithm_duration_seconds: HistogramVec,
    pub wal_append_duration_seconds: HistogramVec,
    pub event_publish_duration_seconds: HistogramVec,
    pub match_duration_seconds: HistogramVec,
    pub ringbuffer_utilization: GaugeVec,
    pub orderbook_depth: GaugeVec,
    pub orderbook_price_levels: GaugeVec,
}

impl MetricsRegistry {
    /// Build a fresh registry with every metric named in the external
    /// interface contract pre-registered. Panics only on a duplicate
    /// registration, which would be a programming error, not a runtime one.
    pub fn new() -> Self {
        let registry = Registry::new();

        let gw_requests_total = register_counter_vec_with_registry!(
            "gw_requests_total",
            "Gateway requests by shard and status class",
            &["shard", "status"],
            registry
        )
        .expect("register gw_requests_total");

        let gw_request_duration_seconds = register_histogram_vec_with_registry!(
            "gw_request_duration_seconds",
            "Gateway proxy round-trip duration",
            &["shard"],
            registry
        )
        .expect("register gw_request_duration_seconds");

        let gw_routing_errors_total = register_counter_vec_with_registry!(
            "gw_routing_errors_total",
            "Gateway routing failures by reason",
            &["reason"],
            registry
        )
        .expect("register gw_routing_errors_total");

        let orders_received_total = register_counter_vec_with_registry!(
            "orders_received_total",
            "Orders accepted onto the ring by side",
            &["shard", "side"],
            registry
        )
        .expect("register orders_received_total");

        let matches_total = register_counter_vec_with_registry!(
            "matches_total",
            "Fills produced by the matcher",
            &["shard"],
            registry
        )
        .expect("register matches_total");

        let order_validation_duration_seconds = register_histogram_vec_with_registry!(
            "order_validation_duration_seconds",
            "Time spent validating an incoming order",
            &["shard"],
            registry
        )
        .expect("register order_validation_duration_seconds");

        let orderbook_insertion_duration_seconds = register_histogram_vec_with_registry!(
            "orderbook_insertion_duration_seconds",
            "Time spent inserting a residual order into the book",
            &["shard"],
            registry
        )
        .expect("register orderbook_insertion_duration_seconds");

        let matching_algorithm_duration_seconds = register_histogram_vec_with_registry!(
            "matching_algorithm_duration_seconds",
            "Time spent inside the matching algorithm",
            &["shard"],
            registry
        )
        .expect("register matching_algorithm_duration_seconds");

        let wal_append_duration_seconds = register_histogram_vec_with_registry!(
            "wal_append_duration_seconds",
            "Time spent appending a record to the WAL",
            &["shard"],
            registry
        )
        .expect("register wal_append_duration_seconds");

        let event_publish_duration_seconds = register_histogram_vec_with_registry!(
            "event_publish_duration_seconds",
            "Time spent handing events to the publisher",
            &["shard"],
            registry
        )
        .expect("register event_publish_duration_seconds");

        let match_duration_seconds = register_histogram_vec_with_registry!(
            "match_duration_seconds",
            "End-to-end latency from ring receipt to pipeline completion",
            &["shard"],
            registry
        )
        .expect("register match_duration_seconds");

        let ringbuffer_utilization = register_gauge_vec_with_registry!(
            "ringbuffer_utilization",
            "Fraction of the claim ring currently occupied",
            &["shard"],
            registry
        )
        .expect("register ringbuffer_utilization");

        let orderbook_depth = register_gauge_vec_with_registry!(
            "orderbook_depth",
            "Total resting quantity by side",
            &["shard", "side"],
            registry
        )
        .expect("register orderbook_depth");

        let orderbook_price_levels = register_gauge_vec_with_registry!(
            "orderbook_price_levels",
            "Distinct price levels by side",
            &["shard", "side"],
            registry
        )
        .expect("register orderbook_price_levels");

        Self {
            registry,
            gw_requests_total,
            gw_request_duration_seconds,
            gw_routing_errors_total,
            orders_received_total,
            matches_total,
            order_validation_duration_seconds,
            orderbook_insertion_duration_seconds,
            matching_algorithm_duration_seconds,
            wal_append_duration_seconds,
            event_publish_duration_seconds,
            match_duration_seconds,
            ringbuffer_utilization,
            orderbook_depth,
            orderbook_price_levels,
        }
    }

    /// Render the current state in the Prometheus text exposition format.
    pub fn render(&self) -> String {
        let metric_families = self.registry.gather();
        let mut buffer = Vec::new();
        TextEncoder::new()
            .encode(&metric_families, &mut buffer)
            .expect("encode metrics");
        String::from_utf8(buffer).expect("prometheus text output is valid utf-8")
    }
}

impl Default for MetricsRegistry {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn render_contains_registered_metric_names() {
        let metrics = MetricsRegistry::new();
        metrics.orders_received_total.with_label_values(&["a", "BUY"]).inc();
        metrics.ringbuffer_utilization.with_label_values(&["a"]).set(0.25);

        let text = metrics.render();
        assert!(text.contains("orders_received_total"));
        assert!(text.contains("ringbuffer_utilization"));
    }
}
