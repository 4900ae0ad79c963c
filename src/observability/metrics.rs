//! Metrics collection and exposition.
//!
//! # Metrics
//! - `sticky_requests_total` (counter): requests by method, status
//! - `sticky_request_duration_seconds` (histogram): end-to-end latency
//! - `sticky_affinity_lookups_total` (counter): cache lookups by result (hit/miss)
//! - `sticky_affinity_passthrough_total` (counter): requests without identifier header
//! - `sticky_affinity_updates_total` (counter): cache writes from upstream cookies
//! - `sticky_affinity_evictions_total` (counter): LRU evictions
//! - `sticky_affinity_cache_entries` (gauge): resident entries
//! - `sticky_cookie_parse_failures_total` (counter): rejected Set-Cookie lines by kind
//!
//! # Design Decisions
//! - Recording is a no-op until an exporter is installed (tests stay quiet)
//! - Prometheus exporter served on its own listener

use metrics::{counter, gauge, histogram};
use metrics_exporter_prometheus::PrometheusBuilder;
use std::net::SocketAddr;
use std::time::Instant;

/// Install the Prometheus exporter on `addr`.
pub fn init_metrics(addr: SocketAddr) {
    match PrometheusBuilder::new().with_http_listener(addr).install() {
        Ok(()) => tracing::info!(address = %addr, "Metrics exporter listening"),
        Err(e) => tracing::error!(address = %addr, error = %e, "Failed to install metrics exporter"),
    }
}

pub fn record_request(method: &str, status: u16, start: Instant) {
    let method = method.to_string();
    let status = status.to_string();
    counter!("sticky_requests_total", "method" => method.clone(), "status" => status.clone())
        .increment(1);
    histogram!("sticky_request_duration_seconds", "method" => method, "status" => status)
        .record(start.elapsed().as_secs_f64());
}

pub fn record_cache_lookup(hit: bool) {
    let result = if hit { "hit" } else { "miss" };
    counter!("sticky_affinity_lookups_total", "result" => result).increment(1);
}

pub fn record_passthrough() {
    counter!("sticky_affinity_passthrough_total").increment(1);
}

pub fn record_cache_update() {
    counter!("sticky_affinity_updates_total").increment(1);
}

pub fn record_cache_eviction() {
    counter!("sticky_affinity_evictions_total").increment(1);
}

pub fn record_cache_size(entries: usize) {
    gauge!("sticky_affinity_cache_entries").set(entries as f64);
}

pub fn record_cookie_parse_failure(kind: &'static str) {
    counter!("sticky_cookie_parse_failures_total", "kind" => kind).increment(1);
}
