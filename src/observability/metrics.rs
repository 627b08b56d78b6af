//! Metrics collection and exposition.
//!
//! # Metrics
//! - `callgate_calls_total` (counter): calls seen by the interceptor, by outcome
//! - `callgate_events_dropped_total` (counter): log subscribers evicted for lagging
//! - `callgate_stat_flushes_total` (counter): statistics windows sent
//! - `callgate_log_subscribers` (gauge): open log streams
//! - `callgate_stat_subscribers` (gauge): open statistics streams
//!
//! Without an installed recorder every call here is a no-op.

use metrics_exporter_prometheus::PrometheusBuilder;
use std::net::SocketAddr;

/// Install the Prometheus recorder with its own HTTP listener.
/// Must run inside the Tokio runtime.
pub fn init_metrics(addr: SocketAddr) {
    match PrometheusBuilder::new().with_http_listener(addr).install() {
        Ok(()) => tracing::info!(address = %addr, "Metrics exporter listening"),
        Err(e) => tracing::error!(address = %addr, error = %e, "Failed to install metrics exporter"),
    }
}

pub fn record_call(outcome: &'static str) {
    metrics::counter!("callgate_calls_total", "outcome" => outcome).increment(1);
}

pub fn record_dropped_event() {
    metrics::counter!("callgate_events_dropped_total").increment(1);
}

pub fn record_stat_flush() {
    metrics::counter!("callgate_stat_flushes_total").increment(1);
}

pub fn set_subscribers(log: usize, stats: usize) {
    metrics::gauge!("callgate_log_subscribers").set(log as f64);
    metrics::gauge!("callgate_stat_subscribers").set(stats as f64);
}
