//! Metrics collection and exposition.
//!
//! # Metrics
//! - `txproxy_requests_total` (counter): inbound requests by status
//! - `txproxy_request_duration_seconds` (histogram): inbound latency
//! - `txproxy_broadcasts_total` (counter): upstream broadcasts by outcome
//! - `txproxy_status_checks_total` (counter): upstream status checks by status
//! - `txproxy_monitoring_duration_seconds` (histogram): time to terminal status, by outcome

use std::net::SocketAddr;
use std::time::Instant;

use metrics_exporter_prometheus::PrometheusBuilder;

use crate::transaction::TransactionStatus;

/// Start the Prometheus exporter on `addr`.
pub fn init_metrics(addr: SocketAddr) {
    match PrometheusBuilder::new().with_http_listener(addr).install() {
        Ok(()) => tracing::info!(address = %addr, "Metrics exporter listening"),
        Err(e) => tracing::error!(address = %addr, error = %e, "Failed to install metrics exporter"),
    }
}

/// Record a finished inbound request.
pub fn record_request(status: u16, start: Instant) {
    metrics::counter!("txproxy_requests_total", "status" => status.to_string()).increment(1);
    metrics::histogram!("txproxy_request_duration_seconds").record(start.elapsed().as_secs_f64());
}

/// Record the outcome of one upstream broadcast ("ok" or an error kind).
pub fn record_broadcast(outcome: &'static str) {
    metrics::counter!("txproxy_broadcasts_total", "outcome" => outcome).increment(1);
}

/// Record one upstream status check.
pub fn record_status_check(status: &TransactionStatus) {
    // Unknown values are bucketed to keep label cardinality bounded.
    let label = if status.is_known() { status.as_str() } else { "UNKNOWN" };
    metrics::counter!("txproxy_status_checks_total", "status" => label.to_string()).increment(1);
}

/// Record how long monitoring took and how it ended.
pub fn record_monitoring(outcome: &'static str, start: tokio::time::Instant) {
    metrics::histogram!("txproxy_monitoring_duration_seconds", "outcome" => outcome)
        .record(start.elapsed().as_secs_f64());
}
