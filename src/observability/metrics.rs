//! Metrics collection and exposition.
//!
//! # Metrics
//! - `page_requests_total` (counter): requests by status
//! - `page_request_duration_seconds` (histogram): handler latency
//! - `identity_lookups_total` (counter): identity lookups by outcome
//! - `identity_lookup_duration_seconds` (histogram): identity latency by outcome

use metrics_exporter_prometheus::PrometheusBuilder;
use std::net::SocketAddr;
use std::time::Instant;

/// Install the Prometheus recorder and its scrape endpoint.
pub fn init_metrics(addr: SocketAddr) {
    match PrometheusBuilder::new().with_http_listener(addr).install() {
        Ok(()) => tracing::info!(address = %addr, "Metrics endpoint listening"),
        Err(e) => tracing::error!(address = %addr, error = %e, "Failed to install metrics exporter"),
    }
}

/// Record a handled page request.
pub fn record_request(status: u16, start: Instant) {
    let status = status.to_string();
    metrics::counter!("page_requests_total", "status" => status.clone()).increment(1);
    metrics::histogram!("page_request_duration_seconds", "status" => status)
        .record(start.elapsed().as_secs_f64());
}

/// Record an identity lookup by outcome.
pub fn record_identity_lookup(outcome: &'static str, start: Instant) {
    metrics::counter!("identity_lookups_total", "outcome" => outcome).increment(1);
    metrics::histogram!("identity_lookup_duration_seconds", "outcome" => outcome)
        .record(start.elapsed().as_secs_f64());
}
