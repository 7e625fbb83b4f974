//! Metrics collection and exposition.
//!
//! # Metrics
//! - `dashboard_requests_total` (counter): requests by endpoint, status
//! - `dashboard_request_duration_seconds` (histogram): latency by endpoint
//! - `dashboard_upstream_requests_total` (counter): upstream calls by source, outcome
//! - `dashboard_upstream_duration_seconds` (histogram): upstream latency by source
//!
//! Recording is a no-op until [`init_metrics`] installs the Prometheus recorder.

use std::net::SocketAddr;
use std::time::Instant;

use metrics::{counter, histogram};
use metrics_exporter_prometheus::PrometheusBuilder;

/// Install the Prometheus recorder and its scrape listener.
pub fn init_metrics(addr: SocketAddr) {
    match PrometheusBuilder::new().with_http_listener(addr).install() {
        Ok(()) => tracing::info!(address = %addr, "Metrics endpoint listening"),
        Err(e) => tracing::error!(address = %addr, error = %e, "Failed to install metrics exporter"),
    }
}

/// Record one served dashboard request.
pub fn record_request(endpoint: &str, status: u16, start: Instant) {
    let endpoint = endpoint.to_string();
    counter!(
        "dashboard_requests_total",
        "endpoint" => endpoint.clone(),
        "status" => status.to_string()
    )
    .increment(1);
    histogram!("dashboard_request_duration_seconds", "endpoint" => endpoint)
        .record(start.elapsed().as_secs_f64());
}

/// Record one upstream call. `outcome` is `ok`, `status`, `decode` or `error`.
pub fn record_upstream(source: &'static str, outcome: &'static str, start: Instant) {
    counter!(
        "dashboard_upstream_requests_total",
        "source" => source,
        "outcome" => outcome
    )
    .increment(1);
    histogram!("dashboard_upstream_duration_seconds", "source" => source)
        .record(start.elapsed().as_secs_f64());
}
