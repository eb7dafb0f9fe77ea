//! Metrics collection and exposition.
//!
//! # Metrics
//! - `servlet_requests_total` (counter): requests by servlet and status
//! - `servlet_request_duration_seconds` (histogram): pipeline latency by servlet
//! - `servlet_filter_chain_length` (histogram): filters per built chain

use std::net::SocketAddr;
use std::time::Duration;

use metrics_exporter_prometheus::PrometheusBuilder;

/// Install the Prometheus recorder and its scrape endpoint.
pub fn init_metrics(addr: SocketAddr) {
    match PrometheusBuilder::new().with_http_listener(addr).install() {
        Ok(()) => tracing::info!(address = %addr, "Metrics endpoint listening"),
        Err(e) => tracing::error!(address = %addr, error = %e, "Failed to install metrics exporter"),
    }
}

pub fn record_request(servlet: &str, status: u16, elapsed: Duration) {
    metrics::counter!(
        "servlet_requests_total",
        "servlet" => servlet.to_string(),
        "status" => status.to_string()
    )
    .increment(1);
    metrics::histogram!("servlet_request_duration_seconds", "servlet" => servlet.to_string())
        .record(elapsed.as_secs_f64());
}

pub fn record_filter_chain(length: usize) {
    metrics::histogram!("servlet_filter_chain_length").record(length as f64);
}
