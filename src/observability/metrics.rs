//! Metrics collection and exposition.
//!
//! # Metrics
//! - `proxy_requests_total` (counter): requests by final status
//! - `proxy_request_duration_seconds` (histogram): end-to-end latency, retries included
//! - `proxy_forward_failures_total` (counter): failed forwards by endpoint
//! - `proxy_retries_total` (counter): same-endpoint retries
//! - `proxy_failovers_total` (counter): endpoints abandoned mid-request
//! - `proxy_endpoint_alive` (gauge): 1=alive, 0=dead, per endpoint
//!
//! Without an installed recorder every call here is a no-op.

use std::net::SocketAddr;
use std::time::Instant;

use metrics::{counter, gauge, histogram};
use metrics_exporter_prometheus::PrometheusBuilder;

/// Install the Prometheus recorder and its scrape endpoint on `addr`.
pub fn init_metrics(addr: SocketAddr) {
    match PrometheusBuilder::new().with_http_listener(addr).install() {
        Ok(()) => tracing::info!(address = %addr, "Metrics exporter listening"),
        Err(e) => tracing::error!(address = %addr, error = %e, "Failed to install metrics exporter"),
    }
}

pub fn record_request(status: u16, start: Instant) {
    counter!("proxy_requests_total", "status" => status.to_string()).increment(1);
    histogram!("proxy_request_duration_seconds").record(start.elapsed().as_secs_f64());
}

pub fn record_forward_failure(endpoint: &str) {
    counter!("proxy_forward_failures_total", "endpoint" => endpoint.to_string()).increment(1);
}

pub fn record_retry() {
    counter!("proxy_retries_total").increment(1);
}

pub fn record_failover() {
    counter!("proxy_failovers_total").increment(1);
}

pub fn record_endpoint_alive(endpoint: &str, alive: bool) {
    gauge!("proxy_endpoint_alive", "endpoint" => endpoint.to_string())
        .set(if alive { 1.0 } else { 0.0 });
}
