//! Metrics collection and exposition.
//!
//! # Metrics
//! - `proxy_requests_total` (counter): total requests by method, status
//! - `proxy_request_duration_seconds` (histogram): latency distribution
//! - `header_rewrites_total` (counter): rewritten values by instance, header
//! - `header_rewrite_rejected_total` (counter): rewrites dropped because the
//!   result was not a legal header value

use std::net::SocketAddr;
use std::time::Instant;

use metrics::{counter, histogram};
use metrics_exporter_prometheus::{BuildError, PrometheusBuilder};

/// Install the Prometheus exporter listening on `addr`.
pub fn init_metrics(addr: SocketAddr) -> Result<(), BuildError> {
    PrometheusBuilder::new().with_http_listener(addr).install()?;
    tracing::info!(address = %addr, "Metrics exporter listening");
    Ok(())
}

pub fn record_request(method: &str, status: u16, start: Instant) {
    let labels = [
        ("method", method.to_string()),
        ("status", status.to_string()),
    ];
    counter!("proxy_requests_total", &labels).increment(1);
    histogram!("proxy_request_duration_seconds", &labels).record(start.elapsed().as_secs_f64());
}

pub fn record_rewrite(instance: &str, header: &str) {
    counter!(
        "header_rewrites_total",
        "instance" => instance.to_string(),
        "header" => header.to_string()
    )
    .increment(1);
}

pub fn record_rewrite_rejected(instance: &str, header: &str) {
    counter!(
        "header_rewrite_rejected_total",
        "instance" => instance.to_string(),
        "header" => header.to_string()
    )
    .increment(1);
}
