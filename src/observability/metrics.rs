//! Metrics collection and exposition.
//!
//! # Metrics
//! - `gate_decisions_total` (counter): decisions by outcome (allow, redirect)
//! - `gate_upstream_requests_total` (counter): forwarded requests by status
//! - `gate_upstream_duration_seconds` (histogram): renderer round-trip latency

use std::net::SocketAddr;
use std::time::Instant;

use metrics_exporter_prometheus::{BuildError, PrometheusBuilder};

/// Install the Prometheus recorder and its scrape endpoint.
pub fn init_metrics(addr: SocketAddr) -> Result<(), BuildError> {
    PrometheusBuilder::new().with_http_listener(addr).install()?;
    tracing::info!(address = %addr, "Metrics endpoint listening");
    Ok(())
}

/// Count one gate decision.
pub fn record_decision(outcome: &'static str) {
    metrics::counter!("gate_decisions_total", "outcome" => outcome).increment(1);
}

/// Record one forwarded request.
pub fn record_upstream(status: u16, start: Instant) {
    metrics::counter!("gate_upstream_requests_total", "status" => status.to_string()).increment(1);
    metrics::histogram!("gate_upstream_duration_seconds").record(start.elapsed().as_secs_f64());
}
