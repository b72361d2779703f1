//! Metrics collection and exposition.
//!
//! # Metrics
//! - `express_submissions_total` (counter): submissions by wait level and outcome
//! - `express_lifecycle_events_total` (counter): published events by kind
//! - `express_publish_failures_total` (counter): notifications the sink refused
//! - `express_rpc_requests_total` (counter): JSON-RPC calls by method and status
//! - `express_rpc_request_duration_seconds` (histogram): JSON-RPC latency
//! - `express_reverted_confirmations_total` (counter): mined with a failed status
//! - `express_pending_confirmations` (gauge): transactions awaiting a receipt
//!
//! # Design Decisions
//! - Recording goes through the `metrics` facade; without an installed
//!   recorder every call is a no-op, so tests need no setup
//! - The Prometheus exporter serves its own HTTP listener

use metrics::{counter, gauge, histogram};
use metrics_exporter_prometheus::PrometheusBuilder;
use std::net::SocketAddr;
use std::time::Instant;

/// Install the Prometheus recorder and start its scrape listener.
pub fn init_metrics(addr: SocketAddr) {
    match PrometheusBuilder::new().with_http_listener(addr).install() {
        Ok(()) => tracing::info!(address = %addr, "Metrics endpoint listening"),
        Err(e) => {
            tracing::error!(address = %addr, error = %e, "Failed to install metrics exporter")
        }
    }
}

pub fn record_submission(wait_level: &'static str, outcome: &'static str) {
    counter!("express_submissions_total", "wait_level" => wait_level, "outcome" => outcome)
        .increment(1);
}

pub fn record_lifecycle_event(kind: &'static str) {
    counter!("express_lifecycle_events_total", "kind" => kind).increment(1);
}

pub fn record_publish_failure() {
    counter!("express_publish_failures_total").increment(1);
}

/// `method` must come from a fixed set (see `RpcMethod::as_str`).
pub fn record_rpc_request(method: &'static str, status: &'static str, start: Instant) {
    counter!("express_rpc_requests_total", "method" => method, "status" => status).increment(1);
    histogram!("express_rpc_request_duration_seconds", "method" => method)
        .record(start.elapsed().as_secs_f64());
}

pub fn record_reverted_confirmation() {
    counter!("express_reverted_confirmations_total").increment(1);
}

pub fn set_pending_confirmations(count: usize) {
    gauge!("express_pending_confirmations").set(count as f64);
}
