//! Metrics collection and exposition.
//!
//! # Metrics
//! - `confd_mutations_total` (counter): add/remove calls by kind, op, outcome
//! - `confd_reloads_total` (counter): reload attempts by kind, outcome
//! - `confd_entries` (gauge): current entry count per kind
//! - `confd_http_requests_total` (counter): REST calls by method, status

use metrics::{counter, gauge};
use metrics_exporter_prometheus::PrometheusBuilder;
use std::net::SocketAddr;

/// Start the Prometheus exporter on `addr`.
pub fn init_metrics(addr: SocketAddr) {
    match PrometheusBuilder::new().with_http_listener(addr).install() {
        Ok(()) => tracing::info!(address = %addr, "Metrics exporter listening"),
        Err(e) => tracing::error!(address = %addr, error = %e, "Failed to install metrics exporter"),
    }
}

pub fn record_mutation(kind: &'static str, op: &'static str, outcome: &'static str) {
    counter!("confd_mutations_total", "kind" => kind, "op" => op, "outcome" => outcome).increment(1);
}

pub fn record_reload(kind: &'static str, ok: bool) {
    let outcome = if ok { "ok" } else { "failed" };
    counter!("confd_reloads_total", "kind" => kind, "outcome" => outcome).increment(1);
}

pub fn record_entries(kind: &'static str, count: usize) {
    gauge!("confd_entries", "kind" => kind).set(count as f64);
}

pub fn record_request(method: &str, status: u16) {
    counter!(
        "confd_http_requests_total",
        "method" => method.to_string(),
        "status" => status.to_string()
    )
    .increment(1);
}
