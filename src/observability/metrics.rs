//! Metrics collection and exposition.
//!
//! # Metrics
//! - `registrar_requests_total` (counter): registrations by outcome
//! - `registrar_failures_total` (counter): failures by kind (validation, io, reload)
//! - `registrar_reloads_total` (counter): executed reloads by strategy and outcome
//! - `registrar_reloads_shared_total` (counter): callers served by another caller's reload
//! - `registrar_reload_duration_seconds` (histogram): explicit reload latency
//! - `registrar_invites_total` (counter): invitations by outcome

use std::net::SocketAddr;
use std::time::Duration;

use metrics::{counter, histogram};
use metrics_exporter_prometheus::PrometheusBuilder;

/// Start the Prometheus scrape endpoint. Must run inside a Tokio runtime.
pub fn init_metrics(addr: SocketAddr) {
    match PrometheusBuilder::new().with_http_listener(addr).install() {
        Ok(()) => tracing::info!(address = %addr, "Metrics endpoint listening"),
        Err(e) => tracing::error!(address = %addr, error = %e, "Failed to install metrics exporter"),
    }
}

pub fn record_request(outcome: &'static str) {
    counter!("registrar_requests_total", "outcome" => outcome).increment(1);
}

pub fn record_failure(kind: &'static str) {
    counter!("registrar_failures_total", "kind" => kind).increment(1);
}

pub fn record_reload(strategy: &'static str, ok: bool, elapsed: Duration) {
    let outcome = if ok { "ok" } else { "error" };
    counter!("registrar_reloads_total", "strategy" => strategy, "outcome" => outcome).increment(1);
    histogram!("registrar_reload_duration_seconds", "strategy" => strategy)
        .record(elapsed.as_secs_f64());
}

pub fn record_reload_shared() {
    counter!("registrar_reloads_shared_total").increment(1);
}

pub fn record_invite(ok: bool) {
    let outcome = if ok { "ok" } else { "error" };
    counter!("registrar_invites_total", "outcome" => outcome).increment(1);
}
