//! Metrics collection and exposition.
//!
//! # Metrics
//! - `attest_transactions_submitted_total` (counter)
//! - `attest_watch_events_total{phase}` (counter): historical / live
//! - `attest_watch_decode_failures_total` (counter)
//! - `attest_watch_reconnects_total` (counter)
//! - `mock_x402_requests_total{outcome}` (counter): payment_required / paid
//!
//! Counters are no-ops until an exporter is installed.

use metrics_exporter_prometheus::PrometheusBuilder;
use std::net::SocketAddr;

/// Install the Prometheus exporter with an HTTP scrape listener.
///
/// Must be called from within a Tokio runtime.
pub fn init_metrics(addr: SocketAddr) {
    match PrometheusBuilder::new().with_http_listener(addr).install() {
        Ok(()) => tracing::info!(address = %addr, "Metrics exporter listening"),
        Err(e) => tracing::error!(address = %addr, error = %e, "Failed to install metrics exporter"),
    }
}
