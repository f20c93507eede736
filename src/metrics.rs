//! Prometheus metrics for badge updater observability.

use metrics::counter;

/// Initialize metrics exporter (Prometheus).
pub fn init_metrics() {
    let builder = metrics_exporter_prometheus::PrometheusBuilder::new();
    if let Err(e) = builder.install() {
        tracing::warn!("Failed to install Prometheus exporter: {}", e);
    }
}

/// Record a push delivery received on the endpoint.
pub fn push_received() {
    counter!("badge_push_received_total").increment(1);
}

/// Record a decoded build event by status.
pub fn event_received(status: &str) {
    counter!("badge_events_total", "status" => status.to_string()).increment(1);
}

/// Record an event that failed the gate.
pub fn event_skipped(reason: &str) {
    counter!("badge_events_skipped_total", "reason" => reason.to_string()).increment(1);
}

/// Record an undecodable event payload.
pub fn event_malformed() {
    counter!("badge_events_malformed_total").increment(1);
}

/// Record a completed badge copy.
pub fn badge_copied(status: &str) {
    counter!("badge_copies_total", "status" => status.to_string()).increment(1);
}

/// Record a failed badge copy.
pub fn copy_failed() {
    counter!("badge_copy_failures_total").increment(1);
}
