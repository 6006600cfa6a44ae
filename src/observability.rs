use std::net::SocketAddr;

use metrics_exporter_prometheus::{BuildError, PrometheusBuilder};

use crate::model::RoomStatus;

// ── Fetch metrics ───────────────────────────────────────────────

/// Counter: schedule fetches. Labels: status (ok, failed, timeout).
pub const SCHEDULE_FETCHES_TOTAL: &str = "roomboard_schedule_fetches_total";

/// Histogram: schedule fetch latency in seconds.
pub const SCHEDULE_FETCH_DURATION_SECONDS: &str = "roomboard_schedule_fetch_duration_seconds";

/// Counter: board refreshes. Labels: outcome (committed, stale).
pub const REFRESHES_TOTAL: &str = "roomboard_refreshes_total";

/// Gauge: rooms held by the board after the last committed refresh.
pub const ROOMS_LOADED: &str = "roomboard_rooms_loaded";

// ── Evaluation metrics ──────────────────────────────────────────

/// Counter: range filters that fell back to the all-day window.
pub const WINDOW_FALLBACKS_TOTAL: &str = "roomboard_window_fallbacks_total";

/// Counter: rooms classified. Labels: status.
pub const ROOMS_CLASSIFIED_TOTAL: &str = "roomboard_rooms_classified_total";

/// Install Prometheus metrics exporter on the given port. No-op if port is None.
pub fn init(port: Option<u16>) -> Result<(), BuildError> {
    let Some(port) = port else { return Ok(()) };
    let addr: SocketAddr = ([0, 0, 0, 0], port).into();
    PrometheusBuilder::new().with_http_listener(addr).install()?;
    tracing::info!("metrics endpoint: http://0.0.0.0:{port}/metrics");
    Ok(())
}

/// Record a classification outcome.
pub fn record_status(status: RoomStatus) {
    metrics::counter!(ROOMS_CLASSIFIED_TOTAL, "status" => status.label()).increment(1);
}
