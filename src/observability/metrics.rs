//! Metrics collection and exposition.
//!
//! # Metrics
//! - `lb_requests_total` (counter): requests by backend and status
//! - `lb_request_duration_seconds` (histogram): time spent routing and forwarding
//! - `lb_backend_alive` (gauge): 1=alive, 0=down, per backend
//!
//! Recording is a no-op until `init_metrics` installs the Prometheus recorder.

use std::net::SocketAddr;
use std::time::Instant;

use metrics::{counter, gauge, histogram};
use metrics_exporter_prometheus::{BuildError, PrometheusBuilder};

/// Install the Prometheus recorder and serve it over HTTP on `addr`.
/// Must be called from within a Tokio runtime.
pub fn init_metrics(addr: SocketAddr) -> Result<(), BuildError> {
    PrometheusBuilder::new().with_http_listener(addr).install()?;
    tracing::info!(address = %addr, "Metrics exporter listening");
    Ok(())
}

/// Record a routed request.
pub fn record_request(backend: &str, status: u16, start: Instant) {
    counter!(
        "lb_requests_total",
        "backend" => backend.to_string(),
        "status" => status.to_string()
    )
    .increment(1);
    histogram!("lb_request_duration_seconds", "backend" => backend.to_string())
        .record(start.elapsed().as_secs_f64());
}

/// Record the outcome of a health probe.
pub fn record_backend_alive(backend: &str, alive: bool) {
    gauge!("lb_backend_alive", "backend" => backend.to_string())
        .set(if alive { 1.0 } else { 0.0 });
}
