//! Active health checking.
//!
//! # Responsibilities
//! - Run one independent probing task per backend
//! - Write each probe outcome to the backend's liveness flag
//! - Stop at the next iteration boundary once shutdown is signalled

use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use std::time::Duration;

use futures_util::FutureExt;
use tokio::sync::broadcast::{self, error::TryRecvError};
use tokio::task::JoinHandle;
use tokio::time;

use crate::config::HealthCheckConfig;
use crate::health::probe::{HttpProbe, Probe, ProbeOutcome};
use crate::lifecycle::Shutdown;
use crate::load_balancer::{Backend, BackendPool};
use crate::observability::metrics;

/// Probing loop for a single backend.
pub struct HealthProber<P> {
    backend: Arc<Backend>,
    probe: Arc<P>,
    interval: Duration,
}

impl<P: Probe> HealthProber<P> {
    pub fn new(backend: Arc<Backend>, probe: Arc<P>, interval: Duration) -> Self {
        Self {
            backend,
            probe,
            interval,
        }
    }

    /// Probe once and record the result. Returns the new liveness.
    ///
    /// A panic inside the probe is contained here and counts as unreachable.
    pub async fn check_once(&self) -> bool {
        let url = self.backend.url();
        let outcome = AssertUnwindSafe(self.probe.probe(url))
            .catch_unwind()
            .await
            .unwrap_or_else(|_| ProbeOutcome::Unreachable("probe panicked".to_string()));

        let alive = outcome.is_alive();
        let was_alive = self.backend.set_alive(alive);

        match &outcome {
            ProbeOutcome::Up => tracing::info!(backend = %url, "Backend is up"),
            ProbeOutcome::Down(status) => {
                tracing::warn!(backend = %url, status = %status, "Backend is down: unexpected status")
            }
            ProbeOutcome::Unreachable(reason) => {
                tracing::warn!(backend = %url, reason = %reason, "Backend is down: unreachable")
            }
        }
        if was_alive != alive {
            tracing::info!(backend = %url, was_alive, alive, "Backend liveness changed");
        }

        metrics::record_backend_alive(url.as_str(), alive);
        alive
    }

    /// Probe, update, sleep, repeat until shutdown.
    pub async fn run(self, mut shutdown: broadcast::Receiver<()>) {
        tracing::debug!(
            backend = %self.backend.url(),
            interval = ?self.interval,
            "Health prober starting"
        );

        loop {
            match shutdown.try_recv() {
                Err(TryRecvError::Empty) => {}
                _ => break,
            }

            self.check_once().await;

            tokio::select! {
                _ = time::sleep(self.interval) => {}
                _ = shutdown.recv() => break,
            }
        }

        tracing::debug!(backend = %self.backend.url(), "Health prober stopped");
    }
}

/// Spawns and owns the per-backend probers.
pub struct HealthMonitor<P = HttpProbe> {
    pool: Arc<BackendPool>,
    probe: Arc<P>,
    interval: Duration,
}

impl HealthMonitor<HttpProbe> {
    pub fn new(pool: Arc<BackendPool>, config: &HealthCheckConfig) -> Self {
        let probe = HttpProbe::new(Duration::from_secs(config.timeout_secs), config.path.clone());
        Self::with_probe(pool, probe, Duration::from_secs(config.interval_secs))
    }
}

impl<P: Probe> HealthMonitor<P> {
    pub fn with_probe(pool: Arc<BackendPool>, probe: P, interval: Duration) -> Self {
        Self {
            pool,
            probe: Arc::new(probe),
            interval,
        }
    }

    /// Start one task per backend. Each task exits after `shutdown` triggers.
    pub fn spawn(self, shutdown: &Shutdown) -> Vec<JoinHandle<()>> {
        tracing::info!(
            backends = self.pool.len(),
            interval = ?self.interval,
            "Health monitor starting"
        );

        self.pool
            .backends()
            .iter()
            .map(|backend| {
                let prober = HealthProber::new(backend.clone(), self.probe.clone(), self.interval);
                tokio::spawn(prober.run(shutdown.subscribe()))
            })
            .collect()
    }
}
