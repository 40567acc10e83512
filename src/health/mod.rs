//! Health checking subsystem.
//!
//! # Data Flow
//! ```text
//! One task per backend (active.rs):
//!     probe (probe.rs, GET with timeout)
//!     → exactly 200: set_alive(true)
//!     → anything else: set_alive(false)
//!     → sleep interval, repeat until shutdown
//! ```
//!
//! # Design Decisions
//! - Probers are independent; one backend's failures never touch another's flag
//! - A failed or panicking probe only demotes liveness, never stops the task
//! - Liveness is binary with no thresholds: the last probe wins

pub mod active;
pub mod probe;

pub use active::{HealthMonitor, HealthProber};
pub use probe::{HttpProbe, Probe, ProbeOutcome};
