//! Load balancing subsystem.
//!
//! # Data Flow
//! ```text
//! Inbound request
//!     → pool.rs (advance rotation, pick backend)
//!     → round_robin.rs (shared cursor, reduced modulo pool size)
//!     → backend.rs (liveness flag checked by the router)
//! ```
//!
//! # Design Decisions
//! - Pool is fixed at startup and never empty
//! - Selection does not look at liveness; the router does
//! - Cursor is an atomic counter owned by the pool, not global state

pub mod backend;
pub mod pool;
pub mod round_robin;

pub use backend::Backend;
pub use pool::{BackendPool, PoolError};
pub use round_robin::RoundRobin;

/// Backend selection policy.
pub trait Selector: Send + Sync + std::fmt::Debug {
    /// Advance the policy and return an index in `0..len`.
    /// `len` is always non-zero.
    fn next_index(&self, len: usize) -> usize;
}
