//! Request routing subsystem.
//!
//! # Data Flow
//! ```text
//! Inbound request (any method, any path)
//!     → router.rs (advance rotation once, check liveness)
//!     → alive: http/forward.rs relays to the backend
//!     → down:  503 "Service not available"
//! ```
//!
//! # Design Decisions
//! - No path-based routing; every request goes to the pool
//! - No retry onto another backend unless failover is enabled in config

pub mod router;

pub use router::{route_request, RequestRouter, UNAVAILABLE_BODY};
