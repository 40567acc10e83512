//! Backend abstraction.
//!
//! # Responsibilities
//! - Represent a single upstream server by its base URL
//! - Track liveness as last reported by the health prober

use std::sync::atomic::{AtomicBool, Ordering};
use url::{Position, Url};

/// A single backend server.
///
/// The URL is fixed at construction. Liveness is an atomic flag: the prober
/// for this backend is the only writer, request handlers only read it.
#[derive(Debug)]
pub struct Backend {
    url: Url,
    /// `host[:port]` of `url`, used as the outbound Host header.
    authority: String,
    alive: AtomicBool,
}

impl Backend {
    /// Create a new backend. Backends start out alive so traffic flows
    /// before the first probe completes.
    pub fn new(url: Url) -> Self {
        let authority = url[Position::BeforeHost..Position::AfterPort].to_string();
        Self {
            url,
            authority,
            alive: AtomicBool::new(true),
        }
    }

    /// Base URL of this backend.
    pub fn url(&self) -> &Url {
        &self.url
    }

    pub fn authority(&self) -> &str {
        &self.authority
    }

    /// Overwrite the liveness flag, returning the previous value.
    pub fn set_alive(&self, alive: bool) -> bool {
        self.alive.swap(alive, Ordering::Relaxed)
    }

    /// Current liveness flag.
    pub fn is_alive(&self) -> bool {
        self.alive.load(Ordering::Relaxed)
    }
}
