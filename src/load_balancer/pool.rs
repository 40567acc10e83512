//! Backend pool management.
//!
//! # Responsibilities
//! - Own the ordered, fixed set of backends
//! - Apply the selection policy to pick the next backend
//! - Hand out backends to the health monitor

use std::sync::Arc;
use thiserror::Error;
use url::Url;

use crate::config::BackendConfig;
use crate::load_balancer::{backend::Backend, round_robin::RoundRobin, Selector};

/// Error type for pool construction.
#[derive(Debug, Error)]
pub enum PoolError {
    #[error("backend pool must contain at least one backend")]
    Empty,

    #[error("invalid backend url {url:?}: {source}")]
    InvalidUrl {
        url: String,
        #[source]
        source: url::ParseError,
    },
}

/// The ordered collection of backends plus the rotation cursor.
#[derive(Debug)]
pub struct BackendPool {
    backends: Vec<Arc<Backend>>,
    selector: Box<dyn Selector>,
}

impl BackendPool {
    /// Create a round-robin pool. Fails if `urls` is empty.
    pub fn new(urls: Vec<Url>) -> Result<Self, PoolError> {
        Self::with_selector(urls, Box::new(RoundRobin::new()))
    }

    /// Create a pool with a custom selection policy.
    pub fn with_selector(urls: Vec<Url>, selector: Box<dyn Selector>) -> Result<Self, PoolError> {
        if urls.is_empty() {
            return Err(PoolError::Empty);
        }

        let backends = urls
            .into_iter()
            .map(|url| Arc::new(Backend::new(url)))
            .collect();

        Ok(Self { backends, selector })
    }

    /// Create a round-robin pool from configuration, preserving order.
    pub fn from_config(configs: &[BackendConfig]) -> Result<Self, PoolError> {
        let urls = configs
            .iter()
            .map(|config| {
                Url::parse(&config.url).map_err(|source| PoolError::InvalidUrl {
                    url: config.url.clone(),
                    source,
                })
            })
            .collect::<Result<Vec<_>, _>>()?;

        Self::new(urls)
    }

    /// Advance the rotation by one and return the backend at the new position.
    /// Liveness is not consulted.
    pub fn next_backend(&self) -> Arc<Backend> {
        let len = self.backends.len();
        let index = self.selector.next_index(len) % len;
        self.backends[index].clone()
    }

    /// Advance the rotation by one, then scan forward from that position for
    /// the first live backend. Returns `None` if every backend is down.
    pub fn next_alive_backend(&self) -> Option<Arc<Backend>> {
        let len = self.backends.len();
        let start = self.selector.next_index(len);

        (0..len)
            .map(|i| &self.backends[(start + i) % len])
            .find(|backend| backend.is_alive())
            .cloned()
    }

    /// All backends in configured order.
    pub fn backends(&self) -> &[Arc<Backend>] {
        &self.backends
    }

    pub fn len(&self) -> usize {
        self.backends.len()
    }

    /// Always false for a constructed pool.
    pub fn is_empty(&self) -> bool {
        self.backends.is_empty()
    }
}
