//! Per-request backend selection and dispatch.
//!
//! # Responsibilities
//! - Advance the pool rotation exactly once per request
//! - Reject with 503 when the chosen backend is down
//! - Hand everything else to the forwarding transport
//!
//! Selection and the liveness check are separate steps, so a backend can go
//! down between them. Such a request is rejected, not retried.

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Instant;

use axum::{
    body::Body,
    extract::{ConnectInfo, State},
    http::{Request, StatusCode},
    response::{IntoResponse, Response},
};

use crate::http::forward::Forwarder;
use crate::http::request::request_id;
use crate::load_balancer::{Backend, BackendPool};
use crate::observability::metrics;

/// Body sent with the router's own 503.
pub const UNAVAILABLE_BODY: &str = "Service not available";

/// The externally-facing entry point.
#[derive(Debug, Clone)]
pub struct RequestRouter {
    pool: Arc<BackendPool>,
    forwarder: Forwarder,
    failover: bool,
}

impl RequestRouter {
    pub fn new(pool: Arc<BackendPool>, forwarder: Forwarder, failover: bool) -> Self {
        Self {
            pool,
            forwarder,
            failover,
        }
    }

    /// Pick the target for one request. `None` means answer 503.
    pub fn select(&self) -> Option<Arc<Backend>> {
        if self.failover {
            return self.pool.next_alive_backend();
        }

        let backend = self.pool.next_backend();
        if backend.is_alive() {
            Some(backend)
        } else {
            tracing::debug!(backend = %backend.url(), "Selected backend is down");
            None
        }
    }

    /// Route and forward one request.
    pub async fn handle(&self, request: Request<Body>) -> Response {
        let start = Instant::now();
        let request_id = request_id(&request).to_string();
        let client_addr = request
            .extensions()
            .get::<ConnectInfo<SocketAddr>>()
            .map(|ConnectInfo(addr)| *addr);

        let Some(backend) = self.select() else {
            tracing::warn!(
                request_id = %request_id,
                method = %request.method(),
                path = %request.uri().path(),
                "No live backend selected"
            );
            metrics::record_request("none", StatusCode::SERVICE_UNAVAILABLE.as_u16(), start);
            return unavailable();
        };

        tracing::debug!(
            request_id = %request_id,
            method = %request.method(),
            path = %request.uri().path(),
            backend = %backend.url(),
            "Forwarding request"
        );

        let response = match self.forwarder.forward(request, &backend, client_addr).await {
            Ok(response) => response,
            Err(e) => {
                tracing::error!(
                    request_id = %request_id,
                    backend = %backend.url(),
                    error = %e,
                    "Upstream error"
                );
                e.into_response()
            }
        };

        metrics::record_request(backend.url().as_str(), response.status().as_u16(), start);
        response
    }
}

/// The router's own rejection: 503 with a plain-text body.
pub fn unavailable() -> Response {
    (StatusCode::SERVICE_UNAVAILABLE, UNAVAILABLE_BODY).into_response()
}

/// Axum handler installed as the fallback for every method and path.
pub async fn route_request(
    State(router): State<RequestRouter>,
    request: Request<Body>,
) -> Response {
    router.handle(request).await
}
