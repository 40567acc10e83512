//! Forwarding transport.
//!
//! # Responsibilities
//! - Rewrite the request URI onto the chosen backend's base URL
//! - Stream the request to the backend and the response back
//! - Map transport failures to 502 / 504
//!
//! # Design Decisions
//! - Bodies are never buffered
//! - Backend status, headers and body are relayed as-is, minus hop-by-hop headers
//! - The optional timeout bounds the wait for response headers only
//! - The client's Host is kept unless Host rewriting is enabled

use std::net::SocketAddr;
use std::time::Duration;

use axum::body::Body;
use axum::http::{uri::PathAndQuery, Request, StatusCode, Uri, Version};
use axum::response::{IntoResponse, Response};
use hyper_util::{
    client::legacy::{connect::HttpConnector, Client},
    rt::TokioExecutor,
};
use thiserror::Error;
use tokio::time;
use url::Url;

use crate::http::headers::{prepare_upstream_headers, strip_hop_by_hop};
use crate::load_balancer::Backend;

/// Failure while relaying a request to a backend.
#[derive(Debug, Error)]
pub enum ForwardError {
    #[error("failed to build upstream request: {0}")]
    Request(#[from] axum::http::Error),

    #[error("upstream request failed: {0}")]
    Upstream(#[from] hyper_util::client::legacy::Error),

    #[error("upstream did not respond within {0:?}")]
    Timeout(Duration),
}

impl ForwardError {
    /// Status returned to the original caller.
    pub fn status(&self) -> StatusCode {
        match self {
            ForwardError::Timeout(_) => StatusCode::GATEWAY_TIMEOUT,
            ForwardError::Request(_) | ForwardError::Upstream(_) => StatusCode::BAD_GATEWAY,
        }
    }
}

impl IntoResponse for ForwardError {
    fn into_response(self) -> Response {
        let status = self.status();
        (status, status.canonical_reason().unwrap_or("Bad Gateway")).into_response()
    }
}

/// Reverse-proxy client shared by all request handlers.
#[derive(Debug, Clone)]
pub struct Forwarder {
    client: Client<HttpConnector, Body>,
    timeout: Option<Duration>,
    rewrite_host: bool,
}

impl Forwarder {
    pub fn new(timeout: Option<Duration>, rewrite_host: bool) -> Self {
        let client = Client::builder(TokioExecutor::new()).build(HttpConnector::new());
        Self {
            client,
            timeout,
            rewrite_host,
        }
    }

    /// Relay `request` to `backend` and return the backend's response.
    pub async fn forward(
        &self,
        request: Request<Body>,
        backend: &Backend,
        client_addr: Option<SocketAddr>,
    ) -> Result<Response, ForwardError> {
        let (mut parts, body) = request.into_parts();

        parts.uri = upstream_uri(backend.url(), &parts.uri)?;
        // The upstream client speaks HTTP/1.1 regardless of the inbound protocol.
        parts.version = Version::HTTP_11;
        let host_override = self.rewrite_host.then(|| backend.authority());
        prepare_upstream_headers(&mut parts.headers, host_override, client_addr);

        let pending = self.client.request(Request::from_parts(parts, body));
        let response: hyper::Response<hyper::body::Incoming> = match self.timeout {
            Some(limit) => time::timeout(limit, pending)
                .await
                .map_err(|_| ForwardError::Timeout(limit))??,
            None => pending.await?,
        };

        let (mut parts, body) = response.into_parts();
        strip_hop_by_hop(&mut parts.headers);
        Ok(Response::from_parts(parts, Body::new(body)))
    }
}

/// Map an inbound URI onto a backend base URL.
///
/// The base path and request path are joined with exactly one slash and the
/// base query, if any, is kept in front of the request query.
pub fn upstream_uri(base: &Url, inbound: &Uri) -> Result<Uri, axum::http::Error> {
    let mut path_and_query = join_paths(base.path(), inbound.path());

    let query = match (base.query().filter(|q| !q.is_empty()), inbound.query()) {
        (Some(b), Some(r)) if !r.is_empty() => Some(format!("{b}&{r}")),
        (Some(b), _) => Some(b.to_string()),
        (None, r) => r.map(str::to_string),
    };
    if let Some(query) = query {
        path_and_query.push('?');
        path_and_query.push_str(&query);
    }

    let authority = &base[url::Position::BeforeHost..url::Position::AfterPort];
    Uri::builder()
        .scheme(base.scheme())
        .authority(authority)
        .path_and_query(PathAndQuery::try_from(path_and_query)?)
        .build()
}

fn join_paths(base: &str, path: &str) -> String {
    match (base.ends_with('/'), path.starts_with('/')) {
        (true, true) => format!("{}{}", base, &path[1..]),
        (false, false) => format!("{base}/{path}"),
        _ => format!("{base}{path}"),
    }
}
