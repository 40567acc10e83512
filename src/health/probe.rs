//! Single-shot reachability probes.

use std::future::Future;
use std::time::Duration;

use axum::body::Body;
use axum::http::{header, Method, Request, StatusCode};
use hyper_util::{
    client::legacy::{connect::HttpConnector, Client},
    rt::TokioExecutor,
};
use tokio::time;
use url::Url;

const USER_AGENT: &str = concat!("logicraft-lb-health-check/", env!("CARGO_PKG_VERSION"));

/// Result of one probe.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProbeOutcome {
    /// Backend answered 200 OK.
    Up,
    /// Backend answered with any other status.
    Down(StatusCode),
    /// No response: connection error, DNS failure, timeout.
    Unreachable(String),
}

impl ProbeOutcome {
    pub fn is_alive(&self) -> bool {
        matches!(self, ProbeOutcome::Up)
    }
}

/// A way of checking whether a backend is reachable.
pub trait Probe: Send + Sync + 'static {
    fn probe(&self, target: &Url) -> impl Future<Output = ProbeOutcome> + Send;
}

/// HTTP GET probe with a bounded duration.
#[derive(Debug, Clone)]
pub struct HttpProbe {
    client: Client<HttpConnector, Body>,
    timeout: Duration,
    path: Option<String>,
}

impl HttpProbe {
    /// `path` overrides the path of the backend URL when set.
    pub fn new(timeout: Duration, path: Option<String>) -> Self {
        let client = Client::builder(TokioExecutor::new()).build(HttpConnector::new());
        Self {
            client,
            timeout,
            path,
        }
    }

    fn probe_url(&self, target: &Url) -> Url {
        let mut url = target.clone();
        if let Some(path) = &self.path {
            url.set_path(path);
        }
        url
    }
}

impl Probe for HttpProbe {
    async fn probe(&self, target: &Url) -> ProbeOutcome {
        let request = match Request::builder()
            .method(Method::GET)
            .uri(self.probe_url(target).as_str())
            .header(header::USER_AGENT, USER_AGENT)
            .body(Body::empty())
        {
            Ok(req) => req,
            Err(e) => return ProbeOutcome::Unreachable(format!("invalid probe request: {e}")),
        };

        match time::timeout(self.timeout, self.client.request(request)).await {
            Ok(Ok(response)) if response.status() == StatusCode::OK => ProbeOutcome::Up,
            Ok(Ok(response)) => ProbeOutcome::Down(response.status()),
            Ok(Err(e)) => ProbeOutcome::Unreachable(e.to_string()),
            Err(_) => ProbeOutcome::Unreachable(format!("timed out after {:?}", self.timeout)),
        }
    }
}
