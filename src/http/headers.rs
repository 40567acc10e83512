//! Header manipulation for proxied traffic.
//!
//! # Responsibilities
//! - Strip hop-by-hop headers in both directions
//! - Append the client IP to X-Forwarded-For
//! - Record the original Host and scheme in X-Forwarded-Host / X-Forwarded-Proto
//! - Keep the client's Host, or point it at the chosen backend when asked

use std::net::SocketAddr;

use axum::http::header::{
    HeaderMap, HeaderName, HeaderValue, CONNECTION, HOST, PROXY_AUTHENTICATE,
    PROXY_AUTHORIZATION, TE, TRAILER, TRANSFER_ENCODING, UPGRADE,
};

pub const X_FORWARDED_FOR: HeaderName = HeaderName::from_static("x-forwarded-for");
pub const X_FORWARDED_HOST: HeaderName = HeaderName::from_static("x-forwarded-host");
pub const X_FORWARDED_PROTO: HeaderName = HeaderName::from_static("x-forwarded-proto");

const KEEP_ALIVE: HeaderName = HeaderName::from_static("keep-alive");
const PROXY_CONNECTION: HeaderName = HeaderName::from_static("proxy-connection");

/// Headers meaningful only for a single transport-level connection.
const HOP_BY_HOP: [HeaderName; 9] = [
    CONNECTION,
    KEEP_ALIVE,
    PROXY_CONNECTION,
    PROXY_AUTHENTICATE,
    PROXY_AUTHORIZATION,
    TE,
    TRAILER,
    TRANSFER_ENCODING,
    UPGRADE,
];

/// Remove hop-by-hop headers, including any listed in `Connection`.
pub fn strip_hop_by_hop(headers: &mut HeaderMap) {
    let listed: Vec<HeaderName> = headers
        .get_all(CONNECTION)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .flat_map(|value| value.split(','))
        .filter_map(|name| HeaderName::from_bytes(name.trim().as_bytes()).ok())
        .collect();

    for name in listed.iter().chain(HOP_BY_HOP.iter()) {
        headers.remove(name);
    }
}

/// Rewrite inbound request headers for delivery to a backend.
///
/// The client's Host is passed through unless `host_override` is set.
pub fn prepare_upstream_headers(
    headers: &mut HeaderMap,
    host_override: Option<&str>,
    client_addr: Option<SocketAddr>,
) {
    strip_hop_by_hop(headers);

    if let Some(addr) = client_addr {
        let client_ip = addr.ip().to_string();
        let prior: Vec<&str> = headers
            .get_all(&X_FORWARDED_FOR)
            .iter()
            .filter_map(|v| v.to_str().ok())
            .collect();
        let chain = if prior.is_empty() {
            client_ip
        } else {
            format!("{}, {}", prior.join(", "), client_ip)
        };
        if let Ok(value) = HeaderValue::from_str(&chain) {
            headers.insert(X_FORWARDED_FOR, value);
        }
    }

    if !headers.contains_key(&X_FORWARDED_HOST) {
        if let Some(original) = headers.get(HOST).cloned() {
            headers.insert(X_FORWARDED_HOST, original);
        }
    }

    if !headers.contains_key(&X_FORWARDED_PROTO) {
        headers.insert(X_FORWARDED_PROTO, HeaderValue::from_static("http"));
    }

    if let Some(authority) = host_override {
        match HeaderValue::from_str(authority) {
            Ok(value) => {
                headers.insert(HOST, value);
            }
            Err(_) => {
                headers.remove(HOST);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn client() -> Option<SocketAddr> {
        Some("203.0.113.7:51234".parse().unwrap())
    }

    #[test]
    fn strips_standard_and_connection_listed_headers() {
        let mut headers = HeaderMap::new();
        headers.insert(CONNECTION, HeaderValue::from_static("keep-alive, x-session-hop"));
        headers.insert(KEEP_ALIVE, HeaderValue::from_static("timeout=5"));
        headers.insert(TRANSFER_ENCODING, HeaderValue::from_static("chunked"));
        headers.insert("x-session-hop", HeaderValue::from_static("1"));
        headers.insert("x-kept", HeaderValue::from_static("yes"));

        strip_hop_by_hop(&mut headers);

        assert_eq!(headers.len(), 1);
        assert_eq!(headers["x-kept"], "yes");
    }

    #[test]
    fn sets_forwarding_headers_and_keeps_client_host() {
        let mut headers = HeaderMap::new();
        headers.insert(HOST, HeaderValue::from_static("lb.example.com"));
        headers.insert("authorization", HeaderValue::from_static("Bearer abc"));

        prepare_upstream_headers(&mut headers, None, client());

        assert_eq!(headers[HOST], "lb.example.com");
        assert_eq!(headers[X_FORWARDED_FOR], "203.0.113.7");
        assert_eq!(headers[X_FORWARDED_HOST], "lb.example.com");
        assert_eq!(headers[X_FORWARDED_PROTO], "http");
        assert_eq!(headers["authorization"], "Bearer abc");
    }

    #[test]
    fn host_override_points_host_at_backend() {
        let mut headers = HeaderMap::new();
        headers.insert(HOST, HeaderValue::from_static("lb.example.com"));

        prepare_upstream_headers(&mut headers, Some("127.0.0.1:4001"), client());

        assert_eq!(headers[HOST], "127.0.0.1:4001");
        assert_eq!(headers[X_FORWARDED_HOST], "lb.example.com");
    }

    #[test]
    fn appends_to_existing_forwarded_for_chain() {
        let mut headers = HeaderMap::new();
        headers.append(X_FORWARDED_FOR, HeaderValue::from_static("10.0.0.1"));
        headers.append(X_FORWARDED_FOR, HeaderValue::from_static("10.0.0.2"));

        prepare_upstream_headers(&mut headers, None, client());

        assert_eq!(
            headers.get_all(X_FORWARDED_FOR).iter().count(),
            1,
            "chain collapses into one value"
        );
        assert_eq!(headers[X_FORWARDED_FOR], "10.0.0.1, 10.0.0.2, 203.0.113.7");
    }

    #[test]
    fn without_client_addr_leaves_forwarded_for_alone() {
        let mut headers = HeaderMap::new();
        prepare_upstream_headers(&mut headers, None, None);

        assert!(!headers.contains_key(X_FORWARDED_FOR));
        assert!(!headers.contains_key(X_FORWARDED_HOST));
        assert!(!headers.contains_key(HOST));
    }
}
