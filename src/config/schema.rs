//! Configuration schema definitions.
//!
//! This module defines the complete configuration structure for the load balancer.
//! All types derive Serde traits for deserialization from config files.

use serde::{Deserialize, Serialize};

/// Root configuration for the load balancer.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct LbConfig {
    /// Listener configuration (bind address).
    pub listener: ListenerConfig,

    /// Ordered backend list. Rotation follows this order.
    pub backends: Vec<BackendConfig>,

    /// Health probe settings.
    pub health_check: HealthCheckConfig,

    /// Proxied request settings.
    pub forwarding: ForwardingConfig,

    /// Selection behaviour.
    pub routing: RoutingConfig,

    /// Observability settings.
    pub observability: ObservabilityConfig,
}

impl Default for LbConfig {
    fn default() -> Self {
        Self {
            listener: ListenerConfig::default(),
            backends: (4001..=4004)
                .map(|port| BackendConfig::new(format!("http://localhost:{port}")))
                .collect(),
            health_check: HealthCheckConfig::default(),
            forwarding: ForwardingConfig::default(),
            routing: RoutingConfig::default(),
            observability: ObservabilityConfig::default(),
        }
    }
}

/// Listener configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ListenerConfig {
    /// Bind address (e.g., "0.0.0.0:8080").
    pub bind_address: String,
}

impl Default for ListenerConfig {
    fn default() -> Self {
        Self {
            bind_address: "0.0.0.0:8080".to_string(),
        }
    }
}

/// Backend server configuration.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct BackendConfig {
    /// Base URL of the backend (e.g., "http://127.0.0.1:4001").
    pub url: String,
}

impl BackendConfig {
    pub fn new(url: impl Into<String>) -> Self {
        Self { url: url.into() }
    }
}

/// Health check configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct HealthCheckConfig {
    /// Enable active health checks.
    pub enabled: bool,

    /// Delay between the end of one probe and the start of the next, in seconds.
    pub interval_secs: u64,

    /// Probe timeout in seconds.
    pub timeout_secs: u64,

    /// Path to probe. `None` probes the backend base URL as configured.
    pub path: Option<String>,
}

impl Default for HealthCheckConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            interval_secs: 5,
            timeout_secs: 2,
            path: None,
        }
    }
}

/// Forwarding configuration.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct ForwardingConfig {
    /// Time allowed for the backend to return response headers.
    /// Unset means the proxied call is unbounded.
    pub timeout_secs: Option<u64>,

    /// Replace the client's Host header with the backend authority.
    /// Off by default, so backends see the Host the client sent.
    pub rewrite_host: bool,
}

/// Backend selection configuration.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct RoutingConfig {
    /// When the selected backend is down, try the next live one instead of
    /// answering 503. Off by default.
    pub failover: bool,
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Log level (trace, debug, info, warn, error).
    pub log_level: String,

    /// Enable metrics endpoint.
    pub metrics_enabled: bool,

    /// Metrics endpoint bind address.
    pub metrics_address: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            metrics_enabled: false,
            metrics_address: "0.0.0.0:9090".to_string(),
        }
    }
}
