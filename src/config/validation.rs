//! Configuration validation.
//!
//! Serde handles syntax; this module checks that the values make sense.
//! All errors are collected so an operator can fix a config file in one pass.

use std::net::SocketAddr;
use thiserror::Error;
use url::Url;

use crate::config::schema::LbConfig;

/// A single semantic problem in a configuration.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("no backends configured")]
    NoBackends,

    #[error("backend #{index}: invalid url {url:?}: {reason}")]
    InvalidBackendUrl {
        index: usize,
        url: String,
        reason: String,
    },

    #[error("backend #{index}: unsupported scheme {scheme:?}, only http is proxied")]
    UnsupportedScheme { index: usize, scheme: String },

    #[error("backend #{index}: url {url:?} has no host")]
    MissingHost { index: usize, url: String },

    #[error("invalid bind address {0:?}")]
    InvalidBindAddress(String),

    #[error("{0} must be greater than zero")]
    ZeroDuration(&'static str),
}

/// Validate a parsed configuration.
pub fn validate_config(config: &LbConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    if !is_bind_address(&config.listener.bind_address) {
        errors.push(ValidationError::InvalidBindAddress(
            config.listener.bind_address.clone(),
        ));
    }

    if config.backends.is_empty() {
        errors.push(ValidationError::NoBackends);
    }

    for (index, backend) in config.backends.iter().enumerate() {
        if let Err(e) = check_backend_url(index, &backend.url) {
            errors.push(e);
        }
    }

    if config.health_check.interval_secs == 0 {
        errors.push(ValidationError::ZeroDuration("health_check.interval_secs"));
    }
    if config.health_check.timeout_secs == 0 {
        errors.push(ValidationError::ZeroDuration("health_check.timeout_secs"));
    }
    if config.forwarding.timeout_secs == Some(0) {
        errors.push(ValidationError::ZeroDuration("forwarding.timeout_secs"));
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

/// Accepts `ip:port` as well as `hostname:port`; hostnames are resolved when
/// the listener binds.
fn is_bind_address(raw: &str) -> bool {
    if raw.parse::<SocketAddr>().is_ok() {
        return true;
    }
    match raw.rsplit_once(':') {
        Some((host, port)) => {
            !host.is_empty() && !host.contains(':') && port.parse::<u16>().is_ok()
        }
        None => false,
    }
}

fn check_backend_url(index: usize, raw: &str) -> Result<(), ValidationError> {
    let url = Url::parse(raw).map_err(|e| ValidationError::InvalidBackendUrl {
        index,
        url: raw.to_string(),
        reason: e.to_string(),
    })?;

    if url.scheme() != "http" {
        return Err(ValidationError::UnsupportedScheme {
            index,
            scheme: url.scheme().to_string(),
        });
    }

    if url.host_str().map_or(true, str::is_empty) {
        return Err(ValidationError::MissingHost {
            index,
            url: raw.to_string(),
        });
    }

    Ok(())
}
