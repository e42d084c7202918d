//! Configuration validation.
//!
//! Serde handles the syntax; this module checks values that would only fail
//! at request time: an upstream origin that is not an origin, prefixes that
//! would produce doubled or missing slashes, header values that cannot be
//! encoded. All errors are collected, not just the first.

use std::collections::HashSet;
use std::net::SocketAddr;

use axum::http::HeaderValue;
use thiserror::Error;
use url::Url;

use crate::config::schema::AdapterConfig;

/// A single semantic problem in the configuration.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("upstream.origin {0:?} is not a valid URL")]
    InvalidOrigin(String),

    #[error("upstream.origin {0:?} must use http or https")]
    UnsupportedScheme(String),

    #[error("upstream.origin {0:?} must not carry a path, query or fragment")]
    OriginNotBare(String),

    #[error("upstream.base_path {0:?} must start and end with '/'")]
    InvalidBasePath(String),

    #[error("mount_prefix {0:?} must be empty or start with '/' and not end with '/'")]
    InvalidMountPrefix(String),

    #[error("cors.{field} is not a valid header value")]
    InvalidHeaderValue { field: &'static str },

    #[error("listener.bind_address {0:?} is not a socket address")]
    InvalidBindAddress(String),

    #[error("observability.metrics_address {0:?} is not a socket address")]
    InvalidMetricsAddress(String),

    #[error("route {0:?} is defined more than once")]
    DuplicateRoute(String),

    #[error("route {name:?} has invalid path {path:?}; expected a non-empty relative path")]
    InvalidRoutePath { name: String, path: String },
}

/// Validate a parsed configuration.
pub fn validate_config(config: &AdapterConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    validate_origin(&config.upstream.origin, &mut errors);

    let base = &config.upstream.base_path;
    if !base.starts_with('/') || !base.ends_with('/') {
        errors.push(ValidationError::InvalidBasePath(base.clone()));
    }

    let mount = &config.mount_prefix;
    if !mount.is_empty() && (!mount.starts_with('/') || mount.ends_with('/')) {
        errors.push(ValidationError::InvalidMountPrefix(mount.clone()));
    }

    if HeaderValue::from_str(&config.cors.allow_methods).is_err() {
        errors.push(ValidationError::InvalidHeaderValue { field: "allow_methods" });
    }
    if HeaderValue::from_str(&config.cors.allow_headers).is_err() {
        errors.push(ValidationError::InvalidHeaderValue { field: "allow_headers" });
    }

    if config.listener.bind_address.parse::<SocketAddr>().is_err() {
        errors.push(ValidationError::InvalidBindAddress(
            config.listener.bind_address.clone(),
        ));
    }

    let observability = &config.observability;
    if observability.metrics_enabled && observability.metrics_address.parse::<SocketAddr>().is_err() {
        errors.push(ValidationError::InvalidMetricsAddress(
            observability.metrics_address.clone(),
        ));
    }

    let mut seen = HashSet::new();
    for route in &config.routes {
        if !seen.insert(route.name.as_str()) {
            errors.push(ValidationError::DuplicateRoute(route.name.clone()));
        }
        if route.path.is_empty() || route.path.starts_with('/') || route.path.ends_with('/') {
            errors.push(ValidationError::InvalidRoutePath {
                name: route.name.clone(),
                path: route.path.clone(),
            });
        }
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

fn validate_origin(origin: &str, errors: &mut Vec<ValidationError>) {
    let url = match Url::parse(origin) {
        Ok(url) => url,
        Err(_) => {
            errors.push(ValidationError::InvalidOrigin(origin.to_string()));
            return;
        }
    };

    if !matches!(url.scheme(), "http" | "https") {
        errors.push(ValidationError::UnsupportedScheme(origin.to_string()));
    }

    // Url::parse renders a bare origin with path "/"; a literal trailing
    // slash in the source would still double up against base_path.
    if url.path() != "/" || origin.ends_with('/') || url.query().is_some() || url.fragment().is_some() {
        errors.push(ValidationError::OriginNotBare(origin.to_string()));
    }
}
