//! CORS header set and preflight handling.
//!
//! # Responsibilities
//! - Compute the CORS header set for each request from its `Origin`
//! - Answer `OPTIONS` preflights locally with 204
//! - Stamp the header set onto every outgoing response
//!
//! # Design Decisions
//! - Computed per request, never cached across requests
//! - Applied last, so it overrides same-named upstream headers
//! - `Origin` is echoed verbatim; absent or empty falls back to `*`

use axum::body::Body;
use axum::http::header::{
    ACCESS_CONTROL_ALLOW_CREDENTIALS, ACCESS_CONTROL_ALLOW_HEADERS, ACCESS_CONTROL_ALLOW_METHODS,
    ACCESS_CONTROL_ALLOW_ORIGIN, ORIGIN, VARY,
};
use axum::http::{HeaderMap, HeaderValue, Method, StatusCode};
use axum::response::Response;

use crate::config::{ConfigError, CorsConfig, ValidationError};
use crate::error::AdapterError;

/// Fixed part of the CORS header set, compiled from config at startup.
#[derive(Debug, Clone)]
pub struct CorsPolicy {
    allow_methods: HeaderValue,
    allow_headers: HeaderValue,
    allow_credentials: bool,
}

impl CorsPolicy {
    pub fn from_config(config: &CorsConfig) -> Result<Self, AdapterError> {
        let invalid = |field: &'static str| {
            AdapterError::from(ConfigError::Validation(vec![ValidationError::InvalidHeaderValue {
                field,
            }]))
        };
        Ok(Self {
            allow_methods: HeaderValue::from_str(&config.allow_methods)
                .map_err(|_| invalid("allow_methods"))?,
            allow_headers: HeaderValue::from_str(&config.allow_headers)
                .map_err(|_| invalid("allow_headers"))?,
            allow_credentials: config.allow_credentials,
        })
    }

    /// Header set for a request with the given headers.
    pub fn headers_for(&self, request_headers: &HeaderMap) -> CorsHeaders {
        let allow_origin = request_headers
            .get(ORIGIN)
            .filter(|origin| !origin.is_empty())
            .cloned()
            .unwrap_or_else(|| HeaderValue::from_static("*"));

        CorsHeaders {
            allow_origin,
            allow_methods: self.allow_methods.clone(),
            allow_headers: self.allow_headers.clone(),
            allow_credentials: self.allow_credentials,
        }
    }
}

impl Default for CorsPolicy {
    fn default() -> Self {
        Self {
            allow_methods: HeaderValue::from_static("GET,POST,PUT,PATCH,DELETE,OPTIONS"),
            allow_headers: HeaderValue::from_static("Content-Type, Authorization"),
            allow_credentials: true,
        }
    }
}

/// CORS headers for one request.
#[derive(Debug, Clone)]
pub struct CorsHeaders {
    allow_origin: HeaderValue,
    allow_methods: HeaderValue,
    allow_headers: HeaderValue,
    allow_credentials: bool,
}

impl CorsHeaders {
    /// Insert the set, replacing any existing values of the same names.
    pub fn apply(&self, headers: &mut HeaderMap) {
        headers.insert(ACCESS_CONTROL_ALLOW_ORIGIN, self.allow_origin.clone());
        headers.insert(ACCESS_CONTROL_ALLOW_METHODS, self.allow_methods.clone());
        headers.insert(ACCESS_CONTROL_ALLOW_HEADERS, self.allow_headers.clone());
        if self.allow_credentials {
            headers.insert(ACCESS_CONTROL_ALLOW_CREDENTIALS, HeaderValue::from_static("true"));
        } else {
            headers.remove(ACCESS_CONTROL_ALLOW_CREDENTIALS);
        }
        headers.insert(VARY, HeaderValue::from_static("Origin"));
    }

    /// 204 answer to a preflight, no body.
    pub fn preflight(&self) -> Response {
        let mut response = Response::new(Body::empty());
        *response.status_mut() = StatusCode::NO_CONTENT;
        self.apply(response.headers_mut());
        response
    }
}

/// Whether a request is a preflight that must not reach the upstream.
pub fn is_preflight(method: &Method) -> bool {
    *method == Method::OPTIONS
}
