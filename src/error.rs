//! Adapter-level errors and their HTTP mapping.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use thiserror::Error;

use crate::config::ConfigError;

/// Errors that end a request (or startup) without an upstream response.
#[derive(Debug, Error)]
pub enum AdapterError {
    /// Upstream could not be reached or its response could not be read.
    #[error("upstream request failed: {0}")]
    Upstream(#[source] reqwest::Error),

    /// Inbound body exceeded the configured limit.
    #[error("request body exceeds {limit} bytes")]
    BodyTooLarge { limit: usize },

    /// Inbound body could not be read.
    #[error("failed to read request body: {0}")]
    Body(#[source] axum::Error),

    /// Outbound HTTP client could not be built.
    #[error("failed to build upstream client: {0}")]
    Client(#[source] reqwest::Error),

    #[error(transparent)]
    Config(#[from] ConfigError),
}

/// Result type for adapter operations.
pub type AdapterResult<T> = Result<T, AdapterError>;

impl AdapterError {
    pub fn status(&self) -> StatusCode {
        match self {
            AdapterError::Upstream(_) => StatusCode::BAD_GATEWAY,
            AdapterError::BodyTooLarge { .. } => StatusCode::PAYLOAD_TOO_LARGE,
            AdapterError::Body(_) => StatusCode::BAD_REQUEST,
            AdapterError::Client(_) | AdapterError::Config(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for AdapterError {
    fn into_response(self) -> Response {
        let message = match &self {
            AdapterError::Upstream(_) => "Upstream request failed",
            AdapterError::BodyTooLarge { .. } => "Request body too large",
            AdapterError::Body(_) => "Invalid request body",
            AdapterError::Client(_) | AdapterError::Config(_) => "Adapter misconfigured",
        };
        (self.status(), message).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = AdapterError::BodyTooLarge { limit: 1024 };
        assert_eq!(err.to_string(), "request body exceeds 1024 bytes");
        assert_eq!(err.status(), StatusCode::PAYLOAD_TOO_LARGE);
    }

    #[test]
    fn config_errors_are_internal() {
        let err = AdapterError::from(ConfigError::Validation(Vec::new()));
        assert_eq!(err.into_response().status(), StatusCode::INTERNAL_SERVER_ERROR);
    }
}
