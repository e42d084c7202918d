//! Configuration schema definitions.
//!
//! This module defines the complete configuration structure for the adapter.
//! All types derive Serde traits for deserialization from config files.

use serde::{Deserialize, Serialize};

/// Root configuration for the edge adapter.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct AdapterConfig {
    /// Listener configuration (bind address).
    pub listener: ListenerConfig,

    /// Path prefix the adapter is mounted under (e.g., "/api").
    /// Empty mounts the adapter at the root.
    pub mount_prefix: String,

    /// Upstream origin that requests are forwarded to.
    pub upstream: UpstreamConfig,

    /// CORS header values attached to every response.
    pub cors: CorsConfig,

    /// Request size limits.
    pub limits: LimitsConfig,

    /// Observability settings.
    pub observability: ObservabilityConfig,

    /// Route families with a response transform, checked in order.
    pub routes: Vec<RouteConfig>,
}

impl Default for AdapterConfig {
    fn default() -> Self {
        Self {
            listener: ListenerConfig::default(),
            mount_prefix: "/api".to_string(),
            upstream: UpstreamConfig::default(),
            cors: CorsConfig::default(),
            limits: LimitsConfig::default(),
            observability: ObservabilityConfig::default(),
            routes: Vec::new(),
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

/// Upstream target configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct UpstreamConfig {
    /// Scheme and authority of the upstream (e.g., "https://api.example.app").
    pub origin: String,

    /// Path every forwarded remainder is appended to.
    pub base_path: String,
}

impl Default for UpstreamConfig {
    fn default() -> Self {
        Self {
            origin: "http://127.0.0.1:3000".to_string(),
            base_path: "/api/".to_string(),
        }
    }
}

/// CORS header values.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct CorsConfig {
    /// Value of `Access-Control-Allow-Methods`.
    pub allow_methods: String,

    /// Value of `Access-Control-Allow-Headers`.
    pub allow_headers: String,

    /// Emit `Access-Control-Allow-Credentials: true`.
    pub allow_credentials: bool,
}

impl Default for CorsConfig {
    fn default() -> Self {
        Self {
            allow_methods: "GET,POST,PUT,PATCH,DELETE,OPTIONS".to_string(),
            allow_headers: "Content-Type, Authorization".to_string(),
            allow_credentials: true,
        }
    }
}

/// Request size limits.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct LimitsConfig {
    /// Maximum inbound body size in bytes.
    pub max_body_size: usize,
}

impl Default for LimitsConfig {
    fn default() -> Self {
        Self {
            max_body_size: 2 * 1024 * 1024, // 2MB
        }
    }
}

/// Log output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Full,
    Compact,
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Log filter used when `RUST_LOG` is not set.
    pub log_level: String,

    /// Log line format.
    pub log_format: LogFormat,

    /// Enable the Prometheus metrics endpoint.
    pub metrics_enabled: bool,

    /// Metrics endpoint bind address.
    pub metrics_address: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "edge_adapter=info,tower_http=info".to_string(),
            log_format: LogFormat::Full,
            metrics_enabled: false,
            metrics_address: "0.0.0.0:9090".to_string(),
        }
    }
}

/// Response transform applied to a route family.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum TransformKind {
    /// Reshape a product listing into `{ items, products }`.
    ProductEnvelope,
}

/// Route family bound to a response transform.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct RouteConfig {
    /// Route identifier for logging/metrics.
    pub name: String,

    /// Leading remainder segment(s) to match, e.g. "products".
    pub path: String,

    /// Transform applied to successful responses of this family.
    pub transform: TransformKind,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_browser_contract() {
        let config = AdapterConfig::default();
        assert_eq!(config.mount_prefix, "/api");
        assert_eq!(config.upstream.base_path, "/api/");
        assert_eq!(config.cors.allow_methods, "GET,POST,PUT,PATCH,DELETE,OPTIONS");
        assert_eq!(config.cors.allow_headers, "Content-Type, Authorization");
        assert!(config.cors.allow_credentials);
        assert!(config.routes.is_empty());
    }

    #[test]
    fn minimal_toml_fills_defaults() {
        let config: AdapterConfig = toml::from_str(
            r#"
            [upstream]
            origin = "https://api.example.app"

            [[routes]]
            name = "products"
            path = "products"
            transform = "product_envelope"
            "#,
        )
        .unwrap();

        assert_eq!(config.upstream.origin, "https://api.example.app");
        assert_eq!(config.upstream.base_path, "/api/");
        assert_eq!(config.listener.bind_address, "0.0.0.0:8080");
        assert_eq!(config.routes.len(), 1);
        assert_eq!(config.routes[0].transform, TransformKind::ProductEnvelope);
        assert_eq!(config.observability.log_format, LogFormat::Full);
    }
}
