//! Response transforms keyed by route family.
//!
//! # Data Flow
//! ```text
//! remainder
//!     → TransformTable::find (first matching route)
//!     → ResponseTransform::accepts (upstream Content-Type)
//!     → ResponseTransform::transform (buffered body)
//!         Ok  → new body + transform content type
//!         Err → original bytes passed through
//! ```
//!
//! # Design Decisions
//! - One forwarder for every route; transforms are plugged in per family
//! - Transforms are synchronous over a fully buffered body
//! - A transform failure is never an adapter error

pub mod products;

use std::sync::Arc;

use axum::http::HeaderValue;
use bytes::Bytes;
use thiserror::Error;

use crate::config::{RouteConfig, TransformKind};
use crate::routing::{Matcher, SegmentPrefixMatcher};

pub use products::ProductEnvelope;

/// Reasons a transform declines to rewrite a body.
#[derive(Debug, Error)]
pub enum TransformError {
    #[error("body is not valid JSON: {0}")]
    InvalidJson(#[from] serde_json::Error),
}

/// A rewrite applied to successful upstream responses of a route family.
pub trait ResponseTransform: Send + Sync + std::fmt::Debug {
    /// Identifier used in logs and metrics.
    fn name(&self) -> &'static str;

    /// Whether the upstream `Content-Type` is one this transform understands.
    fn accepts(&self, content_type: &str) -> bool;

    /// Rewrite the body.
    fn transform(&self, body: &[u8]) -> Result<Bytes, TransformError>;

    /// `Content-Type` of the rewritten body.
    fn content_type(&self) -> HeaderValue;
}

/// A route family bound to its transform.
#[derive(Debug)]
pub struct TransformRoute {
    pub name: String,
    matcher: Box<dyn Matcher>,
    transform: Arc<dyn ResponseTransform>,
}

impl TransformRoute {
    pub fn new(
        name: impl Into<String>,
        matcher: Box<dyn Matcher>,
        transform: Arc<dyn ResponseTransform>,
    ) -> Self {
        Self {
            name: name.into(),
            matcher,
            transform,
        }
    }

    pub fn transform(&self) -> &dyn ResponseTransform {
        self.transform.as_ref()
    }
}

/// Ordered set of transform routes. Immutable after construction.
#[derive(Debug, Default)]
pub struct TransformTable {
    routes: Vec<TransformRoute>,
}

impl TransformTable {
    pub fn new(routes: Vec<TransformRoute>) -> Self {
        Self { routes }
    }

    pub fn from_config(routes: &[RouteConfig]) -> Self {
        let routes = routes
            .iter()
            .map(|route| {
                let transform: Arc<dyn ResponseTransform> = match route.transform {
                    TransformKind::ProductEnvelope => Arc::new(ProductEnvelope),
                };
                tracing::debug!(route = %route.name, path = %route.path, transform = transform.name(), "Registered transform route");
                TransformRoute::new(
                    route.name.clone(),
                    Box::new(SegmentPrefixMatcher::new(route.path.clone())),
                    transform,
                )
            })
            .collect();
        Self::new(routes)
    }

    /// First route whose matcher accepts the remainder.
    pub fn find(&self, remainder: &str) -> Option<&TransformRoute> {
        self.routes.iter().find(|route| route.matcher.matches(remainder))
    }

    pub fn len(&self) -> usize {
        self.routes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.routes.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn finds_configured_family() {
        let table = TransformTable::from_config(&[RouteConfig {
            name: "products".into(),
            path: "products".into(),
            transform: TransformKind::ProductEnvelope,
        }]);

        assert_eq!(table.len(), 1);
        let route = table.find("products/123").unwrap();
        assert_eq!(route.name, "products");
        assert_eq!(route.transform().name(), "product_envelope");
        assert!(table.find("stats").is_none());
        assert!(table.find("productsale").is_none());
    }

    #[test]
    fn empty_table_matches_nothing() {
        let table = TransformTable::default();
        assert!(table.is_empty());
        assert!(table.find("products").is_none());
    }
}
