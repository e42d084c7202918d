//! HTTP server setup and configuration.
//!
//! # Responsibilities
//! - Compile the validated config into shared handler state
//! - Create the Axum Router for the mount prefix
//! - Wire up middleware (request ID, tracing)
//! - Run the CORS state machine: preflight locally, everything else upstream
//! - Attach CORS headers to every response, errors included

use std::sync::Arc;
use std::time::Instant;

use axum::{
    body::Body,
    extract::State,
    http::{Request, StatusCode},
    response::{IntoResponse, Response},
    routing::any,
    Router,
};
use tokio::net::TcpListener;
use tokio::sync::broadcast;
use tower::ServiceBuilder;
use tower_http::{
    request_id::{PropagateRequestIdLayer, SetRequestIdLayer},
    trace::TraceLayer,
};

use crate::config::{validate_config, AdapterConfig, ConfigError};
use crate::error::{AdapterError, AdapterResult};
use crate::http::cors::{is_preflight, CorsPolicy};
use crate::http::forward::Forwarder;
use crate::http::request::{request_id, UuidRequestId, X_REQUEST_ID};
use crate::lifecycle::shutdown::wait_for;
use crate::observability::metrics;
use crate::routing::{PathCapture, UpstreamBase};
use crate::transform::TransformTable;

/// Application state injected into handlers.
#[derive(Clone)]
pub struct AppState {
    pub forwarder: Arc<Forwarder>,
    pub cors: Arc<CorsPolicy>,
    pub mount_prefix: Arc<str>,
}

/// HTTP server for the edge adapter.
pub struct AdapterServer {
    router: Router,
    config: AdapterConfig,
}

impl AdapterServer {
    /// Create a new server with the given configuration.
    pub fn new(config: AdapterConfig) -> AdapterResult<Self> {
        validate_config(&config).map_err(|errors| AdapterError::Config(ConfigError::Validation(errors)))?;

        let transforms = TransformTable::from_config(&config.routes);
        let forwarder = Forwarder::new(
            UpstreamBase::from_config(&config.upstream),
            transforms,
            config.limits.max_body_size,
        )?;

        let state = AppState {
            forwarder: Arc::new(forwarder),
            cors: Arc::new(CorsPolicy::from_config(&config.cors)?),
            mount_prefix: Arc::from(config.mount_prefix.as_str()),
        };

        let router = Self::build_router(&config.mount_prefix, state);
        Ok(Self { router, config })
    }

    /// Build the Axum router with all middleware layers.
    fn build_router(mount_prefix: &str, state: AppState) -> Router {
        let router = if mount_prefix.is_empty() {
            Router::new()
                .route("/", any(proxy_handler))
                .route("/{*path}", any(proxy_handler))
        } else {
            Router::new()
                .route(mount_prefix, any(proxy_handler))
                .route(&format!("{mount_prefix}/"), any(proxy_handler))
                .route(&format!("{mount_prefix}/{{*path}}"), any(proxy_handler))
        };

        router.fallback(not_found_handler).with_state(state).layer(
            ServiceBuilder::new()
                .layer(SetRequestIdLayer::new(X_REQUEST_ID, UuidRequestId))
                .layer(TraceLayer::new_for_http())
                .layer(PropagateRequestIdLayer::new(X_REQUEST_ID)),
        )
    }

    /// The router, for serving in-process.
    pub fn router(&self) -> Router {
        self.router.clone()
    }

    /// Serve on `listener` until `shutdown` fires, then drain.
    pub async fn run(
        self,
        listener: TcpListener,
        shutdown: broadcast::Receiver<()>,
    ) -> Result<(), std::io::Error> {
        let addr = listener.local_addr()?;
        tracing::info!(
            address = %addr,
            mount_prefix = %self.config.mount_prefix,
            upstream = %self.config.upstream.origin,
            transform_routes = self.config.routes.len(),
            "HTTP server starting"
        );

        axum::serve(listener, self.router)
            .with_graceful_shutdown(wait_for(shutdown))
            .await?;

        tracing::info!("HTTP server stopped");
        Ok(())
    }
}

/// Catch-all handler for everything under the mount prefix.
async fn proxy_handler(State(state): State<AppState>, request: Request<Body>) -> Response {
    let start_time = Instant::now();
    let request_id = request_id(&request).to_string();
    let method = request.method().clone();
    let capture = PathCapture::from_request_path(&state.mount_prefix, request.uri().path());
    let cors = state.cors.headers_for(request.headers());

    let (mut response, outcome) = if is_preflight(&method) {
        (cors.preflight(), "preflight")
    } else {
        match state.forwarder.forward(request, &capture).await {
            Ok(forwarded) => (forwarded.response, forwarded.outcome.as_str()),
            Err(e) => {
                tracing::error!(
                    request_id = %request_id,
                    method = %method,
                    remainder = %capture.remainder(),
                    error = %e,
                    "Request failed"
                );
                (e.into_response(), "error")
            }
        }
    };

    cors.apply(response.headers_mut());

    let status = response.status();
    metrics::record_request(method.as_str(), status.as_u16(), outcome, start_time);
    tracing::debug!(
        request_id = %request_id,
        method = %method,
        remainder = %capture.remainder(),
        status = status.as_u16(),
        outcome,
        "Request completed"
    );

    response
}

/// Paths outside the mount prefix still get CORS headers.
async fn not_found_handler(State(state): State<AppState>, request: Request<Body>) -> Response {
    let cors = state.cors.headers_for(request.headers());
    let mut response = (StatusCode::NOT_FOUND, "No matching route found").into_response();
    cors.apply(response.headers_mut());
    response
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::header::{ACCESS_CONTROL_ALLOW_ORIGIN, VARY};
    use tower::ServiceExt;

    /// An origin nothing listens on.
    fn closed_origin() -> String {
        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);
        format!("http://{addr}")
    }

    fn server() -> AdapterServer {
        let mut config = AdapterConfig::default();
        config.upstream.origin = closed_origin();
        config.limits.max_body_size = 8;
        AdapterServer::new(config).unwrap()
    }

    #[tokio::test]
    async fn preflight_never_reaches_upstream() {
        let response = server()
            .router()
            .oneshot(
                Request::builder()
                    .method("OPTIONS")
                    .uri("/api/products")
                    .header("origin", "https://shop.example")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::NO_CONTENT);
        assert_eq!(response.headers()[ACCESS_CONTROL_ALLOW_ORIGIN], "https://shop.example");
        let body = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
        assert!(body.is_empty());
    }

    #[tokio::test]
    async fn transport_failure_is_502_with_cors() {
        let response = server()
            .router()
            .oneshot(
                Request::builder()
                    .uri("/api/stats")
                    .header("origin", "https://shop.example")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_GATEWAY);
        assert_eq!(response.headers()[ACCESS_CONTROL_ALLOW_ORIGIN], "https://shop.example");
        assert_eq!(response.headers()[VARY], "Origin");
    }

    #[tokio::test]
    async fn oversized_body_is_413_with_cors() {
        let response = server()
            .router()
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri("/api/orders")
                    .body(Body::from("far too many bytes"))
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::PAYLOAD_TOO_LARGE);
        assert_eq!(response.headers()[ACCESS_CONTROL_ALLOW_ORIGIN], "*");
    }

    #[tokio::test]
    async fn outside_mount_is_404_with_cors() {
        let response = server()
            .router()
            .oneshot(Request::builder().uri("/static/app.js").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        assert_eq!(response.headers()[ACCESS_CONTROL_ALLOW_ORIGIN], "*");
    }

    #[tokio::test]
    async fn bare_prefix_and_trailing_slash_are_routed() {
        for uri in ["/api", "/api/"] {
            let response = server()
                .router()
                .oneshot(Request::builder().method("OPTIONS").uri(uri).body(Body::empty()).unwrap())
                .await
                .unwrap();
            assert_eq!(response.status(), StatusCode::NO_CONTENT, "uri {uri}");
        }
    }

    #[tokio::test]
    async fn request_id_is_echoed() {
        let response = server()
            .router()
            .oneshot(Request::builder().method("OPTIONS").uri("/api/x").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert!(response.headers().contains_key(X_REQUEST_ID));

        let response = server()
            .router()
            .oneshot(
                Request::builder()
                    .method("OPTIONS")
                    .uri("/api/x")
                    .header(X_REQUEST_ID, "client-id")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.headers()[X_REQUEST_ID], "client-id");
    }

    #[test]
    fn invalid_config_is_rejected() {
        let mut config = AdapterConfig::default();
        config.upstream.origin = "nope".into();
        assert!(matches!(AdapterServer::new(config), Err(AdapterError::Config(_))));
    }
}
