//! Shared utilities for integration testing.

#![allow(dead_code)]

use std::net::SocketAddr;
use std::sync::{Arc, Mutex};

use axum::body::{Body, Bytes};
use axum::extract::State;
use axum::http::{HeaderMap, Request, StatusCode};
use axum::response::Response;
use axum::Router;
use edge_adapter::config::{AdapterConfig, RouteConfig, TransformKind};
use edge_adapter::{AdapterServer, Shutdown};
use tokio::net::TcpListener;
use tower_http::compression::CompressionLayer;

pub const PRODUCTS_BODY: &str = r#"{"items":[{"name":"Widget","image_url":"x.png"}]}"#;
pub const PRODUCT_ARRAY_BODY: &str = r#"[{"title":"A"}]"#;
pub const TRUNCATED_BODY: &str = r#"{"items":[{"name":"Wid"#;
pub const STATS_BODY: &str = r#"{"items":[{"name":"not a product"}],"total":1}"#;

/// What a current browser advertises.
pub const BROWSER_ACCEPT_ENCODING: &str = "gzip, deflate, br, zstd";

/// A request as the upstream saw it.
#[derive(Debug, Clone)]
pub struct Recorded {
    pub method: String,
    pub uri: String,
    pub headers: HeaderMap,
    pub body: Bytes,
}

/// Upstream stand-in that records every request it receives.
#[derive(Clone)]
pub struct MockUpstream {
    pub addr: SocketAddr,
    requests: Arc<Mutex<Vec<Recorded>>>,
}

impl MockUpstream {
    pub fn origin(&self) -> String {
        format!("http://{}", self.addr)
    }

    pub fn requests(&self) -> Vec<Recorded> {
        self.requests.lock().unwrap().clone()
    }

    pub fn last(&self) -> Recorded {
        self.requests().pop().expect("upstream saw no request")
    }
}

/// Start the mock upstream on an ephemeral port.
///
/// Bodies above the compression threshold are gzipped whenever the request
/// accepts gzip, as a CDN in front of the real upstream would.
pub async fn start_mock_upstream() -> MockUpstream {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let requests = Arc::new(Mutex::new(Vec::new()));

    let app = Router::new()
        .fallback(respond)
        .with_state(requests.clone())
        .layer(CompressionLayer::new());
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    MockUpstream { addr, requests }
}

async fn respond(
    State(requests): State<Arc<Mutex<Vec<Recorded>>>>,
    request: Request<Body>,
) -> Response {
    let (parts, body) = request.into_parts();
    let body = axum::body::to_bytes(body, usize::MAX).await.unwrap();
    let path = parts.uri.path().to_string();
    requests.lock().unwrap().push(Recorded {
        method: parts.method.to_string(),
        uri: parts.uri.to_string(),
        headers: parts.headers,
        body,
    });

    let json = "application/json";
    match path.as_str() {
        "/api/products" => reply(StatusCode::OK, json, PRODUCTS_BODY),
        "/api/products/123" => reply(StatusCode::OK, json, PRODUCT_ARRAY_BODY),
        "/api/products/broken" => reply(StatusCode::OK, json, TRUNCATED_BODY),
        "/api/products/missing" => reply(StatusCode::NOT_FOUND, json, PRODUCTS_BODY),
        "/api/products/page" => reply(StatusCode::OK, "text/html", "<p>products</p>"),
        "/api/stats" => reply(StatusCode::OK, json, STATS_BODY),
        "/api/old" => Response::builder()
            .status(StatusCode::FOUND)
            .header("location", "/api/stats")
            .body(Body::empty())
            .unwrap(),
        "/api/cors" => Response::builder()
            .status(StatusCode::ACCEPTED)
            .header("content-type", "text/plain")
            .header("access-control-allow-origin", "https://upstream.example")
            .header("vary", "Accept-Encoding")
            .header("x-upstream", "yes")
            .body(Body::from("upstream cors"))
            .unwrap(),
        _ => reply(StatusCode::OK, "text/plain", "echo"),
    }
}

fn reply(status: StatusCode, content_type: &str, body: &'static str) -> Response {
    Response::builder()
        .status(status)
        .header("content-type", content_type)
        .body(Body::from(body))
        .unwrap()
}

/// Adapter config pointed at `upstream`, with the products envelope enabled.
pub fn adapter_config(upstream: &MockUpstream) -> AdapterConfig {
    let mut config = AdapterConfig::default();
    config.upstream.origin = upstream.origin();
    config.routes.push(RouteConfig {
        name: "products".into(),
        path: "products".into(),
        transform: TransformKind::ProductEnvelope,
    });
    config
}

/// A running adapter; shuts down when dropped.
pub struct RunningAdapter {
    pub addr: SocketAddr,
    shutdown: Shutdown,
}

impl RunningAdapter {
    pub fn url(&self, path: &str) -> String {
        format!("http://{}{}", self.addr, path)
    }
}

impl Drop for RunningAdapter {
    fn drop(&mut self) {
        self.shutdown.trigger();
    }
}

pub async fn start_adapter(config: AdapterConfig) -> RunningAdapter {
    let server = AdapterServer::new(config).unwrap();
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let shutdown = Shutdown::new();
    let server_shutdown = shutdown.subscribe();

    tokio::spawn(async move {
        let _ = server.run(listener, server_shutdown).await;
    });

    RunningAdapter { addr, shutdown }
}

/// Client that sees adapter responses exactly as sent, redirects and
/// encodings included.
pub fn client() -> reqwest::Client {
    reqwest::Client::builder()
        .no_proxy()
        .no_gzip()
        .no_brotli()
        .no_deflate()
        .redirect(reqwest::redirect::Policy::none())
        .build()
        .unwrap()
}
