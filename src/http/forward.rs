//! Upstream forwarding.
//!
//! # Responsibilities
//! - Rewrite the inbound request onto the upstream base
//! - Mirror method, headers (minus `Host`) and body (absent for GET/HEAD)
//! - Follow redirects; never time out or retry
//! - Decode compressed upstream bodies before they reach a transform
//! - Connect directly; `HTTP_PROXY` and friends are ignored
//! - Stream the upstream response back, or run the route's transform
//!
//! # Design Decisions
//! - Inbound bodies are buffered up to the configured limit, so the
//!   framing headers are dropped and recomputed by the client
//! - The inbound `Accept-Encoding` is replaced by the client's own, so the
//!   upstream only picks encodings the client can decode. Decoded responses
//!   lose `Content-Encoding` and `Content-Length`
//! - A transform only sees 2xx responses with a content type it accepts
//! - Transform failure falls back to the original bytes, status and headers

use axum::body::Body;
use axum::http::header::{
    ACCEPT_ENCODING, CONTENT_LENGTH, CONTENT_TYPE, HOST, TRANSFER_ENCODING,
};
use axum::http::{HeaderMap, Method, Request, StatusCode};
use axum::response::Response;
use http_body_util::LengthLimitError;
use reqwest::redirect::Policy;

use crate::error::{AdapterError, AdapterResult};
use crate::routing::{PathCapture, UpstreamBase};
use crate::transform::TransformTable;

/// Redirect hops followed before giving up, as browsers do for `fetch`.
const MAX_REDIRECTS: usize = 20;

/// How a forwarded response was produced.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    /// Upstream body streamed through unchanged.
    Passthrough,
    /// Body rewritten by a route transform.
    Normalized,
    /// A transform applied but declined; original bytes returned.
    Fallback,
}

impl Outcome {
    pub fn as_str(&self) -> &'static str {
        match self {
            Outcome::Passthrough => "passthrough",
            Outcome::Normalized => "normalized",
            Outcome::Fallback => "fallback",
        }
    }
}

/// A response produced by the upstream, before CORS is applied.
#[derive(Debug)]
pub struct Forwarded {
    pub response: Response,
    pub outcome: Outcome,
}

/// Forwards requests to the single configured upstream.
#[derive(Debug)]
pub struct Forwarder {
    client: reqwest::Client,
    upstream: UpstreamBase,
    transforms: TransformTable,
    max_body_size: usize,
}

impl Forwarder {
    pub fn new(
        upstream: UpstreamBase,
        transforms: TransformTable,
        max_body_size: usize,
    ) -> AdapterResult<Self> {
        let client = reqwest::Client::builder()
            .redirect(Policy::limited(MAX_REDIRECTS))
            .no_proxy()
            .build()
            .map_err(AdapterError::Client)?;

        Ok(Self {
            client,
            upstream,
            transforms,
            max_body_size,
        })
    }

    /// Forward one request and build the client response.
    pub async fn forward(
        &self,
        request: Request<Body>,
        capture: &PathCapture,
    ) -> AdapterResult<Forwarded> {
        let (parts, body) = request.into_parts();
        let remainder = capture.remainder();
        let target = self.upstream.resolve(&remainder, parts.uri.query());

        let mut headers = parts.headers;
        strip_request_headers(&mut headers);

        let mut outbound = self.client.request(parts.method.clone(), &target).headers(headers);
        if carries_body(&parts.method) {
            outbound = outbound.body(self.read_body(body).await?);
        }

        tracing::debug!(method = %parts.method, upstream = %target, "Forwarding to upstream");
        let upstream = outbound.send().await.map_err(AdapterError::Upstream)?;

        let status = upstream.status();
        let mut headers = upstream.headers().clone();
        let content_type = headers
            .get(CONTENT_TYPE)
            .and_then(|value| value.to_str().ok())
            .unwrap_or_default();

        let route = self
            .transforms
            .find(&remainder)
            .filter(|route| status.is_success() && route.transform().accepts(content_type));

        let Some(route) = route else {
            let body = Body::from_stream(upstream.bytes_stream());
            return Ok(Forwarded {
                response: build_response(status, headers, body),
                outcome: Outcome::Passthrough,
            });
        };

        let transform = route.transform();
        let original = upstream.bytes().await.map_err(AdapterError::Upstream)?;
        match transform.transform(&original) {
            Ok(rewritten) => {
                headers.insert(CONTENT_TYPE, transform.content_type());
                headers.remove(CONTENT_LENGTH);
                headers.remove(TRANSFER_ENCODING);
                Ok(Forwarded {
                    response: build_response(status, headers, Body::from(rewritten)),
                    outcome: Outcome::Normalized,
                })
            }
            Err(err) => {
                tracing::warn!(
                    route = %route.name,
                    transform = transform.name(),
                    error = %err,
                    "Transform declined, passing upstream body through"
                );
                Ok(Forwarded {
                    response: build_response(status, headers, Body::from(original)),
                    outcome: Outcome::Fallback,
                })
            }
        }
    }

    async fn read_body(&self, body: Body) -> AdapterResult<bytes::Bytes> {
        axum::body::to_bytes(body, self.max_body_size)
            .await
            .map_err(|err| {
                let inner = err.into_inner();
                if inner.is::<LengthLimitError>() {
                    AdapterError::BodyTooLarge {
                        limit: self.max_body_size,
                    }
                } else {
                    AdapterError::Body(axum::Error::new(inner))
                }
            })
    }
}

/// GET and HEAD never carry a body upstream.
pub fn carries_body(method: &Method) -> bool {
    !matches!(*method, Method::GET | Method::HEAD)
}

/// Drop `Host`, the inbound body framing and the client's accepted encodings.
fn strip_request_headers(headers: &mut HeaderMap) {
    headers.remove(HOST);
    headers.remove(ACCEPT_ENCODING);
    headers.remove(CONTENT_LENGTH);
    headers.remove(TRANSFER_ENCODING);
}

fn build_response(status: StatusCode, headers: HeaderMap, body: Body) -> Response {
    let mut response = Response::new(body);
    *response.status_mut() = status;
    *response.headers_mut() = headers;
    response
}
