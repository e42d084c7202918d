//! Inbound path capture and upstream URL rewriting.
//!
//! # Responsibilities
//! - Capture the path remainder below the mount prefix
//! - Normalize wildcard and segment-array captures to one remainder string
//! - Build the upstream URL from the configured base and the raw query
//!
//! # Design Decisions
//! - Operates on the raw, still percent-encoded request path
//! - No escaping, validation or traversal checks: `..` segments reach the
//!   HTTP client untouched, which resolves them like any URL parser would
//! - Pure functions: the same path and query always yield the same target

use std::borrow::Cow;

use crate::config::UpstreamConfig;

/// The part of the inbound path captured below the mount prefix.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PathCapture {
    /// A single catch-all remainder, absent for requests to the bare prefix.
    Wildcard(Option<String>),
    /// The remainder split into path segments.
    Segments(Vec<String>),
}

impl PathCapture {
    /// Capture the remainder of `path` below `mount`.
    ///
    /// A path outside the mount is captured whole.
    pub fn from_request_path(mount: &str, path: &str) -> Self {
        let rest = path.strip_prefix(mount).unwrap_or(path);
        let rest = rest.strip_prefix('/').unwrap_or(rest);
        if rest.is_empty() {
            PathCapture::Wildcard(None)
        } else {
            PathCapture::Wildcard(Some(rest.to_string()))
        }
    }

    /// Capture from pre-split segments, for hosts that hand the catch-all
    /// over as an array rather than one string.
    pub fn from_segments<I, S>(segments: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        PathCapture::Segments(segments.into_iter().map(Into::into).collect())
    }

    /// The joined remainder, e.g. "products" or "stats/summary".
    pub fn remainder(&self) -> Cow<'_, str> {
        match self {
            PathCapture::Wildcard(Some(rest)) => Cow::Borrowed(rest),
            PathCapture::Wildcard(None) => Cow::Borrowed(""),
            PathCapture::Segments(segments) => Cow::Owned(segments.join("/")),
        }
    }
}

/// Fixed upstream base every remainder is appended to.
#[derive(Debug, Clone)]
pub struct UpstreamBase {
    origin: String,
    base_path: String,
}

impl UpstreamBase {
    pub fn new(origin: impl Into<String>, base_path: impl Into<String>) -> Self {
        Self {
            origin: origin.into(),
            base_path: base_path.into(),
        }
    }

    pub fn from_config(config: &UpstreamConfig) -> Self {
        Self::new(config.origin.clone(), config.base_path.clone())
    }

    /// `<origin><base_path><remainder>[?<query>]`.
    ///
    /// An empty query is dropped, so `/api/x?` forwards as `/api/x`.
    pub fn resolve(&self, remainder: &str, query: Option<&str>) -> String {
        let mut url = String::with_capacity(
            self.origin.len() + self.base_path.len() + remainder.len() + query.map_or(0, |q| q.len() + 1),
        );
        url.push_str(&self.origin);
        url.push_str(&self.base_path);
        url.push_str(remainder);
        if let Some(query) = query.filter(|q| !q.is_empty()) {
            url.push('?');
            url.push_str(query);
        }
        url
    }
}
