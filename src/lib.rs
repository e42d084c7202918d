//! Edge API adapter.
//!
//! Forwards browser API calls under a mount prefix to one upstream origin,
//! stamps CORS headers on every response and optionally reshapes the JSON
//! payload of configured route families.

pub mod config;
pub mod error;
pub mod http;
pub mod lifecycle;
pub mod observability;
pub mod routing;
pub mod transform;

pub use config::schema::AdapterConfig;
pub use error::{AdapterError, AdapterResult};
pub use http::AdapterServer;
pub use lifecycle::Shutdown;
