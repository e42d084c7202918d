//! HTTP protocol handling subsystem.
//!
//! # Data Flow
//! ```text
//! TCP connection
//!     → server.rs (Axum setup, request ID, tracing)
//!     → cors.rs (OPTIONS answered here with 204)
//!     → forward.rs (rewrite, dispatch, optional transform)
//!     → cors.rs (header set stamped on the response)
//!     → Send to client
//! ```

pub mod cors;
pub mod forward;
pub mod request;
pub mod server;

pub use cors::{CorsHeaders, CorsPolicy};
pub use forward::{Forwarded, Forwarder, Outcome};
pub use request::{UuidRequestId, X_REQUEST_ID};
pub use server::{AdapterServer, AppState};
