//! Configuration management subsystem.
//!
//! # Data Flow
//! ```text
//! adapter.toml + CLI overrides
//!     → loader.rs (parse & deserialize)
//!     → validation.rs (semantic checks)
//!     → AdapterConfig (validated, immutable)
//!     → compiled into AppState at startup
//! ```
//!
//! # Design Decisions
//! - Config is immutable once loaded; the upstream origin is injected here
//!   rather than embedded in the forwarder
//! - All fields have defaults to allow minimal configs
//! - Validation separates syntactic (serde) from semantic checks

pub mod loader;
pub mod schema;
pub mod validation;

pub use loader::{load_config, parse_config, ConfigError};
pub use schema::{
    AdapterConfig, CorsConfig, LimitsConfig, ListenerConfig, LogFormat, ObservabilityConfig,
    RouteConfig, TransformKind, UpstreamConfig,
};
pub use validation::{validate_config, ValidationError};
