//! Routing subsystem.
//!
//! # Data Flow
//! ```text
//! Incoming Request (raw path, query)
//!     → rewrite.rs (capture remainder, build upstream URL)
//!     → matcher.rs (decide which route family the remainder belongs to)
//! ```
//!
//! # Design Decisions
//! - A single upstream: routing never selects a backend, only a transform
//! - Deterministic: same input always yields the same target
//! - First match wins (ordered as configured)

pub mod matcher;
pub mod rewrite;

pub use matcher::{Matcher, SegmentPrefixMatcher};
pub use rewrite::{PathCapture, UpstreamBase};
