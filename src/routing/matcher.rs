//! Route matching logic.
//!
//! # Responsibilities
//! - Match the captured remainder against a route family
//!
//! # Design Decisions
//! - Path matching is case-sensitive
//! - Matching is segment-aware: "products" matches "products/1" but not
//!   "productsX"
//! - No regex to guarantee O(n) matching

/// Trait for matching a captured remainder against a route family.
pub trait Matcher: Send + Sync + std::fmt::Debug {
    /// Returns true if the remainder belongs to this family.
    fn matches(&self, remainder: &str) -> bool;
}

/// Matches a leading segment prefix: `^<prefix>(/|$)`.
#[derive(Debug, Clone)]
pub struct SegmentPrefixMatcher {
    prefix: String,
}

impl SegmentPrefixMatcher {
    pub fn new(prefix: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
        }
    }
}

impl Matcher for SegmentPrefixMatcher {
    fn matches(&self, remainder: &str) -> bool {
        match remainder.strip_prefix(self.prefix.as_str()) {
            Some(rest) => rest.is_empty() || rest.starts_with('/'),
            None => false,
        }
    }
}
