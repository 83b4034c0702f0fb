//! # results-portal-shared
//!
//! Shared result types, error handling, and request context for the
//! results-portal workspace.
//!
//! This crate provides foundational types that are used across all other crates:
//!
//! - Result and error envelope types
//! - Request context (correlation id + cancellation)
//! - Redaction helpers for secrets and student identifiers
//!
//! ## Design Principles
//!
//! 1. **No workspace dependencies** - This crate only depends on external crates
//! 2. **Serde-compatible** - Error envelopes round-trip through JSON

#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]

// =============================================================================
// RESULT + ERROR ENVELOPE
// =============================================================================

pub mod concurrency;
pub mod errors;
pub mod redaction;
pub mod result;

pub use concurrency::{CorrelationId, RequestContext};
pub use errors::{
    ErrorClass, ErrorCode, ErrorEnvelope, ErrorKind, ErrorMetadata, REDACTED_VALUE,
    redact_metadata,
};
pub use redaction::{REDACTED, is_identifier_key, is_secret_key, redact_if_sensitive};
pub use result::Result;

/// Returns the shared crate version.
#[must_use]
pub const fn shared_crate_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

// =============================================================================
// TESTS
// =============================================================================
