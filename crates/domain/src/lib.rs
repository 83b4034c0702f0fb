//! # results-portal-domain
//!
//! Domain entities, primitives, and value objects for student result lookup.
//!
//! This crate contains the core domain model with no infrastructure dependencies:
//!
//! - **Primitives** - `Usn`, `NameKey`, `SubjectCode`
//! - **Records** - `StudentRecord`, `SubjectResult`, `Grade`, `SubjectStatus`
//! - **Catalog** - course code to display name mapping
//! - **Queries** - `LookupQuery` and its resolution into `LookupCriteria`
//! - **Export** - result-sheet export options and CSV rendering
//! - **Sheet** - printable result-sheet layout and pagination
//!
//! ## Dependency Rules
//!
//! - Depends only on `shared` crate
//! - No infrastructure or adapter dependencies
//! - Pure domain logic with no I/O

#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]

// Re-export shared types for convenience
pub use results_portal_shared::shared_crate_version;

// =============================================================================
// DOMAIN MODULES
// =============================================================================

pub mod catalog;
pub mod export;
pub mod primitives;
pub mod query;
pub mod record;
pub mod sheet;

pub use catalog::{display_name, subject_name};
pub use export::{ExportField, ExportFormat, ExportOptions, ExportOptionsError};
pub use primitives::{MAX_USN_CHARS, NameKey, PrimitiveError, SubjectCode, Usn};
pub use query::{LookupCriteria, LookupQuery, LookupRejection};
pub use record::{Grade, RecordError, StudentRecord, SubjectResult, SubjectStatus};
pub use sheet::{PlacedLine, ResultSheet, SheetLine, SheetTone};

/// Returns the domain crate version.
#[must_use]
pub const fn domain_crate_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

// =============================================================================
// TESTS
// =============================================================================
