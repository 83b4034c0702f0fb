//! # results-portal-ports
//!
//! Port traits for the results-portal hexagonal architecture.
//!
//! This crate defines the interfaces between the domain and infrastructure
//! layers. It depends only on `domain` and `shared`.

use std::future::Future;
use std::pin::Pin;

/// Boxed future used by port traits.
///
/// Directory lookups and probe requests are I/O-bound, so the allocation per
/// call is negligible.
pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

/// Returns the ports crate version.
#[must_use]
pub const fn ports_crate_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

pub mod directory;
pub mod export;
pub mod logger;
pub mod probe;

pub use directory::*;
pub use export::*;
pub use logger::*;
pub use probe::*;

// Re-export selected domain types used in port signatures, so adapter crates
// can implement ports without directly depending on `results-portal-domain`.
pub use results_portal_domain::{NameKey, ResultSheet, StudentRecord, Usn};
