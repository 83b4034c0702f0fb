//! # results-portal-adapters
//!
//! Adapter implementations for ports (student directories, logging, probe
//! transport, PDF rendering). This crate depends on `ports`, `domain`, and `shared`.

/// Dataset parsers for built-in, JSON, and CSV sources.
pub mod dataset;

pub mod directory;
pub mod file_directory;
pub mod logger;
pub mod pdf_sheet;
pub mod probe_http;

pub use dataset::{DatasetError, DatasetLocation, LocatedRecord, parse_dataset};
pub use directory::{DirectoryIndex, InMemoryStudentDirectory};
pub use file_directory::FileStudentDirectory;
pub use logger::TracingLogger;
pub use pdf_sheet::LopdfSheetRenderer;
pub use probe_http::ReqwestProbeTransport;

/// Returns the adapters crate version.
#[must_use]
pub const fn adapters_crate_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
