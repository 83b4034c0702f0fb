//! Student directory boundary contract.

use crate::BoxFuture;
use results_portal_domain::{NameKey, StudentRecord, Usn};
use results_portal_shared::{RequestContext, Result};
use std::fmt;
use std::sync::Arc;

/// Where a directory's records come from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DatasetKind {
    /// Records compiled into the binary.
    Builtin,
    /// JSON array file.
    JsonFile,
    /// CSV export file.
    CsvFile,
}

impl DatasetKind {
    /// Stable label used in diagnostics.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Builtin => "builtin",
            Self::JsonFile => "json-file",
            Self::CsvFile => "csv-file",
        }
    }
}

impl fmt::Display for DatasetKind {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter.write_str(self.as_str())
    }
}

/// Directory descriptor.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DirectoryInfo {
    /// Dataset kind.
    pub kind: DatasetKind,
    /// Human-readable location (file path), if any.
    pub location: Option<Box<str>>,
}

impl DirectoryInfo {
    /// Descriptor for the compiled-in dataset.
    #[must_use]
    pub const fn builtin() -> Self {
        Self {
            kind: DatasetKind::Builtin,
            location: None,
        }
    }

    /// Label combining kind and location, e.g. `csv-file:/srv/results.csv`.
    #[must_use]
    pub fn label(&self) -> String {
        match &self.location {
            Some(location) => format!("{}:{location}", self.kind),
            None => self.kind.as_str().to_owned(),
        }
    }
}

/// Shared handle to an immutable record.
pub type StudentHandle = Arc<StudentRecord>;

/// Boundary contract for read-only student record lookup.
///
/// Implementations index records by normalized USN and normalized name.
/// When several records share a name key, `find_by_name` returns the first in
/// dataset order.
pub trait StudentDirectoryPort: Send + Sync {
    /// Descriptor for this directory.
    fn info(&self) -> &DirectoryInfo;

    /// Find the record with the given seat number.
    fn find_by_usn(
        &self,
        ctx: &RequestContext,
        usn: Usn,
    ) -> BoxFuture<'_, Result<Option<StudentHandle>>>;

    /// Find the first record whose name normalizes to `name`.
    fn find_by_name(
        &self,
        ctx: &RequestContext,
        name: NameKey,
    ) -> BoxFuture<'_, Result<Option<StudentHandle>>>;

    /// All records, ordered by seat number.
    fn list_students(&self, ctx: &RequestContext) -> BoxFuture<'_, Result<Vec<StudentHandle>>>;
}
