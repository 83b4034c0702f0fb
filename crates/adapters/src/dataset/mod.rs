//! Student dataset parsers (built-in, JSON, CSV).
//!
//! Parsers produce validated `StudentRecord`s in dataset order. Any malformed
//! value fails the whole load with an error naming the record or line.

mod builtin;
mod csv;
mod json;

pub use builtin::{BUILTIN_DATASET_JSON, builtin_records};
pub use csv::parse_csv_dataset;
pub use json::parse_json_dataset;

use results_portal_domain::{RecordError, StudentRecord};
use results_portal_ports::DatasetKind;
use results_portal_shared::{ErrorClass, ErrorCode, ErrorEnvelope};
use std::fmt;
use thiserror::Error;

/// Where in a dataset a failure occurred (1-based).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DatasetLocation {
    /// Element of a JSON array, or position in dataset order.
    Record(usize),
    /// Physical line of a CSV file.
    Line(usize),
}

impl fmt::Display for DatasetLocation {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Record(position) => write!(formatter, "record {position}"),
            Self::Line(line) => write!(formatter, "line {line}"),
        }
    }
}

/// A parsed record and where it came from.
#[derive(Debug, Clone)]
pub struct LocatedRecord {
    /// Source position.
    pub location: DatasetLocation,
    /// Validated record.
    pub record: StudentRecord,
}

/// Tag records with their 1-based position in dataset order.
pub fn in_dataset_order(records: Vec<StudentRecord>) -> Vec<LocatedRecord> {
    records
        .into_iter()
        .enumerate()
        .map(|(index, record)| LocatedRecord {
            location: DatasetLocation::Record(index + 1),
            record,
        })
        .collect()
}

/// Dataset load failures.
#[derive(Debug, Error)]
pub enum DatasetError {
    /// JSON text could not be decoded.
    #[error("dataset JSON is malformed: {0}")]
    MalformedJson(#[from] serde_json::Error),
    /// CSV text has no header row.
    #[error("dataset CSV has no header row")]
    MissingHeader,
    /// CSV header lacks a required column.
    #[error("dataset CSV is missing column `{column}`")]
    MissingColumn {
        /// Column name.
        column: &'static str,
    },
    /// A value could not be parsed.
    #[error("{location}: invalid {field}: {reason}")]
    InvalidField {
        /// Failing record or line.
        location: DatasetLocation,
        /// Field name.
        field: &'static str,
        /// What was wrong.
        reason: String,
    },
    /// A parsed record broke a record invariant.
    #[error("{location}: {source}")]
    InvalidRecord {
        /// Failing record or line.
        location: DatasetLocation,
        /// Violated invariant.
        source: RecordError,
    },
    /// A seat number appears twice.
    #[error("{location}: seat number already used by an earlier record")]
    DuplicateUsn {
        /// Position of the second occurrence.
        location: DatasetLocation,
    },
    /// The dataset file could not be read.
    #[error("failed to read dataset file: {0}")]
    Io(#[from] std::io::Error),
}

impl DatasetError {
    fn error_code(&self) -> ErrorCode {
        let code = match self {
            Self::MalformedJson(_) => "malformed_json",
            Self::MissingHeader => "missing_header",
            Self::MissingColumn { .. } => "missing_column",
            Self::InvalidField { .. } => "invalid_field",
            Self::InvalidRecord { .. } => "invalid_record",
            Self::DuplicateUsn { .. } => "duplicate_usn",
            Self::Io(_) => "io",
        };
        ErrorCode::new("dataset", code)
    }

    const fn location(&self) -> Option<DatasetLocation> {
        match self {
            Self::InvalidField { location, .. }
            | Self::InvalidRecord { location, .. }
            | Self::DuplicateUsn { location } => Some(*location),
            Self::MalformedJson(_) | Self::MissingHeader | Self::MissingColumn { .. } | Self::Io(_) => {
                None
            },
        }
    }
}

impl From<DatasetError> for ErrorEnvelope {
    fn from(error: DatasetError) -> Self {
        let class = if matches!(error, DatasetError::Io(_)) {
            ErrorClass::Retriable
        } else {
            ErrorClass::NonRetriable
        };
        let mut envelope = Self::unexpected(error.error_code(), error.to_string(), class);
        if let Some(location) = error.location() {
            envelope = envelope.with_metadata("location", location.to_string());
        }
        envelope
    }
}

/// Parse dataset text according to its kind.
///
/// CSV records are located by physical line; the other kinds by position.
pub fn parse_dataset(kind: DatasetKind, text: &str) -> Result<Vec<LocatedRecord>, DatasetError> {
    match kind {
        DatasetKind::Builtin => builtin_records().map(in_dataset_order),
        DatasetKind::JsonFile => parse_json_dataset(text).map(in_dataset_order),
        DatasetKind::CsvFile => csv::parse_csv_rows(text),
    }
}

fn validated(
    record: StudentRecord,
    location: DatasetLocation,
) -> Result<StudentRecord, DatasetError> {
    record
        .validate()
        .map_err(|source| DatasetError::InvalidRecord { location, source })?;
    Ok(record)
}
