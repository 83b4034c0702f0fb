//! Records compiled into the binary.

use super::{DatasetError, parse_json_dataset};
use results_portal_domain::StudentRecord;

/// First-semester results for section A, in the JSON dataset format.
pub const BUILTIN_DATASET_JSON: &str = include_str!("builtin.json");

/// Parse the built-in records.
pub fn builtin_records() -> Result<Vec<StudentRecord>, DatasetError> {
    parse_json_dataset(BUILTIN_DATASET_JSON)
}
