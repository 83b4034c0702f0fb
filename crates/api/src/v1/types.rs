//! API v1 DTO types.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Query parameters accepted by `/api/validate`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct ApiV1LookupQueryDto {
    /// Seat number, any case.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub usn: Option<String>,
    /// Full name, any case and spacing.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub full_name: Option<String>,
}

/// Query parameters accepted by `/api/download`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct ApiV1DownloadQueryDto {
    /// Seat number, any case.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub usn: Option<String>,
    /// Full name, any case and spacing.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub full_name: Option<String>,
    /// Export format (`pdf` or `csv`).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub format: Option<String>,
    /// Compact layout flag (`1`, `true`, `yes`).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub compact: Option<String>,
    /// Gzip the response body (`1`, `true`, `yes`, `gzip`).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub compress: Option<String>,
    /// Comma-separated column list.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fields: Option<String>,
}

/// One subject line on the wire.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct ApiV1SubjectDto {
    /// Course code.
    pub code: String,
    /// Display name.
    pub subject: String,
    /// Score out of 100.
    pub marks: u8,
    /// Grade band.
    pub grade: String,
    /// `Pass` or `Fail`.
    pub status: String,
}

/// A student result on the wire.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct ApiV1StudentDto {
    /// Seat number.
    pub usn: String,
    /// Name as printed on the result sheet.
    pub full_name: String,
    /// Sum of subject marks.
    pub total_marks: u32,
    /// Percentage (0-100).
    pub percentage: f64,
    /// Semester grade point average (0-10).
    pub sgpa: f64,
    /// Subject lines, in result-sheet order.
    pub subjects: Vec<ApiV1SubjectDto>,
    /// Section label.
    #[serde(rename = "class", default, skip_serializing_if = "Option::is_none")]
    pub section: Option<String>,
    /// Rank within the section.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub class_rank: Option<u32>,
    /// Rank within the college.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub college_rank: Option<u32>,
    /// Link to the published result sheet.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pdf_link: Option<String>,
}

/// `/api/validate` response body.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(untagged)]
pub enum ApiV1LookupResponse {
    /// Lookup matched a record.
    Found {
        /// Always `true`.
        ok: bool,
        /// Matched record.
        student: ApiV1StudentDto,
    },
    /// Lookup failed.
    Rejected {
        /// Always `false`.
        ok: bool,
        /// Public error message.
        error: String,
    },
}

impl ApiV1LookupResponse {
    /// Build a success body.
    #[must_use]
    pub const fn found(student: ApiV1StudentDto) -> Self {
        Self::Found { ok: true, student }
    }

    /// Build a failure body.
    #[must_use]
    pub fn rejected(error: impl Into<String>) -> Self {
        Self::Rejected {
            ok: false,
            error: error.into(),
        }
    }

    /// Value of the `ok` flag.
    #[must_use]
    pub const fn is_ok(&self) -> bool {
        match self {
            Self::Found { ok, .. } | Self::Rejected { ok, .. } => *ok,
        }
    }
}

/// `/api/students` failure body.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct ApiV1StudentsErrorDto {
    /// Public error message.
    pub error: String,
}

/// Summary of the first record, reported by `/api/test-data`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct ApiV1SampleStudentDto {
    /// Seat number.
    pub usn: String,
    /// Full name.
    pub name: String,
    /// Number of subject lines.
    pub subjects_count: usize,
}

/// `/api/test-data` response body.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(untagged)]
pub enum ApiV1DiagnosticsResponse {
    /// Dataset loaded.
    Loaded {
        /// Always `true`.
        success: bool,
        /// Number of records.
        #[serde(rename = "studentsCount")]
        students_count: usize,
        /// Load duration, e.g. `3ms`.
        #[serde(rename = "loadTime")]
        load_time: String,
        /// Deployment label.
        environment: String,
        /// Response time, epoch milliseconds.
        #[serde(rename = "timestampMs")]
        timestamp_ms: u64,
        /// Dataset label, e.g. `builtin` or `csv-file:/srv/results.csv`.
        #[serde(rename = "datasetSource")]
        dataset_source: String,
        /// First record, if any.
        #[serde(rename = "sampleStudent")]
        sample_student: Option<ApiV1SampleStudentDto>,
    },
    /// Dataset failed to load.
    Failed {
        /// Always `false`.
        success: bool,
        /// Public error message.
        error: String,
        /// Deployment label.
        environment: String,
        /// Response time, epoch milliseconds.
        #[serde(rename = "timestampMs")]
        timestamp_ms: u64,
    },
}

/// `/healthz` response body.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct ApiV1HealthDto {
    /// `ok` or `error`.
    pub status: String,
    /// Number of records, when the directory is readable.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub students_count: Option<usize>,
}
