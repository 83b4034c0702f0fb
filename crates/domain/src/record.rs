//! Student result records and their invariants.

use crate::catalog;
use crate::primitives::{NameKey, PrimitiveError, SubjectCode, Usn};
use results_portal_shared::{ErrorCode, ErrorEnvelope};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Letter grade on the university's ten-point scale.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Grade {
    /// Outstanding (90-100).
    S,
    /// Excellent (80-89).
    A,
    /// Very good (70-79).
    B,
    /// Good (60-69).
    C,
    /// Above average (50-59).
    D,
    /// Average (40-49).
    E,
    /// Fail (below 40).
    F,
}

impl Grade {
    /// Derive the grade band for a subject score.
    ///
    /// ```
    /// use results_portal_domain::Grade;
    ///
    /// assert_eq!(Grade::from_marks(90), Grade::S);
    /// assert_eq!(Grade::from_marks(59), Grade::D);
    /// assert_eq!(Grade::from_marks(39), Grade::F);
    /// ```
    #[must_use]
    pub const fn from_marks(marks: u8) -> Self {
        match marks {
            90.. => Self::S,
            80..=89 => Self::A,
            70..=79 => Self::B,
            60..=69 => Self::C,
            50..=59 => Self::D,
            40..=49 => Self::E,
            _ => Self::F,
        }
    }

    /// Single-letter label.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::S => "S",
            Self::A => "A",
            Self::B => "B",
            Self::C => "C",
            Self::D => "D",
            Self::E => "E",
            Self::F => "F",
        }
    }
}

impl fmt::Display for Grade {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter.write_str(self.as_str())
    }
}

/// Pass/fail outcome as published by the examination board.
///
/// This comes from the source data and is not derived from marks: a subject
/// can carry a passing grade band and still be marked `Fail` (for example
/// when the internal assessment component was not cleared).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SubjectStatus {
    /// Subject cleared.
    Pass,
    /// Subject not cleared.
    Fail,
}

impl SubjectStatus {
    /// Label used on the wire and in CSV exports.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Pass => "Pass",
            Self::Fail => "Fail",
        }
    }

    /// Default status for a grade when the source omits it.
    #[must_use]
    pub const fn from_grade(grade: Grade) -> Self {
        match grade {
            Grade::F => Self::Fail,
            _ => Self::Pass,
        }
    }
}

impl fmt::Display for SubjectStatus {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter.write_str(self.as_str())
    }
}

/// A single subject line on a result sheet.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubjectResult {
    /// Course code.
    pub code: SubjectCode,
    /// Display name.
    pub subject: Box<str>,
    /// Score out of 100.
    pub marks: u8,
    /// Grade band derived from `marks`.
    pub grade: Grade,
    /// Published outcome.
    pub status: SubjectStatus,
}

impl SubjectResult {
    /// Build a subject line, naming it from the catalog and deriving the grade.
    #[must_use]
    pub fn new(code: SubjectCode, marks: u8, status: SubjectStatus) -> Self {
        let subject = catalog::display_name(code.as_str())
            .to_owned()
            .into_boxed_str();
        Self {
            code,
            subject,
            marks,
            grade: Grade::from_marks(marks),
            status,
        }
    }

    /// Override the display name.
    #[must_use]
    pub fn with_subject_name(mut self, subject: impl AsRef<str>) -> Self {
        self.subject = subject.as_ref().trim().to_owned().into_boxed_str();
        self
    }
}

/// One student's published result.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StudentRecord {
    /// University seat number.
    pub usn: Usn,
    /// Name as printed on the result sheet.
    pub full_name: Box<str>,
    /// Sum of subject marks.
    pub total_marks: u32,
    /// Aggregate percentage (0-100).
    pub percentage: f64,
    /// Semester grade point average (0-10).
    pub sgpa: f64,
    /// Subject lines in sheet order.
    pub subjects: Vec<SubjectResult>,
    /// Section label.
    #[serde(rename = "class", default, skip_serializing_if = "Option::is_none")]
    pub section: Option<Box<str>>,
    /// Rank within the section.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub class_rank: Option<u32>,
    /// Rank within the college.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub college_rank: Option<u32>,
    /// Link to the scanned marks card.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pdf_link: Option<Box<str>>,
}

impl StudentRecord {
    /// Lookup key for the student's full name.
    pub fn name_key(&self) -> Result<NameKey, PrimitiveError> {
        NameKey::parse(self.full_name.as_ref())
    }

    /// Number of subject lines.
    #[must_use]
    pub fn subjects_count(&self) -> usize {
        self.subjects.len()
    }

    /// Validate record invariants.
    pub fn validate(&self) -> Result<(), RecordError> {
        let usn = || self.usn.to_string();

        if self.full_name.trim().is_empty() {
            return Err(RecordError::EmptyFullName { usn: usn() });
        }
        if self.subjects.is_empty() {
            return Err(RecordError::NoSubjects { usn: usn() });
        }
        if !(0.0..=100.0).contains(&self.percentage) {
            return Err(RecordError::PercentageOutOfRange {
                usn: usn(),
                percentage: self.percentage,
            });
        }
        if !(0.0..=10.0).contains(&self.sgpa) {
            return Err(RecordError::SgpaOutOfRange {
                usn: usn(),
                sgpa: self.sgpa,
            });
        }

        for subject in &self.subjects {
            if subject.marks > 100 {
                return Err(RecordError::MarksOutOfRange {
                    usn: usn(),
                    code: subject.code.to_string(),
                    marks: subject.marks,
                });
            }
            let expected = Grade::from_marks(subject.marks);
            if subject.grade != expected {
                return Err(RecordError::GradeMismatch {
                    usn: usn(),
                    code: subject.code.to_string(),
                    grade: subject.grade,
                    expected,
                });
            }
        }

        Ok(())
    }
}

/// Invariant violations on a student record.
#[derive(Debug, Clone, PartialEq)]
pub enum RecordError {
    /// Full name is blank.
    EmptyFullName {
        /// Record USN.
        usn: String,
    },
    /// Record has no subject lines.
    NoSubjects {
        /// Record USN.
        usn: String,
    },
    /// Percentage is outside 0-100 or not finite.
    PercentageOutOfRange {
        /// Record USN.
        usn: String,
        /// Offending value.
        percentage: f64,
    },
    /// SGPA is outside 0-10 or not finite.
    SgpaOutOfRange {
        /// Record USN.
        usn: String,
        /// Offending value.
        sgpa: f64,
    },
    /// Subject marks above 100.
    MarksOutOfRange {
        /// Record USN.
        usn: String,
        /// Subject code.
        code: String,
        /// Offending value.
        marks: u8,
    },
    /// Stored grade disagrees with the grade band for the marks.
    GradeMismatch {
        /// Record USN.
        usn: String,
        /// Subject code.
        code: String,
        /// Stored grade.
        grade: Grade,
        /// Grade derived from marks.
        expected: Grade,
    },
}

impl RecordError {
    /// USN of the offending record.
    #[must_use]
    pub fn usn(&self) -> &str {
        match self {
            Self::EmptyFullName { usn }
            | Self::NoSubjects { usn }
            | Self::PercentageOutOfRange { usn, .. }
            | Self::SgpaOutOfRange { usn, .. }
            | Self::MarksOutOfRange { usn, .. }
            | Self::GradeMismatch { usn, .. } => usn,
        }
    }
}

impl fmt::Display for RecordError {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::EmptyFullName { .. } => formatter.write_str("fullName must be non-empty"),
            Self::NoSubjects { .. } => formatter.write_str("subjects must be non-empty"),
            Self::PercentageOutOfRange { percentage, .. } => {
                write!(formatter, "percentage must be within 0-100 (got {percentage})")
            },
            Self::SgpaOutOfRange { sgpa, .. } => {
                write!(formatter, "sgpa must be within 0-10 (got {sgpa})")
            },
            Self::MarksOutOfRange { code, marks, .. } => {
                write!(formatter, "marks for {code} must be within 0-100 (got {marks})")
            },
            Self::GradeMismatch {
                code,
                grade,
                expected,
                ..
            } => write!(
                formatter,
                "grade for {code} is {grade} but marks map to {expected}"
            ),
        }
    }
}

impl std::error::Error for RecordError {}

impl From<RecordError> for ErrorEnvelope {
    fn from(error: RecordError) -> Self {
        let envelope = Self::invariant(
            ErrorCode::new("domain", "invalid_record"),
            error.to_string(),
        )
        .with_metadata("record_usn", error.usn());

        match error {
            RecordError::MarksOutOfRange { code, .. } | RecordError::GradeMismatch { code, .. } => {
                envelope.with_metadata("subject_code", code)
            },
            RecordError::EmptyFullName { .. }
            | RecordError::NoSubjects { .. }
            | RecordError::PercentageOutOfRange { .. }
            | RecordError::SgpaOutOfRange { .. } => envelope,
        }
    }
}
