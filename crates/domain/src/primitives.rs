//! Domain primitives with validated constructors.
//!
//! Student identifiers are personal data, so validation errors carry input
//! lengths rather than the raw values.

use results_portal_shared::{ErrorCode, ErrorEnvelope};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Longest USN accepted by the parser.
pub const MAX_USN_CHARS: usize = 32;

/// Validation failures for domain primitives.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PrimitiveError {
    /// `Usn` is empty after trimming.
    EmptyUsn {
        /// Length of the raw input before trimming.
        input_length: usize,
    },
    /// `Usn` contains characters other than ASCII letters and digits, or is too long.
    InvalidUsn {
        /// Length of the trimmed input.
        input_length: usize,
    },
    /// `NameKey` is empty after whitespace normalization.
    EmptyName {
        /// Length of the raw input before trimming.
        input_length: usize,
    },
    /// `SubjectCode` is empty after trimming.
    EmptySubjectCode {
        /// Length of the raw input before trimming.
        input_length: usize,
    },
    /// `SubjectCode` contains characters other than ASCII letters and digits.
    InvalidSubjectCode {
        /// Trimmed subject code that failed validation.
        input: String,
    },
}

impl PrimitiveError {
    fn error_code(&self) -> ErrorCode {
        match self {
            Self::EmptyUsn { .. } | Self::InvalidUsn { .. } => {
                ErrorCode::new("domain", "invalid_usn")
            },
            Self::EmptyName { .. } => ErrorCode::new("domain", "invalid_name"),
            Self::EmptySubjectCode { .. } | Self::InvalidSubjectCode { .. } => {
                ErrorCode::new("domain", "invalid_subject_code")
            },
        }
    }
}

impl fmt::Display for PrimitiveError {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::EmptyUsn { .. } => formatter.write_str("USN must be non-empty"),
            Self::InvalidUsn { .. } => write!(
                formatter,
                "USN must be 1-{MAX_USN_CHARS} ASCII letters or digits"
            ),
            Self::EmptyName { .. } => formatter.write_str("full name must be non-empty"),
            Self::EmptySubjectCode { .. } => formatter.write_str("subject code must be non-empty"),
            Self::InvalidSubjectCode { .. } => {
                formatter.write_str("subject code must contain only ASCII letters or digits")
            },
        }
    }
}

impl std::error::Error for PrimitiveError {}

impl From<PrimitiveError> for ErrorEnvelope {
    fn from(error: PrimitiveError) -> Self {
        let envelope = Self::expected(error.error_code(), error.to_string());
        match error {
            PrimitiveError::EmptyUsn { input_length }
            | PrimitiveError::InvalidUsn { input_length }
            | PrimitiveError::EmptyName { input_length }
            | PrimitiveError::EmptySubjectCode { input_length } => {
                envelope.with_metadata("input_length", input_length.to_string())
            },
            PrimitiveError::InvalidSubjectCode { input } => envelope.with_metadata("input", input),
        }
    }
}

/// University seat number: trimmed, uppercased, ASCII alphanumeric.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Usn(Box<str>);

impl Usn {
    /// Parse a `Usn` from user input.
    ///
    /// ```
    /// use results_portal_domain::Usn;
    ///
    /// let usn = Usn::parse("  3vc24cd001 ").map(|usn| usn.to_string());
    /// assert_eq!(usn.ok().as_deref(), Some("3VC24CD001"));
    /// assert!(Usn::parse("3VC24-CD001").is_err());
    /// ```
    pub fn parse(input: impl AsRef<str>) -> Result<Self, PrimitiveError> {
        let raw = input.as_ref();
        let Some(trimmed) = trimmed_non_empty(raw) else {
            return Err(PrimitiveError::EmptyUsn {
                input_length: raw.chars().count(),
            });
        };

        let char_count = trimmed.chars().count();
        if char_count > MAX_USN_CHARS || !trimmed.chars().all(|ch| ch.is_ascii_alphanumeric()) {
            return Err(PrimitiveError::InvalidUsn {
                input_length: char_count,
            });
        }

        Ok(Self(trimmed.to_ascii_uppercase().into_boxed_str()))
    }

    /// Access the underlying string.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Consume and return the underlying string.
    #[must_use]
    pub fn into_inner(self) -> Box<str> {
        self.0
    }
}

impl TryFrom<String> for Usn {
    type Error = PrimitiveError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(value)
    }
}

impl From<Usn> for String {
    fn from(value: Usn) -> Self {
        value.0.into_string()
    }
}

impl AsRef<str> for Usn {
    fn as_ref(&self) -> &str {
        self.as_str()
    }
}

impl fmt::Display for Usn {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter.write_str(self.as_str())
    }
}

/// Normalized lookup key for a student's full name.
///
/// Two names are the same student when their keys are equal: surrounding
/// whitespace is dropped, internal runs collapse to one space, case folds to
/// lowercase.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct NameKey(Box<str>);

impl NameKey {
    /// Normalize a full name into a lookup key.
    ///
    /// ```
    /// use results_portal_domain::NameKey;
    ///
    /// let a = NameKey::parse("A   SAKSHI");
    /// let b = NameKey::parse(" a sakshi\t");
    /// assert_eq!(a, b);
    /// assert!(NameKey::parse(" \n ").is_err());
    /// ```
    pub fn parse(input: impl AsRef<str>) -> Result<Self, PrimitiveError> {
        let raw = input.as_ref();
        let collapsed = raw.split_whitespace().collect::<Vec<_>>().join(" ");
        if collapsed.is_empty() {
            return Err(PrimitiveError::EmptyName {
                input_length: raw.chars().count(),
            });
        }

        Ok(Self(collapsed.to_lowercase().into_boxed_str()))
    }

    /// Access the normalized key.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl AsRef<str> for NameKey {
    fn as_ref(&self) -> &str {
        self.as_str()
    }
}

/// Course code such as `BMATS101`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct SubjectCode(Box<str>);

impl SubjectCode {
    /// Parse a subject code; input is trimmed and uppercased.
    pub fn parse(input: impl AsRef<str>) -> Result<Self, PrimitiveError> {
        let raw = input.as_ref();
        let Some(trimmed) = trimmed_non_empty(raw) else {
            return Err(PrimitiveError::EmptySubjectCode {
                input_length: raw.chars().count(),
            });
        };

        if !trimmed.chars().all(|ch| ch.is_ascii_alphanumeric()) {
            return Err(PrimitiveError::InvalidSubjectCode {
                input: trimmed.to_owned(),
            });
        }

        Ok(Self(trimmed.to_ascii_uppercase().into_boxed_str()))
    }

    /// Access the underlying string.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for SubjectCode {
    type Error = PrimitiveError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(value)
    }
}

impl From<SubjectCode> for String {
    fn from(value: SubjectCode) -> Self {
        value.0.into_string()
    }
}

impl AsRef<str> for SubjectCode {
    fn as_ref(&self) -> &str {
        self.as_str()
    }
}

impl fmt::Display for SubjectCode {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter.write_str(self.as_str())
    }
}

fn trimmed_non_empty(input: &str) -> Option<&str> {
    let trimmed = input.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed)
    }
}
