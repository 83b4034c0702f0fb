//! Lookup queries and their resolution into search criteria.

use crate::primitives::{NameKey, PrimitiveError, Usn};
use results_portal_shared::{ErrorCode, ErrorEnvelope};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Raw lookup parameters as supplied by a caller.
///
/// Empty or whitespace-only values count as absent.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LookupQuery {
    /// Seat number, any case.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub usn: Option<String>,
    /// Full name, any case and spacing.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub full_name: Option<String>,
}

impl LookupQuery {
    /// Build a query from optional parameters.
    #[must_use]
    pub fn new(usn: Option<impl Into<String>>, full_name: Option<impl Into<String>>) -> Self {
        Self {
            usn: usn.map(Into::into),
            full_name: full_name.map(Into::into),
        }
    }

    /// Query by seat number only.
    #[must_use]
    pub fn by_usn(usn: impl Into<String>) -> Self {
        Self {
            usn: Some(usn.into()),
            full_name: None,
        }
    }

    /// Query by full name only.
    #[must_use]
    pub fn by_name(full_name: impl Into<String>) -> Self {
        Self {
            usn: None,
            full_name: Some(full_name.into()),
        }
    }

    /// Normalize the raw parameters into lookup criteria.
    ///
    /// ```
    /// use results_portal_domain::{LookupCriteria, LookupQuery, LookupRejection};
    ///
    /// let criteria = LookupQuery::new(Some(" 3vc24cd001 "), Some("  ")).resolve();
    /// assert!(matches!(criteria, Ok(LookupCriteria::ByUsn(_))));
    ///
    /// let missing = LookupQuery::new(Some(""), None::<String>).resolve();
    /// assert_eq!(missing.err(), Some(LookupRejection::MissingQuery));
    /// ```
    pub fn resolve(&self) -> Result<LookupCriteria, LookupRejection> {
        let usn = present(self.usn.as_deref());
        let name = present(self.full_name.as_deref());

        let usn = match usn {
            Some(raw) => Some(Usn::parse(raw).map_err(LookupRejection::from)?),
            None => None,
        };
        let name = match name {
            Some(raw) => Some(NameKey::parse(raw).map_err(LookupRejection::from)?),
            None => None,
        };

        match (usn, name) {
            (Some(usn), Some(name)) => Ok(LookupCriteria::Both { usn, name }),
            (Some(usn), None) => Ok(LookupCriteria::ByUsn(usn)),
            (None, Some(name)) => Ok(LookupCriteria::ByName(name)),
            (None, None) => Err(LookupRejection::MissingQuery),
        }
    }
}

fn present(value: Option<&str>) -> Option<&str> {
    value.filter(|value| !value.trim().is_empty())
}

/// Normalized search criteria for a student directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LookupCriteria {
    /// Match by seat number.
    ByUsn(Usn),
    /// Match by normalized name.
    ByName(NameKey),
    /// Both must resolve to the same record.
    Both {
        /// Seat number.
        usn: Usn,
        /// Normalized name.
        name: NameKey,
    },
}

impl LookupCriteria {
    /// Short label for logs.
    #[must_use]
    pub const fn mode(&self) -> &'static str {
        match self {
            Self::ByUsn(_) => "usn",
            Self::ByName(_) => "name",
            Self::Both { .. } => "usn+name",
        }
    }
}

/// Reasons a query cannot be turned into criteria.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LookupRejection {
    /// Neither parameter carried a value.
    MissingQuery,
    /// The seat number cannot belong to any record.
    MalformedUsn {
        /// Length of the trimmed input.
        input_length: usize,
    },
}

impl From<PrimitiveError> for LookupRejection {
    fn from(error: PrimitiveError) -> Self {
        match error {
            PrimitiveError::InvalidUsn { input_length } => Self::MalformedUsn { input_length },
            PrimitiveError::EmptyUsn { .. }
            | PrimitiveError::EmptyName { .. }
            | PrimitiveError::EmptySubjectCode { .. }
            | PrimitiveError::InvalidSubjectCode { .. } => Self::MissingQuery,
        }
    }
}

impl fmt::Display for LookupRejection {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MissingQuery => formatter.write_str("usn or fullName must be provided"),
            Self::MalformedUsn { .. } => formatter.write_str("usn is not a valid seat number"),
        }
    }
}

impl std::error::Error for LookupRejection {}

impl From<LookupRejection> for ErrorEnvelope {
    fn from(rejection: LookupRejection) -> Self {
        match rejection {
            LookupRejection::MissingQuery => Self::expected(
                ErrorCode::new("lookup", "missing_query"),
                rejection.to_string(),
            ),
            LookupRejection::MalformedUsn { input_length } => {
                Self::expected(ErrorCode::new("lookup", "not_found"), rejection.to_string())
                    .with_metadata("reason", "malformed_usn")
                    .with_metadata("input_length", input_length.to_string())
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn blank_parameters_are_treated_as_absent() {
        let query = LookupQuery::new(Some("   "), Some("\t"));
        assert_eq!(query.resolve(), Err(LookupRejection::MissingQuery));
        assert_eq!(
            LookupQuery::default().resolve(),
            Err(LookupRejection::MissingQuery)
        );
    }

    #[test]
    fn both_parameters_produce_combined_criteria() {
        let criteria = LookupQuery::new(Some("3VC24CD001"), Some("a  sakshi")).resolve();
        let Ok(LookupCriteria::Both { usn, name }) = criteria else {
            unreachable!("expected combined criteria, got {criteria:?}");
        };
        assert_eq!(usn.as_str(), "3VC24CD001");
        assert_eq!(name.as_str(), "a sakshi");
    }

    #[test]
    fn malformed_usn_is_rejected_without_echoing_input() {
        let rejection = LookupQuery::by_usn("DROP TABLE").resolve().err();
        assert_eq!(
            rejection,
            Some(LookupRejection::MalformedUsn { input_length: 10 })
        );

        let envelope = rejection.map(ErrorEnvelope::from);
        let envelope = envelope.as_ref();
        assert_eq!(
            envelope.map(|error| error.code.to_string()).as_deref(),
            Some("lookup:not_found")
        );
        assert!(envelope.is_some_and(ErrorEnvelope::is_expected));
    }

    #[test]
    fn criteria_modes_are_stable_labels() {
        let by_name = LookupQuery::by_name("B AKHILA").resolve();
        assert_eq!(by_name.map(|criteria| criteria.mode()), Ok("name"));
    }

    proptest! {
        #[test]
        fn whitespace_only_queries_never_resolve(usn in "[ \t]{0,6}", name in "[ \t\n]{0,6}") {
            let query = LookupQuery::new(Some(usn), Some(name));
            prop_assert_eq!(query.resolve(), Err(LookupRejection::MissingQuery));
        }
    }
}
