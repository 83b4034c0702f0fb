//! API v1 DTO mapping helpers.

use crate::v1::{
    ApiV1LookupResponse, ApiV1SampleStudentDto, ApiV1StudentDto, ApiV1StudentsErrorDto,
    ApiV1SubjectDto,
};
use results_portal_domain::{StudentRecord, SubjectResult};
use results_portal_shared::{ErrorEnvelope, ErrorKind};

/// Public message for failed lookups.
pub const LOOKUP_NOT_FOUND_MESSAGE: &str =
    "No matching record found. Please verify your Name or USN and try again.";
/// Public message for internal failures during a lookup.
pub const LOOKUP_SERVER_ERROR_MESSAGE: &str = "Server error occurred. Please try again later.";
/// Public message when the student list cannot be produced.
pub const STUDENTS_LOAD_ERROR_MESSAGE: &str = "Failed to load students data";
/// Plain-text body for a rejected download.
pub const DOWNLOAD_FORBIDDEN_MESSAGE: &str = "Forbidden: invalid Name/USN.";
/// Plain-text body for an internal download failure.
pub const DOWNLOAD_INTERNAL_ERROR_MESSAGE: &str = "Internal server error";
/// Public message for a lookup sent with an unsupported HTTP method.
pub const METHOD_NOT_ALLOWED_MESSAGE: &str = "Method not allowed. Use GET.";

/// HTTP 200.
pub const STATUS_OK: u16 = 200;
/// HTTP 400.
pub const STATUS_BAD_REQUEST: u16 = 400;
/// HTTP 403.
pub const STATUS_FORBIDDEN: u16 = 403;
/// HTTP 405.
pub const STATUS_METHOD_NOT_ALLOWED: u16 = 405;
/// HTTP 500.
pub const STATUS_INTERNAL_ERROR: u16 = 500;

/// A response body paired with the HTTP status it must carry.
#[derive(Debug, Clone, PartialEq)]
pub struct ApiV1Reply<T> {
    /// HTTP status code.
    pub status: u16,
    /// Response body.
    pub body: T,
}

impl<T> ApiV1Reply<T> {
    /// Pair a body with a status.
    #[must_use]
    pub const fn new(status: u16, body: T) -> Self {
        Self { status, body }
    }
}

/// HTTP status for a failed request: expected failures are 403, anything
/// else is 500.
#[must_use]
pub const fn status_for_error(error: &ErrorEnvelope) -> u16 {
    match error.kind {
        ErrorKind::Expected => STATUS_FORBIDDEN,
        ErrorKind::Invariant | ErrorKind::Unexpected => STATUS_INTERNAL_ERROR,
    }
}

/// Public lookup message for a failed request. Internal detail never leaks.
#[must_use]
pub const fn public_lookup_message(error: &ErrorEnvelope) -> &'static str {
    match error.kind {
        ErrorKind::Expected => LOOKUP_NOT_FOUND_MESSAGE,
        ErrorKind::Invariant | ErrorKind::Unexpected => LOOKUP_SERVER_ERROR_MESSAGE,
    }
}

/// Map a subject line into its wire shape.
#[must_use]
pub fn subject_to_api_v1(subject: &SubjectResult) -> ApiV1SubjectDto {
    ApiV1SubjectDto {
        code: subject.code.as_str().to_owned(),
        subject: subject.subject.to_string(),
        marks: subject.marks,
        grade: subject.grade.as_str().to_owned(),
        status: subject.status.as_str().to_owned(),
    }
}

/// Map a record into its wire shape.
#[must_use]
pub fn student_to_api_v1(record: &StudentRecord) -> ApiV1StudentDto {
    ApiV1StudentDto {
        usn: record.usn.as_str().to_owned(),
        full_name: record.full_name.to_string(),
        total_marks: record.total_marks,
        percentage: record.percentage,
        sgpa: record.sgpa,
        subjects: record.subjects.iter().map(subject_to_api_v1).collect(),
        section: record.section.as_deref().map(str::to_owned),
        class_rank: record.class_rank,
        college_rank: record.college_rank,
        pdf_link: record.pdf_link.as_deref().map(str::to_owned),
    }
}

/// Short summary of a record for diagnostics.
#[must_use]
pub fn sample_student_to_api_v1(record: &StudentRecord) -> ApiV1SampleStudentDto {
    ApiV1SampleStudentDto {
        usn: record.usn.as_str().to_owned(),
        name: record.full_name.to_string(),
        subjects_count: record.subjects_count(),
    }
}

/// Map a lookup result into the `/api/validate` status and body.
#[must_use]
pub fn lookup_result_to_api_v1<R: AsRef<StudentRecord>>(
    result: &Result<R, ErrorEnvelope>,
) -> ApiV1Reply<ApiV1LookupResponse> {
    match result {
        Ok(record) => ApiV1Reply::new(
            STATUS_OK,
            ApiV1LookupResponse::found(student_to_api_v1(record.as_ref())),
        ),
        Err(error) => ApiV1Reply::new(
            status_for_error(error),
            ApiV1LookupResponse::rejected(public_lookup_message(error)),
        ),
    }
}

/// Map a student list result into the `/api/students` status and body.
pub fn students_result_to_api_v1<R: AsRef<StudentRecord>>(
    result: &Result<Vec<R>, ErrorEnvelope>,
) -> ApiV1Reply<Result<Vec<ApiV1StudentDto>, ApiV1StudentsErrorDto>> {
    match result {
        Ok(records) => ApiV1Reply::new(
            STATUS_OK,
            Ok(records
                .iter()
                .map(|record| student_to_api_v1(record.as_ref()))
                .collect()),
        ),
        Err(_) => ApiV1Reply::new(
            STATUS_INTERNAL_ERROR,
            Err(ApiV1StudentsErrorDto {
                error: STUDENTS_LOAD_ERROR_MESSAGE.to_owned(),
            }),
        ),
    }
}

/// Map a download failure into its status and plain-text body.
#[must_use]
pub fn download_error_to_api_v1(error: &ErrorEnvelope) -> ApiV1Reply<String> {
    if error.code.namespace() == "export" && error.kind == ErrorKind::Expected {
        return ApiV1Reply::new(STATUS_BAD_REQUEST, error.message.clone());
    }
    match error.kind {
        ErrorKind::Expected => {
            ApiV1Reply::new(STATUS_FORBIDDEN, DOWNLOAD_FORBIDDEN_MESSAGE.to_owned())
        },
        ErrorKind::Invariant | ErrorKind::Unexpected => ApiV1Reply::new(
            STATUS_INTERNAL_ERROR,
            DOWNLOAD_INTERNAL_ERROR_MESSAGE.to_owned(),
        ),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use results_portal_domain::{ExportOptionsError, SubjectCode, SubjectStatus, Usn};
    use results_portal_shared::{ErrorClass, ErrorCode};
    use std::error::Error;
    use std::sync::Arc;

    fn record() -> Result<StudentRecord, Box<dyn Error>> {
        Ok(StudentRecord {
            usn: Usn::parse("3VC24CD001")?,
            full_name: "A SAKSHI".into(),
            total_marks: 573,
            percentage: 71.62,
            sgpa: 7.55,
            subjects: vec![SubjectResult::new(
                SubjectCode::parse("BMATS101")?,
                76,
                SubjectStatus::Pass,
            )],
            section: Some("A".into()),
            class_rank: Some(1),
            college_rank: Some(1),
            pdf_link: None,
        })
    }

    #[test]
    fn expected_errors_are_forbidden_with_public_message() {
        let error = ErrorEnvelope::expected(ErrorCode::new("lookup", "not_found"), "detail");
        let reply = lookup_result_to_api_v1::<Arc<StudentRecord>>(&Err(error));
        assert_eq!(reply.status, STATUS_FORBIDDEN);
        assert_eq!(
            reply.body,
            ApiV1LookupResponse::rejected(LOOKUP_NOT_FOUND_MESSAGE)
        );
    }

    #[test]
    fn internal_errors_hide_detail() {
        let invariant = ErrorEnvelope::invariant(ErrorCode::new("lookup", "invalid_record"), "x");
        let unexpected =
            ErrorEnvelope::unexpected(ErrorCode::io(), "disk on fire", ErrorClass::Retriable);

        for error in [invariant, unexpected] {
            let reply = lookup_result_to_api_v1::<Arc<StudentRecord>>(&Err(error));
            assert_eq!(reply.status, STATUS_INTERNAL_ERROR);
            assert_eq!(
                reply.body,
                ApiV1LookupResponse::rejected(LOOKUP_SERVER_ERROR_MESSAGE)
            );
        }
    }

    #[test]
    fn found_records_map_every_field() -> Result<(), Box<dyn Error>> {
        let reply = lookup_result_to_api_v1(&Ok(Arc::new(record()?)));
        assert_eq!(reply.status, STATUS_OK);
        let ApiV1LookupResponse::Found { ok, student } = reply.body else {
            return Err("expected a found body".into());
        };
        assert!(ok);
        assert_eq!(student.usn, "3VC24CD001");
        assert_eq!(student.section.as_deref(), Some("A"));
        let subject = student.subjects.first().ok_or("missing subject")?;
        assert_eq!(subject.grade, "B");
        assert_eq!(subject.status, "Pass");
        Ok(())
    }

    #[test]
    fn download_errors_map_to_plain_text_statuses() {
        let format: ErrorEnvelope = ExportOptionsError::UnsupportedFormat {
            format: "docx".to_owned(),
        }
        .into();
        let reply = download_error_to_api_v1(&format);
        assert_eq!(reply.status, STATUS_BAD_REQUEST);
        assert_eq!(reply.body, "Unsupported format: docx");

        let render = ErrorEnvelope::unexpected(
            ErrorCode::new("export", "render_failed"),
            "x",
            ErrorClass::NonRetriable,
        );
        assert_eq!(
            download_error_to_api_v1(&render),
            ApiV1Reply::new(
                STATUS_INTERNAL_ERROR,
                DOWNLOAD_INTERNAL_ERROR_MESSAGE.to_owned()
            )
        );

        let missing = ErrorEnvelope::expected(ErrorCode::new("lookup", "missing_query"), "x");
        assert_eq!(
            download_error_to_api_v1(&missing),
            ApiV1Reply::new(STATUS_FORBIDDEN, DOWNLOAD_FORBIDDEN_MESSAGE.to_owned())
        );
    }

    #[test]
    fn student_list_failure_uses_public_message() {
        let error = ErrorEnvelope::unexpected(ErrorCode::io(), "io", ErrorClass::Retriable);
        let reply = students_result_to_api_v1::<Arc<StudentRecord>>(&Err(error));
        assert_eq!(reply.status, STATUS_INTERNAL_ERROR);
        assert_eq!(
            reply.body.err().map(|body| body.error),
            Some(STUDENTS_LOAD_ERROR_MESSAGE.to_owned())
        );
    }
}
