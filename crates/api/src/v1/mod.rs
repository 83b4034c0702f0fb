//! API v1 DTOs and helpers.

mod mappers;
mod schema;
mod types;
mod validation;

pub use mappers::{
    ApiV1Reply, DOWNLOAD_FORBIDDEN_MESSAGE, DOWNLOAD_INTERNAL_ERROR_MESSAGE,
    LOOKUP_NOT_FOUND_MESSAGE, LOOKUP_SERVER_ERROR_MESSAGE, METHOD_NOT_ALLOWED_MESSAGE,
    STATUS_BAD_REQUEST, STATUS_FORBIDDEN, STATUS_INTERNAL_ERROR, STATUS_METHOD_NOT_ALLOWED,
    STATUS_OK, STUDENTS_LOAD_ERROR_MESSAGE, download_error_to_api_v1,
    lookup_result_to_api_v1, public_lookup_message, sample_student_to_api_v1, status_for_error,
    student_to_api_v1, students_result_to_api_v1, subject_to_api_v1,
};
pub use schema::{
    api_v1_diagnostics_response_schema, api_v1_download_query_schema, api_v1_lookup_query_schema,
    api_v1_lookup_response_schema, api_v1_student_schema,
};
pub use types::*;
pub use validation::{ApiV1DownloadRequest, download_request_from_api_v1, lookup_query_from_api_v1};
