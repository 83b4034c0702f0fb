//! JSON Schema exports for API v1 DTOs.

use crate::v1::{
    ApiV1DiagnosticsResponse, ApiV1DownloadQueryDto, ApiV1LookupQueryDto, ApiV1LookupResponse,
    ApiV1StudentDto,
};
use schemars::{Schema, schema_for};

/// JSON Schema for `ApiV1LookupQueryDto`.
#[must_use]
pub fn api_v1_lookup_query_schema() -> Schema {
    schema_for!(ApiV1LookupQueryDto)
}

/// JSON Schema for `ApiV1LookupResponse`.
#[must_use]
pub fn api_v1_lookup_response_schema() -> Schema {
    schema_for!(ApiV1LookupResponse)
}

/// JSON Schema for `ApiV1StudentDto`.
#[must_use]
pub fn api_v1_student_schema() -> Schema {
    schema_for!(ApiV1StudentDto)
}

/// JSON Schema for `ApiV1DownloadQueryDto`.
#[must_use]
pub fn api_v1_download_query_schema() -> Schema {
    schema_for!(ApiV1DownloadQueryDto)
}

/// JSON Schema for `ApiV1DiagnosticsResponse`.
#[must_use]
pub fn api_v1_diagnostics_response_schema() -> Schema {
    schema_for!(ApiV1DiagnosticsResponse)
}
