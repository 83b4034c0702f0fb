//! API v1 request conversion (query DTOs into domain inputs).

use crate::v1::{ApiV1DownloadQueryDto, ApiV1LookupQueryDto};
use results_portal_domain::{ExportOptions, ExportOptionsError, LookupQuery};

/// A download request split into its lookup and export halves.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiV1DownloadRequest {
    /// Which record to export.
    pub query: LookupQuery,
    /// How to render it.
    pub options: ExportOptions,
}

/// Convert `/api/validate` query parameters into a lookup query.
#[must_use]
pub fn lookup_query_from_api_v1(dto: ApiV1LookupQueryDto) -> LookupQuery {
    LookupQuery {
        usn: dto.usn,
        full_name: dto.full_name,
    }
}

/// Convert `/api/download` query parameters, validating the export options.
pub fn download_request_from_api_v1(
    dto: ApiV1DownloadQueryDto,
) -> Result<ApiV1DownloadRequest, ExportOptionsError> {
    let options = ExportOptions::parse(
        dto.format.as_deref(),
        dto.compact.as_deref(),
        dto.compress.as_deref(),
        dto.fields.as_deref(),
    )?;
    Ok(ApiV1DownloadRequest {
        query: LookupQuery {
            usn: dto.usn,
            full_name: dto.full_name,
        },
        options,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use results_portal_domain::{ExportField, ExportFormat};
    use std::error::Error;

    #[test]
    fn download_defaults_to_full_uncompressed_pdf() -> Result<(), Box<dyn Error>> {
        let request = download_request_from_api_v1(ApiV1DownloadQueryDto {
            usn: Some("3vc24cd001".to_owned()),
            ..ApiV1DownloadQueryDto::default()
        })?;
        assert_eq!(request.query, LookupQuery::by_usn("3vc24cd001"));
        assert_eq!(request.options.format, ExportFormat::Pdf);
        assert!(!request.options.compact);
        assert!(!request.options.compress);
        assert_eq!(
            request.options.fields,
            vec![ExportField::Subject, ExportField::Marks]
        );
        Ok(())
    }

    #[test]
    fn csv_and_gzip_are_read_from_the_query() -> Result<(), Box<dyn Error>> {
        let request = download_request_from_api_v1(ApiV1DownloadQueryDto {
            format: Some("CSV".to_owned()),
            compress: Some("gzip".to_owned()),
            ..ApiV1DownloadQueryDto::default()
        })?;
        assert_eq!(request.options.format, ExportFormat::Csv);
        assert!(request.options.compress);
        Ok(())
    }

    #[test]
    fn unsupported_format_is_rejected() {
        let request = download_request_from_api_v1(ApiV1DownloadQueryDto {
            format: Some("docx".to_owned()),
            ..ApiV1DownloadQueryDto::default()
        });
        assert!(matches!(
            request,
            Err(ExportOptionsError::UnsupportedFormat { .. })
        ));
    }
}
