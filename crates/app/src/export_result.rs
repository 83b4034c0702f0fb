//! Result-sheet export use-case.

use crate::lookup_student::{LookupStudentDeps, lookup_student};
use results_portal_domain::{ExportFormat, ExportOptions, LookupQuery};
use results_portal_ports::{LogFields, ResultSheetRendererPort};
use results_portal_shared::{RequestContext, Result};
use serde_json::Value;
use std::sync::Arc;

/// Dependencies for [`export_result`].
#[derive(Clone)]
pub struct ExportResultDeps {
    /// Lookup dependencies used to resolve the record.
    pub lookup: LookupStudentDeps,
    /// PDF backend for printable sheets.
    pub renderer: Arc<dyn ResultSheetRendererPort>,
}

/// A rendered export ready to be served as a download.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportedResult {
    /// Suggested file name, e.g. `vtu-result-3VC24CD001.pdf`.
    pub file_name: String,
    /// MIME type of `body`.
    pub content_type: &'static str,
    /// Rendered document, before any transfer compression.
    pub body: Vec<u8>,
    /// Whether the caller asked for a gzip-encoded response.
    pub compress: bool,
}

/// Look up one record and render it with the given options.
///
/// Lookup failures keep their lookup error codes, so callers can tell a
/// rejected query from an internal failure.
pub async fn export_result(
    ctx: &RequestContext,
    deps: &ExportResultDeps,
    query: &LookupQuery,
    options: &ExportOptions,
) -> Result<ExportedResult> {
    let record = lookup_student(ctx, &deps.lookup, query).await?;
    let body = match options.format {
        ExportFormat::Pdf => deps.renderer.render_pdf(&options.sheet(&record))?,
        ExportFormat::Csv => options.render_csv(&record).into_bytes(),
    };
    let exported = ExportedResult {
        file_name: options.file_name(&record),
        content_type: options.format.content_type(),
        body,
        compress: options.compress,
    };

    if let Some(logger) = deps.lookup.logger.as_ref() {
        let mut fields = LogFields::new();
        fields.insert("format".into(), Value::from(options.format.extension()));
        fields.insert("compact".into(), Value::from(options.compact));
        fields.insert("compress".into(), Value::from(options.compress));
        fields.insert("bytes".into(), Value::from(exported.body.len()));
        logger.info("export.completed", "Result export rendered", Some(fields));
    }
    Ok(exported)
}

#[cfg(test)]
mod tests {
    use super::*;
    use results_portal_domain::{
        NameKey, StudentRecord, SubjectCode, SubjectResult, SubjectStatus, Usn,
    };
    use results_portal_domain::ResultSheet;
    use results_portal_ports::{BoxFuture, DirectoryInfo, StudentDirectoryPort, StudentHandle};
    use std::error::Error;
    use std::sync::Mutex;

    /// Records the sheets it is asked to render.
    #[derive(Default)]
    struct RecordingRenderer(Mutex<Vec<ResultSheet>>);

    impl ResultSheetRendererPort for RecordingRenderer {
        fn render_pdf(&self, sheet: &ResultSheet) -> Result<Vec<u8>> {
            if let Ok(mut sheets) = self.0.lock() {
                sheets.push(sheet.clone());
            }
            Ok(b"%PDF-stub".to_vec())
        }
    }

    struct OneRecord(StudentHandle, DirectoryInfo);

    impl StudentDirectoryPort for OneRecord {
        fn info(&self) -> &DirectoryInfo {
            &self.1
        }

        fn find_by_usn(
            &self,
            _ctx: &RequestContext,
            usn: Usn,
        ) -> BoxFuture<'_, Result<Option<StudentHandle>>> {
            let found = (self.0.usn == usn).then(|| Arc::clone(&self.0));
            Box::pin(async move { Ok(found) })
        }

        fn find_by_name(
            &self,
            _ctx: &RequestContext,
            _name: NameKey,
        ) -> BoxFuture<'_, Result<Option<StudentHandle>>> {
            Box::pin(async { Ok(None) })
        }

        fn list_students(
            &self,
            _ctx: &RequestContext,
        ) -> BoxFuture<'_, Result<Vec<StudentHandle>>> {
            let records = vec![Arc::clone(&self.0)];
            Box::pin(async move { Ok(records) })
        }
    }

    fn deps(
        renderer: Arc<RecordingRenderer>,
    ) -> std::result::Result<ExportResultDeps, Box<dyn Error>> {
        let record = StudentRecord {
            usn: Usn::parse("3VC24CD001")?,
            full_name: "A SAKSHI".into(),
            total_marks: 76,
            percentage: 76.0,
            sgpa: 8.0,
            subjects: vec![SubjectResult::new(
                SubjectCode::parse("BMATS101")?,
                76,
                SubjectStatus::Pass,
            )],
            section: None,
            class_rank: None,
            college_rank: None,
            pdf_link: None,
        };
        Ok(ExportResultDeps {
            lookup: LookupStudentDeps {
                directory: Arc::new(OneRecord(Arc::new(record), DirectoryInfo::builtin())),
                logger: None,
            },
            renderer,
        })
    }

    #[tokio::test]
    async fn renders_the_matched_record_as_csv() -> std::result::Result<(), Box<dyn Error>> {
        let renderer = Arc::new(RecordingRenderer::default());
        let deps = deps(Arc::clone(&renderer))?;
        let ctx = RequestContext::new_request();
        let options = ExportOptions::parse(Some("csv"), None, Some("gzip"), None)?;
        let exported =
            export_result(&ctx, &deps, &LookupQuery::by_usn("3vc24cd001"), &options).await?;

        assert_eq!(exported.file_name, "vtu-result-3VC24CD001.csv");
        assert_eq!(exported.content_type, "text/csv; charset=utf-8");
        assert!(exported.compress);
        let body = String::from_utf8(exported.body)?;
        assert!(body.starts_with("Subject Code,Subject Name,Marks\n"));
        assert!(body.contains("\"BMATS101\",\"MATHEMATICS FOR CSE STREAM-1\",76"));
        assert!(renderer.0.lock().map_err(|error| error.to_string())?.is_empty());
        Ok(())
    }

    #[tokio::test]
    async fn pdf_exports_go_through_the_renderer() -> std::result::Result<(), Box<dyn Error>> {
        let renderer = Arc::new(RecordingRenderer::default());
        let deps = deps(Arc::clone(&renderer))?;
        let ctx = RequestContext::new_request();
        let exported = export_result(
            &ctx,
            &deps,
            &LookupQuery::by_usn("3VC24CD001"),
            &ExportOptions::default(),
        )
        .await?;

        assert_eq!(exported.file_name, "vtu-result-3VC24CD001.pdf");
        assert_eq!(exported.content_type, "application/pdf");
        assert_eq!(exported.body, b"%PDF-stub".to_vec());
        assert!(!exported.compress);

        let sheets = renderer.0.lock().map_err(|error| error.to_string())?;
        assert_eq!(sheets.len(), 1);
        let sheet = sheets.first().ok_or("no sheet rendered")?;
        assert!(sheet.lines.iter().any(|line| line.text == "USN: 3VC24CD001"));
        Ok(())
    }

    #[tokio::test]
    async fn lookup_failures_keep_lookup_codes() -> std::result::Result<(), Box<dyn Error>> {
        let deps = deps(Arc::new(RecordingRenderer::default()))?;
        let ctx = RequestContext::new_request();
        let error = export_result(
            &ctx,
            &deps,
            &LookupQuery::by_usn("3VC24CD404"),
            &ExportOptions::default(),
        )
        .await
        .err();
        assert_eq!(
            error.map(|error| error.code.to_string()).as_deref(),
            Some("lookup:not_found")
        );
        Ok(())
    }
}
