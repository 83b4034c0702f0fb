//! Student lookup use-case (by seat number, by name, or both).

use results_portal_domain::{LookupCriteria, LookupQuery};
use results_portal_ports::{LogFields, LogLevel, LoggerPort, StudentDirectoryPort, StudentHandle};
use results_portal_shared::{ErrorCode, ErrorEnvelope, RequestContext, Result};
use serde_json::Value;
use std::sync::Arc;
use std::time::Instant;

/// Dependencies required by student lookup.
#[derive(Clone)]
pub struct LookupStudentDeps {
    /// Student directory adapter.
    pub directory: Arc<dyn StudentDirectoryPort>,
    /// Optional logger.
    pub logger: Option<Arc<dyn LoggerPort>>,
}

/// Resolve a query to exactly one student record.
///
/// Failures are expected errors (`lookup:missing_query`, `lookup:not_found`,
/// `lookup:identity_mismatch`) except for records that break their own
/// invariants (`lookup:invalid_record`) and directory failures.
pub async fn lookup_student(
    ctx: &RequestContext,
    deps: &LookupStudentDeps,
    query: &LookupQuery,
) -> Result<StudentHandle> {
    let started_at = Instant::now();
    let fields = log_fields_start(query);
    if let Some(logger) = deps.logger.as_ref() {
        logger.debug("lookup.start", "Student lookup started", Some(fields.clone()));
    }

    let result = run_lookup(ctx, deps, query).await;

    if let Some(logger) = deps.logger.as_ref() {
        let mut fields = fields;
        fields.insert("durationMs".into(), Value::from(duration_ms(started_at)));
        match &result {
            Ok(record) => {
                fields.insert("subjects".into(), Value::from(record.subjects_count()));
                logger.info("lookup.completed", "Student lookup completed", Some(fields));
            },
            Err(error) if error.is_expected() => {
                logger.failure(LogLevel::Info, "lookup.rejected", error, Some(fields));
            },
            Err(error) => {
                logger.failure(LogLevel::Error, "lookup.failed", error, Some(fields));
            },
        }
    }

    result
}

async fn run_lookup(
    ctx: &RequestContext,
    deps: &LookupStudentDeps,
    query: &LookupQuery,
) -> Result<StudentHandle> {
    ctx.ensure_not_cancelled("lookup_student.start")?;
    let criteria = query.resolve().map_err(ErrorEnvelope::from)?;
    let mode = criteria.mode();

    let record = match criteria {
        LookupCriteria::ByUsn(usn) => deps.directory.find_by_usn(ctx, usn).await?,
        LookupCriteria::ByName(name) => deps.directory.find_by_name(ctx, name).await?,
        LookupCriteria::Both { usn, name } => {
            match deps.directory.find_by_usn(ctx, usn).await? {
                Some(record) => {
                    let matches = record.name_key().is_ok_and(|key| key == name);
                    if !matches {
                        return Err(identity_mismatch());
                    }
                    Some(record)
                },
                None => None,
            }
        },
    };

    let record = record.ok_or_else(|| not_found(mode))?;
    record.validate().map_err(|error| {
        ErrorEnvelope::invariant(
            ErrorCode::new("lookup", "invalid_record"),
            format!("matched record is invalid: {error}"),
        )
        .with_metadata("mode", mode)
    })?;
    Ok(record)
}

fn not_found(mode: &'static str) -> ErrorEnvelope {
    ErrorEnvelope::expected(
        ErrorCode::new("lookup", "not_found"),
        "no record matches the query",
    )
    .with_metadata("mode", mode)
}

fn identity_mismatch() -> ErrorEnvelope {
    ErrorEnvelope::expected(
        ErrorCode::new("lookup", "identity_mismatch"),
        "usn and fullName belong to different records",
    )
    .with_metadata("mode", "usn+name")
}

fn log_fields_start(query: &LookupQuery) -> LogFields {
    let length = |value: Option<&String>| value.map_or(0, |value| value.trim().chars().count());
    let mut fields = LogFields::new();
    fields.insert("usnLength".into(), Value::from(length(query.usn.as_ref())));
    fields.insert(
        "nameLength".into(),
        Value::from(length(query.full_name.as_ref())),
    );
    fields
}

fn duration_ms(started_at: Instant) -> u64 {
    u64::try_from(started_at.elapsed().as_millis()).unwrap_or(u64::MAX)
}

#[cfg(test)]
mod tests {
    use super::*;
    use results_portal_domain::{
        NameKey, StudentRecord, SubjectCode, SubjectResult, SubjectStatus, Usn,
    };
    use results_portal_ports::{BoxFuture, DirectoryInfo, LogEvent};
    use results_portal_shared::ErrorKind;
    use std::error::Error;
    use std::sync::Mutex;

    type TestResult<T = ()> = std::result::Result<T, Box<dyn Error>>;

    struct FakeDirectory {
        info: DirectoryInfo,
        records: Vec<StudentHandle>,
    }

    impl StudentDirectoryPort for FakeDirectory {
        fn info(&self) -> &DirectoryInfo {
            &self.info
        }

        fn find_by_usn(
            &self,
            _ctx: &RequestContext,
            usn: Usn,
        ) -> BoxFuture<'_, Result<Option<StudentHandle>>> {
            let found = self.records.iter().find(|record| record.usn == usn).cloned();
            Box::pin(async move { Ok(found) })
        }

        fn find_by_name(
            &self,
            _ctx: &RequestContext,
            name: NameKey,
        ) -> BoxFuture<'_, Result<Option<StudentHandle>>> {
            let found = self
                .records
                .iter()
                .find(|record| record.name_key().is_ok_and(|key| key == name))
                .cloned();
            Box::pin(async move { Ok(found) })
        }

        fn list_students(
            &self,
            _ctx: &RequestContext,
        ) -> BoxFuture<'_, Result<Vec<StudentHandle>>> {
            let records = self.records.clone();
            Box::pin(async move { Ok(records) })
        }
    }

    #[derive(Default)]
    struct CaptureLogger {
        events: Mutex<Vec<LogEvent>>,
    }

    impl CaptureLogger {
        fn names(&self) -> Vec<String> {
            self.events
                .lock()
                .map(|events| events.iter().map(|event| event.event.to_string()).collect())
                .unwrap_or_default()
        }
    }

    impl LoggerPort for CaptureLogger {
        fn log(&self, event: LogEvent) {
            if let Ok(mut events) = self.events.lock() {
                events.push(event);
            }
        }

        fn child(&self, _fields: LogFields) -> Box<dyn LoggerPort> {
            Box::new(Self::default())
        }
    }

    fn record(usn: &str, name: &str, marks: u8) -> TestResult<StudentRecord> {
        Ok(StudentRecord {
            usn: Usn::parse(usn)?,
            full_name: name.into(),
            total_marks: u32::from(marks),
            percentage: f64::from(marks),
            sgpa: 5.0,
            subjects: vec![SubjectResult::new(
                SubjectCode::parse("BMATS101")?,
                marks,
                SubjectStatus::Pass,
            )],
            section: None,
            class_rank: None,
            college_rank: None,
            pdf_link: None,
        })
    }

    fn deps(
        records: Vec<StudentRecord>,
        logger: Option<Arc<CaptureLogger>>,
    ) -> LookupStudentDeps {
        LookupStudentDeps {
            directory: Arc::new(FakeDirectory {
                info: DirectoryInfo::builtin(),
                records: records.into_iter().map(Arc::new).collect(),
            }),
            logger: logger.map(|logger| logger as Arc<dyn LoggerPort>),
        }
    }

    fn sample() -> TestResult<Vec<StudentRecord>> {
        Ok(vec![
            record("3VC24CD001", "A SAKSHI", 80)?,
            record("3VC24CD002", "ADITHYA PRAKASH R", 70)?,
        ])
    }

    async fn code_of(deps: &LookupStudentDeps, query: LookupQuery) -> Option<String> {
        let ctx = RequestContext::new_request();
        lookup_student(&ctx, deps, &query)
            .await
            .err()
            .map(|error| error.code.to_string())
    }

    #[tokio::test]
    async fn finds_by_usn_name_and_both() -> TestResult {
        let deps = deps(sample()?, None);
        let ctx = RequestContext::new_request();

        let by_usn = lookup_student(&ctx, &deps, &LookupQuery::by_usn(" 3vc24cd002 ")).await?;
        assert_eq!(by_usn.full_name.as_ref(), "ADITHYA PRAKASH R");

        let by_name = lookup_student(&ctx, &deps, &LookupQuery::by_name("a sakshi")).await?;
        assert_eq!(by_name.usn.as_str(), "3VC24CD001");

        let query = LookupQuery::new(Some("3VC24CD001"), Some("A  Sakshi"));
        let first = lookup_student(&ctx, &deps, &query).await?;
        let second = lookup_student(&ctx, &deps, &query).await?;
        assert_eq!(first, second);
        Ok(())
    }

    #[tokio::test]
    async fn rejections_are_expected_errors() -> TestResult {
        let deps = deps(sample()?, None);

        assert_eq!(
            code_of(&deps, LookupQuery::default()).await.as_deref(),
            Some("lookup:missing_query")
        );
        assert_eq!(
            code_of(&deps, LookupQuery::by_usn("")).await.as_deref(),
            Some("lookup:missing_query")
        );
        assert_eq!(
            code_of(&deps, LookupQuery::by_usn("INVALID123")).await.as_deref(),
            Some("lookup:not_found")
        );
        assert_eq!(
            code_of(&deps, LookupQuery::by_usn("3VC24-CD001")).await.as_deref(),
            Some("lookup:not_found")
        );
        assert_eq!(
            code_of(&deps, LookupQuery::by_name("NONEXISTENT STUDENT"))
                .await
                .as_deref(),
            Some("lookup:not_found")
        );
        assert_eq!(
            code_of(
                &deps,
                LookupQuery::new(Some("3VC24CD001"), Some("ADITHYA PRAKASH R"))
            )
            .await
            .as_deref(),
            Some("lookup:identity_mismatch")
        );
        Ok(())
    }

    #[tokio::test]
    async fn invalid_records_are_invariant_failures() -> TestResult {
        let mut broken = record("3VC24CD009", "BROKEN", 50)?;
        broken.percentage = 140.0;
        let logger = Arc::new(CaptureLogger::default());
        let deps = deps(vec![broken], Some(Arc::clone(&logger)));

        let ctx = RequestContext::new_request();
        let error = lookup_student(&ctx, &deps, &LookupQuery::by_usn("3VC24CD009"))
            .await
            .err()
            .ok_or("expected invariant failure")?;
        assert_eq!(error.kind, ErrorKind::Invariant);
        assert_eq!(error.code, ErrorCode::new("lookup", "invalid_record"));
        assert_eq!(logger.names(), vec!["lookup.start", "lookup.failed"]);
        Ok(())
    }

    #[tokio::test]
    async fn logs_lengths_not_values() -> TestResult {
        let logger = Arc::new(CaptureLogger::default());
        let deps = deps(sample()?, Some(Arc::clone(&logger)));
        let ctx = RequestContext::new_request();
        lookup_student(&ctx, &deps, &LookupQuery::by_usn("3VC24CD001")).await?;
        let _ = lookup_student(&ctx, &deps, &LookupQuery::by_name("NOBODY")).await;

        assert_eq!(
            logger.names(),
            vec!["lookup.start", "lookup.completed", "lookup.start", "lookup.rejected"]
        );
        let events = logger.events.lock().map_err(|_| "logger lock poisoned")?;
        let fields: Vec<_> = events.iter().map(|event| &event.fields).collect();
        let rendered = serde_json::to_string(&fields)?;
        assert!(!rendered.contains("3VC24CD001"));
        assert!(!rendered.contains("NOBODY"));
        assert!(rendered.contains("\"usnLength\":10"));
        Ok(())
    }
}
