//! Student listing and dataset diagnostics use-cases.

use results_portal_ports::{LogFields, LogLevel, LoggerPort, StudentDirectoryPort, StudentHandle};
use results_portal_shared::{RequestContext, Result};
use serde_json::Value;
use std::sync::Arc;
use std::time::{Instant, SystemTime, UNIX_EPOCH};

/// Dependencies required by the listing use-cases.
#[derive(Clone)]
pub struct ListStudentsDeps {
    /// Student directory adapter.
    pub directory: Arc<dyn StudentDirectoryPort>,
    /// Optional logger.
    pub logger: Option<Arc<dyn LoggerPort>>,
}

/// Every record in the directory, ordered by seat number.
pub async fn list_students(
    ctx: &RequestContext,
    deps: &ListStudentsDeps,
) -> Result<Vec<StudentHandle>> {
    ctx.ensure_not_cancelled("list_students.start")?;
    let result = deps.directory.list_students(ctx).await;
    if let Some(logger) = deps.logger.as_ref() {
        match &result {
            Ok(records) => {
                let mut fields = LogFields::new();
                fields.insert("students".into(), Value::from(records.len()));
                logger.debug("students.listed", "Students listed", Some(fields));
            },
            Err(error) => logger.failure(LogLevel::Error, "students.failed", error, None),
        }
    }
    result
}

/// Snapshot of the dataset as seen by one request.
#[derive(Debug, Clone)]
pub struct DatasetDiagnostics {
    /// Number of records.
    pub students_count: usize,
    /// Time spent listing the directory.
    pub load_time_ms: u64,
    /// Deployment label from configuration.
    pub environment: Box<str>,
    /// Snapshot time, epoch milliseconds.
    pub timestamp_ms: u64,
    /// Directory label, e.g. `builtin`.
    pub dataset_source: String,
    /// First record by seat number, if any.
    pub sample: Option<StudentHandle>,
}

/// Load the dataset and report how long it took.
pub async fn dataset_diagnostics(
    ctx: &RequestContext,
    deps: &ListStudentsDeps,
    environment: &str,
) -> Result<DatasetDiagnostics> {
    let started_at = Instant::now();
    let records = list_students(ctx, deps).await?;
    let load_time_ms = u64::try_from(started_at.elapsed().as_millis()).unwrap_or(u64::MAX);

    Ok(DatasetDiagnostics {
        students_count: records.len(),
        load_time_ms,
        environment: environment.into(),
        timestamp_ms: now_epoch_ms(),
        dataset_source: deps.directory.info().label(),
        sample: records.into_iter().next(),
    })
}

/// Current wall-clock time in epoch milliseconds (0 if the clock is unusable).
pub fn now_epoch_ms() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .ok()
        .and_then(|duration| u64::try_from(duration.as_millis()).ok())
        .unwrap_or_default()
}
