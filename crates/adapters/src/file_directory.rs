//! Student directory backed by a JSON or CSV file on disk.
//!
//! The file is parsed on first use and again whenever its modification time
//! changes. A failed parse returns an error and keeps the previous index.

use crate::dataset::{DatasetError, parse_dataset};
use crate::directory::DirectoryIndex;
use results_portal_domain::{NameKey, Usn};
use results_portal_ports::{
    BoxFuture, DatasetKind, DirectoryInfo, StudentDirectoryPort, StudentHandle,
};
use results_portal_shared::{ErrorEnvelope, RequestContext, Result};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::SystemTime;
use tokio::sync::RwLock;

struct Loaded {
    modified: Option<SystemTime>,
    index: Arc<DirectoryIndex>,
}

/// Directory that tracks a dataset file.
pub struct FileStudentDirectory {
    path: PathBuf,
    info: DirectoryInfo,
    state: RwLock<Option<Loaded>>,
}

impl FileStudentDirectory {
    /// Create a directory for `path`; nothing is read until first use.
    #[must_use]
    pub fn new(path: impl Into<PathBuf>, kind: DatasetKind) -> Self {
        let path = path.into();
        let info = DirectoryInfo {
            kind,
            location: Some(path.display().to_string().into_boxed_str()),
        };
        Self {
            path,
            info,
            state: RwLock::new(None),
        }
    }

    /// Dataset file path.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Current index, re-parsing the file when it changed since the last load.
    pub async fn index(&self, ctx: &RequestContext) -> Result<Arc<DirectoryIndex>> {
        ctx.ensure_not_cancelled("directory.load")?;
        let modified = self.modified_time().await?;

        {
            let state = self.state.read().await;
            if let Some(loaded) = state.as_ref().filter(|loaded| loaded.modified == modified) {
                return Ok(Arc::clone(&loaded.index));
            }
        }

        let mut state = self.state.write().await;
        if let Some(loaded) = state.as_ref().filter(|loaded| loaded.modified == modified) {
            return Ok(Arc::clone(&loaded.index));
        }

        let index = Arc::new(self.parse().await?);
        tracing::info!(
            target: "results_portal",
            path = %self.path.display(),
            kind = %self.info.kind,
            students = index.len(),
            "dataset loaded"
        );
        *state = Some(Loaded {
            modified,
            index: Arc::clone(&index),
        });
        Ok(index)
    }

    async fn modified_time(&self) -> Result<Option<SystemTime>> {
        let metadata = tokio::fs::metadata(&self.path)
            .await
            .map_err(|error| self.load_error(DatasetError::Io(error)))?;
        Ok(metadata.modified().ok())
    }

    async fn parse(&self) -> Result<DirectoryIndex> {
        let text = tokio::fs::read_to_string(&self.path)
            .await
            .map_err(|error| self.load_error(DatasetError::Io(error)))?;
        let records =
            parse_dataset(self.info.kind, &text).map_err(|error| self.load_error(error))?;
        DirectoryIndex::build_located(records).map_err(|error| self.load_error(error))
    }

    fn load_error(&self, error: DatasetError) -> ErrorEnvelope {
        ErrorEnvelope::from(error).with_metadata("path", self.path.display().to_string())
    }
}

impl StudentDirectoryPort for FileStudentDirectory {
    fn info(&self) -> &DirectoryInfo {
        &self.info
    }

    fn find_by_usn(
        &self,
        ctx: &RequestContext,
        usn: Usn,
    ) -> BoxFuture<'_, Result<Option<StudentHandle>>> {
        let ctx = ctx.clone();
        Box::pin(async move { Ok(self.index(&ctx).await?.by_usn(&usn)) })
    }

    fn find_by_name(
        &self,
        ctx: &RequestContext,
        name: NameKey,
    ) -> BoxFuture<'_, Result<Option<StudentHandle>>> {
        let ctx = ctx.clone();
        Box::pin(async move { Ok(self.index(&ctx).await?.by_name(&name)) })
    }

    fn list_students(&self, ctx: &RequestContext) -> BoxFuture<'_, Result<Vec<StudentHandle>>> {
        let ctx = ctx.clone();
        Box::pin(async move { Ok(self.index(&ctx).await?.sorted()) })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use results_portal_shared::{ErrorCode, ErrorKind};
    use std::error::Error;
    use std::time::Duration;

    const HEADER: &str = "usn,name,total_marks,percentage,sgpa,subject1\n";

    fn scratch_file(name: &str) -> PathBuf {
        std::env::temp_dir().join(format!(
            "results-portal-{}-{}-{name}",
            std::process::id(),
            uuid::Uuid::new_v4()
        ))
    }

    #[tokio::test]
    async fn loads_csv_and_reloads_when_the_file_changes() -> std::result::Result<(), Box<dyn Error>>
    {
        let path = scratch_file("students.csv");
        tokio::fs::write(&path, format!("{HEADER}X1,ONE,50,50,5,BMATS101:50 (P)\n")).await?;
        let directory = FileStudentDirectory::new(&path, DatasetKind::CsvFile);
        let ctx = RequestContext::new_request();

        let first = directory.list_students(&ctx).await?;
        assert_eq!(first.len(), 1);

        tokio::time::sleep(Duration::from_millis(1100)).await;
        tokio::fs::write(
            &path,
            format!("{HEADER}X1,ONE,50,50,5,BMATS101:50 (P)\nX2,TWO,60,60,6,BMATS101:60 (P)\n"),
        )
        .await?;

        let usn = Usn::parse("x2")?;
        let found = directory.find_by_usn(&ctx, usn).await?;
        assert_eq!(found.map(|record| record.total_marks), Some(60));

        tokio::fs::remove_file(&path).await?;
        Ok(())
    }

    #[tokio::test]
    async fn parse_failures_are_unexpected_errors() -> std::result::Result<(), Box<dyn Error>> {
        let path = scratch_file("broken.json");
        tokio::fs::write(&path, "{ not json").await?;
        let directory = FileStudentDirectory::new(&path, DatasetKind::JsonFile);
        let ctx = RequestContext::new_request();

        let error = directory
            .list_students(&ctx)
            .await
            .err()
            .ok_or("expected a load failure")?;
        assert_eq!(error.kind, ErrorKind::Unexpected);
        assert_eq!(error.code, ErrorCode::new("dataset", "malformed_json"));
        assert!(error.metadata.contains_key("path"));

        tokio::fs::remove_file(&path).await?;
        Ok(())
    }

    #[tokio::test]
    async fn missing_files_report_io_errors() -> std::result::Result<(), Box<dyn Error>> {
        let directory =
            FileStudentDirectory::new(scratch_file("missing.json"), DatasetKind::JsonFile);
        let error = directory
            .list_students(&RequestContext::new_request())
            .await
            .err()
            .ok_or("expected a missing-file failure")?;
        assert_eq!(error.code, ErrorCode::new("dataset", "io"));
        assert!(error.class.is_retriable());
        assert_eq!(directory.info().kind, DatasetKind::JsonFile);
        Ok(())
    }
}
