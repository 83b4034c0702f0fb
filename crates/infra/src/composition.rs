//! Adapter selection and runtime composition.

use crate::InfraResult;
use results_portal_adapters::{
    FileStudentDirectory, InMemoryStudentDirectory, LopdfSheetRenderer, ReqwestProbeTransport,
    TracingLogger,
};
use results_portal_app::{ExportResultDeps, ListStudentsDeps, LookupStudentDeps, RunProbeDeps};
use results_portal_config::{DatasetSpec, ValidatedPortalConfig};
use results_portal_ports::{
    DatasetKind, LogFields, LoggerPort, ResultSheetRendererPort, StudentDirectoryPort,
};
use results_portal_shared::RequestContext;
use serde_json::Value;
use std::sync::Arc;

/// Build the student directory selected by `dataset`.
pub fn build_directory(dataset: &DatasetSpec) -> InfraResult<Arc<dyn StudentDirectoryPort>> {
    match dataset {
        DatasetSpec::Builtin => Ok(Arc::new(InMemoryStudentDirectory::builtin()?)),
        DatasetSpec::JsonFile(path) => Ok(Arc::new(FileStudentDirectory::new(
            path.clone(),
            DatasetKind::JsonFile,
        ))),
        DatasetSpec::CsvFile(path) => Ok(Arc::new(FileStudentDirectory::new(
            path.clone(),
            DatasetKind::CsvFile,
        ))),
    }
}

/// Build the structured logger tagged with the deployment environment.
pub fn build_logger(config: &ValidatedPortalConfig) -> Arc<dyn LoggerPort> {
    let mut fields = LogFields::new();
    fields.insert(
        "environment".into(),
        Value::from(config.server.environment.as_ref()),
    );
    Arc::new(TracingLogger::new().with_base_fields(fields))
}

/// Long-lived adapters shared by every request.
#[derive(Clone)]
pub struct PortalRuntime {
    config: Arc<ValidatedPortalConfig>,
    directory: Arc<dyn StudentDirectoryPort>,
    logger: Arc<dyn LoggerPort>,
    renderer: Arc<dyn ResultSheetRendererPort>,
}

impl PortalRuntime {
    /// Compose the runtime from a validated config.
    pub fn from_config(config: ValidatedPortalConfig) -> InfraResult<Self> {
        let directory = build_directory(config.dataset())?;
        let logger = build_logger(&config);
        Ok(Self {
            config: Arc::new(config),
            directory,
            logger,
            renderer: Arc::new(LopdfSheetRenderer::new()),
        })
    }

    /// Compose the runtime around an existing directory.
    pub fn with_directory(
        config: ValidatedPortalConfig,
        directory: Arc<dyn StudentDirectoryPort>,
    ) -> Self {
        let logger = build_logger(&config);
        Self {
            config: Arc::new(config),
            directory,
            logger,
            renderer: Arc::new(LopdfSheetRenderer::new()),
        }
    }

    /// Effective configuration.
    pub fn config(&self) -> &ValidatedPortalConfig {
        &self.config
    }

    /// Shared student directory.
    pub fn directory(&self) -> &Arc<dyn StudentDirectoryPort> {
        &self.directory
    }

    /// Logger tagged with the request's correlation id.
    pub fn request_logger(&self, ctx: &RequestContext) -> Arc<dyn LoggerPort> {
        let mut fields = LogFields::new();
        fields.insert(
            "requestId".into(),
            Value::from(ctx.correlation_id().as_str()),
        );
        Arc::from(self.logger.child(fields))
    }

    /// Lookup use-case dependencies for one request.
    pub fn lookup_deps(&self, ctx: &RequestContext) -> LookupStudentDeps {
        LookupStudentDeps {
            directory: Arc::clone(&self.directory),
            logger: Some(self.request_logger(ctx)),
        }
    }

    /// Export use-case dependencies for one request.
    pub fn export_deps(&self, ctx: &RequestContext) -> ExportResultDeps {
        ExportResultDeps {
            lookup: self.lookup_deps(ctx),
            renderer: Arc::clone(&self.renderer),
        }
    }

    /// Listing use-case dependencies for one request.
    pub fn list_deps(&self, ctx: &RequestContext) -> ListStudentsDeps {
        ListStudentsDeps {
            directory: Arc::clone(&self.directory),
            logger: Some(self.request_logger(ctx)),
        }
    }

    /// Probe dependencies targeting `base_url`, or the configured probe URL.
    pub fn probe_deps(
        &self,
        ctx: &RequestContext,
        base_url: Option<&str>,
    ) -> InfraResult<RunProbeDeps> {
        let base_url = base_url.unwrap_or_else(|| self.config.probe.base_url.as_ref());
        let transport = ReqwestProbeTransport::new(base_url, self.config.probe.timeout_ms)?;
        Ok(RunProbeDeps {
            transport: Arc::new(transport),
            logger: Some(self.request_logger(ctx)),
        })
    }
}
