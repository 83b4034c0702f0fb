//! Local CLI orchestration helpers.

use crate::http_server::{bind_listener, serve, shutdown_signal};
use crate::{InfraError, InfraResult, PortalRuntime};
use results_portal_api::v1::{
    ApiV1LookupResponse, ApiV1StudentDto, lookup_result_to_api_v1, student_to_api_v1,
};
use results_portal_app::{ProbeReport, default_probe_suite, list_students, lookup_student, run_probe};
use results_portal_config::load_portal_config_std_env;
use results_portal_domain::LookupQuery;
use results_portal_shared::{CorrelationId, RequestContext};
use std::future::Future;
use std::path::Path;

/// Response the validation endpoint would produce for a query.
#[derive(Debug, Clone, PartialEq)]
pub struct LocalLookup {
    /// HTTP status the response would carry.
    pub status: u16,
    /// Response body.
    pub response: ApiV1LookupResponse,
}

/// Load the effective config from std env and compose a runtime.
pub fn load_runtime(
    config_path: Option<&Path>,
    overrides_json: Option<&str>,
) -> InfraResult<PortalRuntime> {
    let config = load_portal_config_std_env(config_path, overrides_json)?;
    PortalRuntime::from_config(config)
}

/// Run the validation contract in-process.
pub fn run_lookup_local(
    config_path: Option<&Path>,
    overrides_json: Option<&str>,
    query: &LookupQuery,
) -> InfraResult<LocalLookup> {
    let runtime = load_runtime(config_path, overrides_json)?;
    run_current_thread(async { Ok(lookup_with_runtime(&runtime, query).await) })
}

/// Every record in wire shape, ordered by seat number.
pub fn run_students_local(
    config_path: Option<&Path>,
    overrides_json: Option<&str>,
) -> InfraResult<Vec<ApiV1StudentDto>> {
    let runtime = load_runtime(config_path, overrides_json)?;
    run_current_thread(students_with_runtime(&runtime))
}

/// Run the default probe suite against `base_url` (or the configured one).
///
/// Ctrl-C cancels the run between cases.
pub fn run_probe_local(
    config_path: Option<&Path>,
    overrides_json: Option<&str>,
    base_url: Option<&str>,
) -> InfraResult<ProbeReport> {
    let runtime = load_runtime(config_path, overrides_json)?;
    run_current_thread(probe_with_runtime(&runtime, base_url))
}

/// Bind the configured address and serve until Ctrl-C.
pub fn run_server_local(config_path: Option<&Path>, overrides_json: Option<&str>) -> InfraResult<()> {
    let runtime = load_runtime(config_path, overrides_json)?;
    let executor = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .map_err(InfraError::from)?;
    executor.block_on(async move {
        let listener = bind_listener(runtime.config().bind()).await?;
        serve(listener, runtime, shutdown_signal()).await
    })
}

async fn lookup_with_runtime(runtime: &PortalRuntime, query: &LookupQuery) -> LocalLookup {
    let ctx = RequestContext::new_request();
    let result = lookup_student(&ctx, &runtime.lookup_deps(&ctx), query).await;
    let reply = lookup_result_to_api_v1(&result);
    LocalLookup {
        status: reply.status,
        response: reply.body,
    }
}

async fn students_with_runtime(runtime: &PortalRuntime) -> InfraResult<Vec<ApiV1StudentDto>> {
    let ctx = RequestContext::new_request();
    let records = list_students(&ctx, &runtime.list_deps(&ctx)).await?;
    Ok(records
        .iter()
        .map(|record| student_to_api_v1(record))
        .collect())
}

async fn probe_with_runtime(
    runtime: &PortalRuntime,
    base_url: Option<&str>,
) -> InfraResult<ProbeReport> {
    let ctx = RequestContext::new(CorrelationId::new_probe_id());
    let deps = runtime.probe_deps(&ctx, base_url)?;
    let suite = default_probe_suite();

    let cancel = ctx.clone();
    let watcher = tokio::spawn(async move {
        shutdown_signal().await;
        cancel.cancel();
    });
    let report = run_probe(&ctx, &deps, &suite).await;
    watcher.abort();
    report
}

fn run_current_thread<F, T>(future: F) -> InfraResult<T>
where
    F: Future<Output = InfraResult<T>>,
{
    let executor = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .map_err(InfraError::from)?;
    executor.block_on(future)
}
