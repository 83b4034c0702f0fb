//! # results-portal-facade
//!
//! Facade API for consumers (the CLI and other Rust hosts).
//! This crate depends on `infra`, `api`, and `app`.

pub use results_portal_api::v1::{ApiV1LookupResponse, ApiV1StudentDto};
pub use results_portal_app::{ProbeOutcome, ProbeReport};
pub use results_portal_config::{LogFormat, LoggingConfig};
pub use results_portal_domain::LookupQuery;
use std::collections::BTreeMap;
use std::path::Path;

/// Returns the facade crate version.
#[must_use]
pub const fn facade_crate_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

/// Infra error type (shared error envelope).
pub use results_portal_infra::InfraError;
/// Error kind carried by [`InfraError`].
pub use results_portal_shared::ErrorKind;

/// In-process validation result.
pub use results_portal_infra::LocalLookup;
/// Output format for the effective config.
pub use results_portal_infra::ConfigDocFormat;
/// Re-export redaction utilities for CLI boundary sanitization.
pub use results_portal_infra::{is_secret_key, redact_if_sensitive};

/// Validate that the provided env overrides can be parsed and merged into a config.
pub fn validate_env_parsing(env: &BTreeMap<String, String>) -> Result<(), InfraError> {
    results_portal_infra::validate_env_parsing(env)
}

/// Load and validate the effective config, returning deterministic pretty JSON.
pub fn load_effective_config_json(
    env: &BTreeMap<String, String>,
    config_path: Option<&Path>,
    overrides_json: Option<&str>,
) -> Result<String, InfraError> {
    results_portal_infra::load_effective_config_json(env, config_path, overrides_json)
}

/// Load and validate the effective config in the requested format.
pub fn load_effective_config(
    env: &BTreeMap<String, String>,
    config_path: Option<&Path>,
    overrides_json: Option<&str>,
    format: ConfigDocFormat,
) -> Result<String, InfraError> {
    results_portal_infra::load_effective_config(env, config_path, overrides_json, format)
}

/// Logging section of the effective config.
pub fn load_logging_config(
    env: &BTreeMap<String, String>,
    config_path: Option<&Path>,
) -> Result<LoggingConfig, InfraError> {
    let config = results_portal_infra::load_validated_config(env, config_path, None)?;
    Ok(config.logging.clone())
}

/// Serve the portal until Ctrl-C.
pub fn run_server_local(
    config_path: Option<&Path>,
    overrides_json: Option<&str>,
) -> Result<(), InfraError> {
    results_portal_infra::run_server_local(config_path, overrides_json)
}

/// Run the validation contract in-process.
pub fn run_lookup_local(
    config_path: Option<&Path>,
    overrides_json: Option<&str>,
    query: &LookupQuery,
) -> Result<LocalLookup, InfraError> {
    results_portal_infra::run_lookup_local(config_path, overrides_json, query)
}

/// List every record in wire shape.
pub fn run_students_local(
    config_path: Option<&Path>,
    overrides_json: Option<&str>,
) -> Result<Vec<ApiV1StudentDto>, InfraError> {
    results_portal_infra::run_students_local(config_path, overrides_json)
}

/// Run the end-to-end probe suite.
pub fn run_probe_local(
    config_path: Option<&Path>,
    overrides_json: Option<&str>,
    base_url: Option<&str>,
) -> Result<ProbeReport, InfraError> {
    results_portal_infra::run_probe_local(config_path, overrides_json, base_url)
}
