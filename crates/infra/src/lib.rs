//! # results-portal-infra
//!
//! Infrastructure wiring and runtime composition: adapter selection, the
//! axum HTTP surface, and local helpers for the CLI.
//! This crate depends on `app`, `adapters`, `api`, `config`, and `shared`.

/// Local CLI orchestration helpers.
pub mod cli_local;
/// Adapter selection and runtime composition.
pub mod composition;
/// Config loading helpers used by CLI surfaces.
pub mod config_check;
/// Environment validation helpers used by CLI surfaces.
pub mod env_check;
/// HTTP router, handlers, and serve loop.
pub mod http_server;

pub use cli_local::{
    LocalLookup, load_runtime, run_lookup_local, run_probe_local, run_server_local,
    run_students_local,
};
pub use composition::{PortalRuntime, build_directory, build_logger};
pub use config_check::{
    ConfigDocFormat, load_effective_config, load_effective_config_json, load_validated_config,
};
pub use env_check::{InfraError, InfraResult, validate_env_parsing};
pub use http_server::{
    CORS_ALLOW_HEADERS, CORS_ALLOW_METHODS, REQUEST_ID_HEADER, STUDENTS_CACHE_CONTROL,
    ServerError, bind_listener, build_router, serve, shutdown_signal,
};

// Re-export redaction utilities for CLI boundary sanitization
pub use results_portal_shared::{is_secret_key, redact_if_sensitive};

/// Returns the infra crate version.
#[must_use]
pub const fn infra_crate_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
