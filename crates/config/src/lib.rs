//! # results-portal-config
//!
//! Configuration schema, env parsing, and layered loading for the portal
//! server and the probe harness. This crate depends on `shared` only.

/// Environment variable parsing and merging.
pub mod env;
/// Config loading helpers (env + file + overrides).
pub mod load;
/// Configuration schema types and helpers.
pub mod schema;

pub use env::{
    ENV_DATASET_PATH, ENV_DATASET_SOURCE, ENV_LOG_FORMAT, ENV_LOG_LEVEL, ENV_PROBE_BASE_URL,
    ENV_PROBE_TIMEOUT_MS, ENV_SERVER_ALLOWED_ORIGIN, ENV_SERVER_BIND, ENV_SERVER_ENVIRONMENT,
    EnvParseError, PORTAL_ENV_VARS, PortalEnv, apply_env_overrides,
};
pub use load::{
    load_portal_config_from_path, load_portal_config_from_sources, load_portal_config_std_env,
    to_pretty_json, to_pretty_toml,
};
pub use schema::{
    CURRENT_CONFIG_VERSION, ConfigSchemaError, DEFAULT_BIND, DEFAULT_PROBE_BASE_URL,
    DEFAULT_PROBE_TIMEOUT_MS, DatasetConfig, DatasetSource, DatasetSpec, LogFormat, LoggingConfig,
    PortalConfig, ProbeConfig, ServerConfig, ValidatedPortalConfig, parse_portal_config_json,
    parse_portal_config_toml,
};

/// Returns the config crate version.
#[must_use]
pub const fn config_crate_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
