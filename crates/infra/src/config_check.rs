//! Config loading helpers for CLI surfaces.

use crate::InfraResult;
use results_portal_config::{
    PortalEnv, ValidatedPortalConfig, load_portal_config_from_path, to_pretty_json, to_pretty_toml,
};
use results_portal_shared::ErrorEnvelope;
use std::collections::BTreeMap;
use std::path::Path;

/// Output format for `config show`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ConfigDocFormat {
    /// Pretty JSON.
    #[default]
    Json,
    /// Pretty TOML.
    Toml,
}

/// Load and validate the effective config from an explicit env map.
pub fn load_validated_config(
    env: &BTreeMap<String, String>,
    config_path: Option<&Path>,
    overrides_json: Option<&str>,
) -> InfraResult<ValidatedPortalConfig> {
    let env = PortalEnv::from_map(env).map_err(ErrorEnvelope::from)?;
    load_portal_config_from_path(config_path, overrides_json, &env)
}

/// Load and validate the effective config, returning deterministic pretty JSON.
pub fn load_effective_config_json(
    env: &BTreeMap<String, String>,
    config_path: Option<&Path>,
    overrides_json: Option<&str>,
) -> InfraResult<String> {
    load_effective_config(env, config_path, overrides_json, ConfigDocFormat::Json)
}

/// Load and validate the effective config, rendered in the requested format.
pub fn load_effective_config(
    env: &BTreeMap<String, String>,
    config_path: Option<&Path>,
    overrides_json: Option<&str>,
    format: ConfigDocFormat,
) -> InfraResult<String> {
    let config = load_validated_config(env, config_path, overrides_json)?;
    match format {
        ConfigDocFormat::Json => to_pretty_json(&config),
        ConfigDocFormat::Toml => to_pretty_toml(&config),
    }
}
