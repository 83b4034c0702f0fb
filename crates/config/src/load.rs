//! Config loading helpers (env + file + overrides).
//!
//! The loader is responsible for deterministic merge order and surfacing
//! user-facing errors as typed `ErrorEnvelope`s.

use crate::{
    DatasetSource, LogFormat, PortalConfig, PortalEnv, ValidatedPortalConfig, apply_env_overrides,
};
use results_portal_shared::{ErrorClass, ErrorCode, ErrorEnvelope};
use serde::Deserialize;
use std::path::Path;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ConfigFormat {
    Json,
    Toml,
}

/// Load the portal config from sources using a deterministic precedence order.
///
/// Precedence (highest wins):
/// - env overrides (`PortalEnv`)
/// - overrides JSON (partial config)
/// - config JSON (file content)
/// - defaults (`PortalConfig::default()`)
pub fn load_portal_config_from_sources(
    config_json: Option<&str>,
    overrides_json: Option<&str>,
    env: &PortalEnv,
) -> Result<ValidatedPortalConfig, ErrorEnvelope> {
    let config = match config_json {
        None => PortalConfig::default(),
        Some(input) => parse_config_unvalidated(input, ConfigFormat::Json)?,
    };

    merge_and_validate(config, overrides_json, env)
}

/// Load the portal config from an optional `.json` / `.toml` file path.
pub fn load_portal_config_from_path(
    config_path: Option<&Path>,
    overrides_json: Option<&str>,
    env: &PortalEnv,
) -> Result<ValidatedPortalConfig, ErrorEnvelope> {
    let config = match config_path {
        None => PortalConfig::default(),
        Some(path) => {
            let format = detect_config_format(path)?;
            let config_text = read_config_file(path)?;
            parse_config_unvalidated(&config_text, format)?
        },
    };

    merge_and_validate(config, overrides_json, env)
}

/// Load the portal config from std env and an optional file path.
pub fn load_portal_config_std_env(
    config_path: Option<&Path>,
    overrides_json: Option<&str>,
) -> Result<ValidatedPortalConfig, ErrorEnvelope> {
    let env = PortalEnv::from_std_env().map_err(ErrorEnvelope::from)?;
    load_portal_config_from_path(config_path, overrides_json, &env)
}

/// Serialize the config as deterministic pretty JSON (with trailing newline).
pub fn to_pretty_json(config: &PortalConfig) -> Result<String, ErrorEnvelope> {
    let mut output = serde_json::to_string_pretty(config).map_err(|error| {
        ErrorEnvelope::unexpected(
            ErrorCode::new("config", "serialize_json"),
            format!("failed to serialize config: {error}"),
            ErrorClass::NonRetriable,
        )
    })?;
    output.push('\n');
    Ok(output)
}

/// Serialize the config as deterministic pretty TOML (with trailing newline).
pub fn to_pretty_toml(config: &PortalConfig) -> Result<String, ErrorEnvelope> {
    let mut output = toml::to_string_pretty(config).map_err(|error| {
        ErrorEnvelope::unexpected(
            ErrorCode::new("config", "serialize_toml"),
            format!("failed to serialize config TOML: {error}"),
            ErrorClass::NonRetriable,
        )
    })?;
    output.push('\n');
    Ok(output)
}

fn merge_and_validate(
    mut config: PortalConfig,
    overrides_json: Option<&str>,
    env: &PortalEnv,
) -> Result<ValidatedPortalConfig, ErrorEnvelope> {
    if let Some(input) = overrides_json {
        let overrides = parse_overrides_json(input)?;
        overrides.apply(&mut config);
    }

    // env is applied last and also validates/normalizes the resulting config.
    apply_env_overrides(config, env)
}

fn parse_config_unvalidated(
    input: &str,
    format: ConfigFormat,
) -> Result<PortalConfig, ErrorEnvelope> {
    match format {
        ConfigFormat::Json => serde_json::from_str(input).map_err(|error| {
            ErrorEnvelope::expected(
                ErrorCode::new("config", "invalid_json"),
                format!("invalid config JSON: {error}"),
            )
            .with_metadata("source", "config")
        }),
        ConfigFormat::Toml => toml::from_str(input).map_err(|error| {
            ErrorEnvelope::expected(
                ErrorCode::new("config", "invalid_toml"),
                format!("invalid config TOML: {error}"),
            )
            .with_metadata("source", "config")
        }),
    }
}

fn parse_overrides_json(input: &str) -> Result<PortalConfigOverrides, ErrorEnvelope> {
    serde_json::from_str(input).map_err(|error| {
        ErrorEnvelope::expected(
            ErrorCode::new("config", "invalid_json"),
            format!("invalid overrides JSON: {error}"),
        )
        .with_metadata("source", "overrides")
    })
}

fn read_config_file(path: &Path) -> Result<String, ErrorEnvelope> {
    std::fs::read_to_string(path).map_err(|error| {
        let code = match error.kind() {
            std::io::ErrorKind::NotFound => ErrorCode::new("config", "config_file_not_found"),
            std::io::ErrorKind::PermissionDenied => {
                ErrorCode::new("config", "config_file_permission_denied")
            },
            _ => ErrorCode::new("config", "config_file_io"),
        };

        ErrorEnvelope::expected(code, format!("failed to read config file: {error}"))
            .with_metadata("path", path.to_string_lossy().to_string())
    })
}

fn detect_config_format(path: &Path) -> Result<ConfigFormat, ErrorEnvelope> {
    let ext = path
        .extension()
        .and_then(|value| value.to_str())
        .map(str::to_ascii_lowercase);
    match ext.as_deref() {
        None | Some("json") => Ok(ConfigFormat::Json),
        Some("toml") => Ok(ConfigFormat::Toml),
        Some(other) => Err(ErrorEnvelope::expected(
            ErrorCode::new("config", "unsupported_format"),
            "unsupported config format; use .json or .toml",
        )
        .with_metadata("extension", other.to_string())),
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields, default)]
struct PortalConfigOverrides {
    version: Option<u32>,
    server: ServerOverrides,
    dataset: DatasetOverrides,
    logging: LoggingOverrides,
    probe: ProbeOverrides,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields, default)]
struct ServerOverrides {
    bind: Option<Box<str>>,
    allowed_origin: Option<Box<str>>,
    environment: Option<Box<str>>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields, default)]
struct DatasetOverrides {
    source: Option<DatasetSource>,
    path: Option<Box<str>>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields, default)]
struct LoggingOverrides {
    level: Option<Box<str>>,
    format: Option<LogFormat>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields, default)]
struct ProbeOverrides {
    base_url: Option<Box<str>>,
    timeout_ms: Option<u64>,
}

impl PortalConfigOverrides {
    fn apply(self, config: &mut PortalConfig) {
        if let Some(version) = self.version {
            config.version = version;
        }

        let server = self.server;
        set_if_some(&mut config.server.bind, server.bind);
        set_if_some(&mut config.server.allowed_origin, server.allowed_origin);
        set_if_some(&mut config.server.environment, server.environment);

        set_if_some(&mut config.dataset.source, self.dataset.source);
        if let Some(path) = self.dataset.path {
            config.dataset.path = Some(path);
        }

        set_if_some(&mut config.logging.level, self.logging.level);
        set_if_some(&mut config.logging.format, self.logging.format);

        set_if_some(&mut config.probe.base_url, self.probe.base_url);
        set_if_some(&mut config.probe.timeout_ms, self.probe.timeout_ms);
    }
}

fn set_if_some<T>(field: &mut T, value: Option<T>) {
    if let Some(value) = value {
        *field = value;
    }
}
