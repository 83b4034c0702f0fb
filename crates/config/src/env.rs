//! Environment variable parsing and env-to-config merging.
//!
//! This module keeps env parsing:
//! - strict (invalid values fail fast)
//! - safe (secret-looking values are redacted in error metadata)

use crate::schema::{DatasetSource, LogFormat, PortalConfig, ValidatedPortalConfig};
use results_portal_shared::{ErrorCode, ErrorEnvelope, REDACTED_VALUE, is_secret_key};
use std::collections::BTreeMap;
use std::fmt;
use url::Url;

/// Env var: server listen address.
pub const ENV_SERVER_BIND: &str = "RP_SERVER_BIND";
/// Env var: CORS allowed origin.
pub const ENV_SERVER_ALLOWED_ORIGIN: &str = "RP_SERVER_ALLOWED_ORIGIN";
/// Env var: deployment label.
pub const ENV_SERVER_ENVIRONMENT: &str = "RP_SERVER_ENVIRONMENT";
/// Env var: dataset source (`builtin` | `file`).
pub const ENV_DATASET_SOURCE: &str = "RP_DATASET_SOURCE";
/// Env var: dataset file path.
pub const ENV_DATASET_PATH: &str = "RP_DATASET_PATH";
/// Env var: log level.
pub const ENV_LOG_LEVEL: &str = "RP_LOG_LEVEL";
/// Env var: log format (`text` | `json`).
pub const ENV_LOG_FORMAT: &str = "RP_LOG_FORMAT";
/// Env var: probe base URL.
pub const ENV_PROBE_BASE_URL: &str = "RP_PROBE_BASE_URL";
/// Env var: probe timeout in milliseconds.
pub const ENV_PROBE_TIMEOUT_MS: &str = "RP_PROBE_TIMEOUT_MS";

/// Every env var the portal reads, in documentation order.
pub const PORTAL_ENV_VARS: [&str; 9] = [
    ENV_SERVER_BIND,
    ENV_SERVER_ALLOWED_ORIGIN,
    ENV_SERVER_ENVIRONMENT,
    ENV_DATASET_SOURCE,
    ENV_DATASET_PATH,
    ENV_LOG_LEVEL,
    ENV_LOG_FORMAT,
    ENV_PROBE_BASE_URL,
    ENV_PROBE_TIMEOUT_MS,
];

/// Parsed env overrides.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PortalEnv {
    /// Server listen address.
    pub server_bind: Option<Box<str>>,
    /// CORS allowed origin.
    pub server_allowed_origin: Option<Box<str>>,
    /// Deployment label.
    pub server_environment: Option<Box<str>>,
    /// Dataset source.
    pub dataset_source: Option<DatasetSource>,
    /// Dataset file path.
    pub dataset_path: Option<Box<str>>,
    /// Log level.
    pub log_level: Option<Box<str>>,
    /// Log format.
    pub log_format: Option<LogFormat>,
    /// Probe base URL.
    pub probe_base_url: Option<Box<str>>,
    /// Probe timeout (ms).
    pub probe_timeout_ms: Option<u64>,
}

impl PortalEnv {
    /// Parse env overrides from a key/value map (useful for tests and fixtures).
    pub fn from_map(map: &BTreeMap<String, String>) -> Result<Self, EnvParseError> {
        Ok(Self {
            server_bind: parse_optional_trimmed_string(map, ENV_SERVER_BIND)?,
            server_allowed_origin: parse_optional_trimmed_string(map, ENV_SERVER_ALLOWED_ORIGIN)?,
            server_environment: parse_optional_trimmed_string(map, ENV_SERVER_ENVIRONMENT)?,
            dataset_source: parse_optional_dataset_source(map, ENV_DATASET_SOURCE)?,
            dataset_path: parse_optional_trimmed_string(map, ENV_DATASET_PATH)?,
            log_level: parse_optional_trimmed_string(map, ENV_LOG_LEVEL)?,
            log_format: parse_optional_log_format(map, ENV_LOG_FORMAT)?,
            probe_base_url: parse_optional_url_string(map, ENV_PROBE_BASE_URL)?,
            probe_timeout_ms: parse_optional_u64(map, ENV_PROBE_TIMEOUT_MS)?,
        })
    }

    /// Parse env overrides from the process environment.
    pub fn from_std_env() -> Result<Self, EnvParseError> {
        let mut map = BTreeMap::new();
        for name in PORTAL_ENV_VARS {
            if let Ok(value) = std::env::var(name) {
                map.insert(name.to_string(), value);
            }
        }

        Self::from_map(&map)
    }

    /// Returns true when no override is set.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self == &Self::default()
    }
}

/// Apply env overrides to a base config (env wins over file/default values).
pub fn apply_env_overrides(
    base: PortalConfig,
    env: &PortalEnv,
) -> Result<ValidatedPortalConfig, ErrorEnvelope> {
    let mut config = base;
    apply_server_env_overrides(&mut config, env);
    apply_dataset_env_overrides(&mut config, env);
    apply_logging_env_overrides(&mut config, env);
    apply_probe_env_overrides(&mut config, env);

    config.validate_and_normalize().map_err(Into::into)
}

fn apply_server_env_overrides(config: &mut PortalConfig, env: &PortalEnv) {
    set_box_str(&mut config.server.bind, env.server_bind.as_deref());
    set_box_str(
        &mut config.server.allowed_origin,
        env.server_allowed_origin.as_deref(),
    );
    set_box_str(
        &mut config.server.environment,
        env.server_environment.as_deref(),
    );
}

fn apply_dataset_env_overrides(config: &mut PortalConfig, env: &PortalEnv) {
    if let Some(source) = env.dataset_source {
        config.dataset.source = source;
    }
    if let Some(path) = env.dataset_path.as_deref() {
        config.dataset.path = Some(path.into());
    }
}

fn apply_logging_env_overrides(config: &mut PortalConfig, env: &PortalEnv) {
    set_box_str(&mut config.logging.level, env.log_level.as_deref());
    if let Some(format) = env.log_format {
        config.logging.format = format;
    }
}

fn apply_probe_env_overrides(config: &mut PortalConfig, env: &PortalEnv) {
    set_box_str(&mut config.probe.base_url, env.probe_base_url.as_deref());
    if let Some(timeout_ms) = env.probe_timeout_ms {
        config.probe.timeout_ms = timeout_ms;
    }
}

fn set_box_str(field: &mut Box<str>, value: Option<&str>) {
    if let Some(value) = value {
        *field = value.to_owned().into_boxed_str();
    }
}

/// Validation failures when parsing env variables.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EnvParseError {
    /// An env var was present but empty after trimming.
    EmptyValue {
        /// Env var name.
        var: &'static str,
    },
    /// Integer env var had an invalid value.
    InvalidInt {
        /// Env var name.
        var: &'static str,
        /// Raw input value.
        value: String,
    },
    /// URL env var had an invalid value.
    InvalidUrl {
        /// Env var name.
        var: &'static str,
        /// Raw input value.
        value: String,
    },
    /// Enum env var had an invalid value.
    InvalidEnum {
        /// Env var name.
        var: &'static str,
        /// Raw input value.
        value: String,
    },
}

impl EnvParseError {
    fn error_code(&self) -> ErrorCode {
        match self {
            Self::EmptyValue { .. } => ErrorCode::new("config", "empty_env_var"),
            Self::InvalidInt { .. } => ErrorCode::new("config", "invalid_env_int"),
            Self::InvalidUrl { .. } => ErrorCode::new("config", "invalid_env_url"),
            Self::InvalidEnum { .. } => ErrorCode::new("config", "invalid_env_enum"),
        }
    }
}

impl fmt::Display for EnvParseError {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::EmptyValue { var } => write!(formatter, "{var} must be non-empty"),
            Self::InvalidInt { var, .. } => write!(formatter, "{var} must be an integer"),
            Self::InvalidUrl { var, .. } => write!(formatter, "{var} must be a valid URL"),
            Self::InvalidEnum { var, .. } => write!(formatter, "{var} has an unsupported value"),
        }
    }
}

impl std::error::Error for EnvParseError {}

impl From<EnvParseError> for ErrorEnvelope {
    fn from(error: EnvParseError) -> Self {
        let code = error.error_code();
        let message = error.to_string();
        let envelope = Self::expected(code, message);

        match error {
            EnvParseError::EmptyValue { var } => envelope.with_metadata("env_var", var),
            EnvParseError::InvalidInt { var, value }
            | EnvParseError::InvalidUrl { var, value }
            | EnvParseError::InvalidEnum { var, value } => envelope
                .with_metadata("env_var", var)
                .with_metadata("value", redact_value(var, &value)),
        }
    }
}

fn parse_optional_trimmed_string(
    map: &BTreeMap<String, String>,
    var: &'static str,
) -> Result<Option<Box<str>>, EnvParseError> {
    let Some(raw) = map.get(var) else {
        return Ok(None);
    };

    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(EnvParseError::EmptyValue { var });
    }

    Ok(Some(trimmed.to_owned().into_boxed_str()))
}

fn parse_optional_u64(
    map: &BTreeMap<String, String>,
    var: &'static str,
) -> Result<Option<u64>, EnvParseError> {
    let Some(trimmed) = parse_optional_trimmed_string(map, var)? else {
        return Ok(None);
    };

    trimmed
        .parse::<u64>()
        .map(Some)
        .map_err(|_| EnvParseError::InvalidInt {
            var,
            value: trimmed.into_string(),
        })
}

fn parse_optional_dataset_source(
    map: &BTreeMap<String, String>,
    var: &'static str,
) -> Result<Option<DatasetSource>, EnvParseError> {
    let Some(trimmed) = parse_optional_trimmed_string(map, var)? else {
        return Ok(None);
    };

    match trimmed.to_ascii_lowercase().as_str() {
        "builtin" => Ok(Some(DatasetSource::Builtin)),
        "file" => Ok(Some(DatasetSource::File)),
        _ => Err(EnvParseError::InvalidEnum {
            var,
            value: trimmed.into_string(),
        }),
    }
}

fn parse_optional_log_format(
    map: &BTreeMap<String, String>,
    var: &'static str,
) -> Result<Option<LogFormat>, EnvParseError> {
    let Some(trimmed) = parse_optional_trimmed_string(map, var)? else {
        return Ok(None);
    };

    match trimmed.to_ascii_lowercase().as_str() {
        "text" => Ok(Some(LogFormat::Text)),
        "json" => Ok(Some(LogFormat::Json)),
        _ => Err(EnvParseError::InvalidEnum {
            var,
            value: trimmed.into_string(),
        }),
    }
}

fn parse_optional_url_string(
    map: &BTreeMap<String, String>,
    var: &'static str,
) -> Result<Option<Box<str>>, EnvParseError> {
    let Some(trimmed) = parse_optional_trimmed_string(map, var)? else {
        return Ok(None);
    };

    let invalid = || EnvParseError::InvalidUrl {
        var,
        value: trimmed.to_string(),
    };
    let parsed = Url::parse(&trimmed).map_err(|_| invalid())?;
    if parsed.scheme() != "http" && parsed.scheme() != "https" {
        return Err(invalid());
    }

    Ok(Some(trimmed))
}

fn redact_value(var: &str, value: &str) -> String {
    if is_secret_key(var) {
        REDACTED_VALUE.to_string()
    } else {
        value.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::error::Error;

    fn env_map(pairs: &[(&str, &str)]) -> BTreeMap<String, String> {
        pairs
            .iter()
            .map(|(key, value)| ((*key).to_string(), (*value).to_string()))
            .collect()
    }

    #[test]
    fn missing_vars_parse_to_empty_env() -> Result<(), Box<dyn Error>> {
        let env = PortalEnv::from_map(&BTreeMap::new())?;
        assert!(env.is_empty());
        assert_eq!(parse_optional_u64(&BTreeMap::new(), "MISSING")?, None);
        Ok(())
    }

    #[test]
    fn enums_are_case_insensitive() -> Result<(), Box<dyn Error>> {
        let env = PortalEnv::from_map(&env_map(&[
            (ENV_DATASET_SOURCE, " FILE "),
            (ENV_LOG_FORMAT, "Json"),
        ]))?;
        assert_eq!(env.dataset_source, Some(DatasetSource::File));
        assert_eq!(env.log_format, Some(LogFormat::Json));
        Ok(())
    }

    #[test]
    fn url_validation_accepts_http_and_https() -> Result<(), Box<dyn Error>> {
        let env = PortalEnv::from_map(&env_map(&[(
            ENV_PROBE_BASE_URL,
            "https://results.example.edu",
        )]))?;
        assert_eq!(
            env.probe_base_url.as_deref(),
            Some("https://results.example.edu")
        );

        let error = PortalEnv::from_map(&env_map(&[(ENV_PROBE_BASE_URL, "ftp://example.com")]))
            .err();
        assert!(matches!(error, Some(EnvParseError::InvalidUrl { .. })));
        Ok(())
    }

    #[test]
    fn empty_values_fail_with_env_var_metadata() -> Result<(), Box<dyn Error>> {
        let error = PortalEnv::from_map(&env_map(&[(ENV_PROBE_TIMEOUT_MS, "   ")])).err();
        let envelope: ErrorEnvelope = error
            .ok_or_else(|| std::io::Error::other("expected empty value error"))?
            .into();

        assert_eq!(envelope.code, ErrorCode::new("config", "empty_env_var"));
        assert_eq!(
            envelope.metadata.get("env_var").map(String::as_str),
            Some(ENV_PROBE_TIMEOUT_MS)
        );
        assert!(!envelope.metadata.contains_key("value"));
        Ok(())
    }

    #[test]
    fn env_overrides_win_and_are_validated() -> Result<(), Box<dyn Error>> {
        let env = PortalEnv::from_map(&env_map(&[
            (ENV_SERVER_BIND, "0.0.0.0:8080"),
            (ENV_PROBE_TIMEOUT_MS, "2500"),
        ]))?;
        let config = apply_env_overrides(PortalConfig::default(), &env)?;
        assert_eq!(config.bind().port(), 8080);
        assert_eq!(config.probe.timeout_ms, 2500);

        let too_fast = PortalEnv {
            probe_timeout_ms: Some(1),
            ..PortalEnv::default()
        };
        let error = apply_env_overrides(PortalConfig::default(), &too_fast).err();
        assert_eq!(
            error.map(|error| error.code),
            Some(ErrorCode::new("config", "invalid_timeout"))
        );
        Ok(())
    }
}
