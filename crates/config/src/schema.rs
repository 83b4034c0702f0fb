//! Portal configuration schema, defaults, validation, and normalization.
//!
//! - Deserialization uses `serde` (JSON or TOML).
//! - Validation is manual and returns typed errors mapped to `ErrorEnvelope`.
//! - Normalization trims string fields and lowercases enumerated values.

use results_portal_shared::{ErrorCode, ErrorEnvelope};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use tracing::level_filters::LevelFilter;
use url::Url;

/// Sanitizes a URL for error messages by stripping credentials.
fn sanitize_url_for_error(url: &str) -> String {
    match Url::parse(url) {
        Ok(mut parsed) => {
            if parsed.password().is_some() || !parsed.username().is_empty() {
                if parsed.set_username("").is_err() {
                    return "[invalid url: invalid username]".to_string();
                }
                if parsed.set_password(None).is_err() {
                    return "[invalid url: invalid password]".to_string();
                }
            }
            parsed.to_string()
        },
        Err(error) => format!("[invalid url: {error}]"),
    }
}

/// Current supported configuration schema version.
pub const CURRENT_CONFIG_VERSION: u32 = 1;

/// Default listen address.
pub const DEFAULT_BIND: &str = "127.0.0.1:3000";
/// Default probe target.
pub const DEFAULT_PROBE_BASE_URL: &str = "http://localhost:3000";
/// Default probe request timeout (ms).
pub const DEFAULT_PROBE_TIMEOUT_MS: u64 = 10_000;

const PROBE_TIMEOUT_MIN_MS: u64 = 100;
const PROBE_TIMEOUT_MAX_MS: u64 = 120_000;

/// Top-level portal configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields, default)]
pub struct PortalConfig {
    /// Schema version for forward-compatible migrations.
    pub version: u32,
    /// HTTP server settings.
    pub server: ServerConfig,
    /// Student dataset settings.
    pub dataset: DatasetConfig,
    /// Log output settings.
    pub logging: LoggingConfig,
    /// End-to-end probe settings.
    pub probe: ProbeConfig,
}

impl Default for PortalConfig {
    fn default() -> Self {
        Self {
            version: CURRENT_CONFIG_VERSION,
            server: ServerConfig::default(),
            dataset: DatasetConfig::default(),
            logging: LoggingConfig::default(),
            probe: ProbeConfig::default(),
        }
    }
}

impl PortalConfig {
    /// Validate and normalize the config.
    pub fn validate_and_normalize(mut self) -> Result<ValidatedPortalConfig, ConfigSchemaError> {
        self.validate_version()?;

        self.server.normalize();
        let bind = self.server.validate()?;
        self.dataset.normalize();
        let dataset = self.dataset.validate()?;
        self.logging.normalize();
        self.logging.validate()?;
        self.probe.normalize();
        let probe_base_url = self.probe.validate()?;

        Ok(ValidatedPortalConfig {
            raw: self,
            bind,
            dataset,
            probe_base_url,
        })
    }

    const fn validate_version(&self) -> Result<(), ConfigSchemaError> {
        if self.version != CURRENT_CONFIG_VERSION {
            return Err(ConfigSchemaError::UnsupportedVersion {
                found: self.version,
                supported: CURRENT_CONFIG_VERSION,
            });
        }
        Ok(())
    }
}

/// Resolved dataset location.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DatasetSpec {
    /// Compiled-in records.
    Builtin,
    /// JSON array file.
    JsonFile(PathBuf),
    /// CSV export file.
    CsvFile(PathBuf),
}

/// Validated config wrapper carrying parsed values.
#[derive(Debug, Clone)]
pub struct ValidatedPortalConfig {
    raw: PortalConfig,
    bind: SocketAddr,
    dataset: DatasetSpec,
    probe_base_url: Url,
}

impl ValidatedPortalConfig {
    /// Parsed listen address.
    #[must_use]
    pub const fn bind(&self) -> SocketAddr {
        self.bind
    }

    /// Resolved dataset location.
    #[must_use]
    pub const fn dataset(&self) -> &DatasetSpec {
        &self.dataset
    }

    /// Parsed probe base URL.
    #[must_use]
    pub const fn probe_base_url(&self) -> &Url {
        &self.probe_base_url
    }

    /// Borrow the raw config.
    #[must_use]
    pub const fn as_ref(&self) -> &PortalConfig {
        &self.raw
    }

    /// Consume the wrapper and return the raw config.
    #[must_use]
    pub fn into_inner(self) -> PortalConfig {
        self.raw
    }
}

impl AsRef<PortalConfig> for ValidatedPortalConfig {
    fn as_ref(&self) -> &PortalConfig {
        &self.raw
    }
}

impl std::ops::Deref for ValidatedPortalConfig {
    type Target = PortalConfig;

    fn deref(&self) -> &Self::Target {
        &self.raw
    }
}

/// Parse a portal config from a JSON string, applying validation and normalization.
pub fn parse_portal_config_json(input: &str) -> Result<ValidatedPortalConfig, ErrorEnvelope> {
    let config: PortalConfig = serde_json::from_str(input).map_err(|error| {
        ErrorEnvelope::expected(
            ErrorCode::new("config", "invalid_json"),
            format!("invalid config JSON: {error}"),
        )
    })?;

    config.validate_and_normalize().map_err(Into::into)
}

/// Parse a portal config from a TOML string, applying validation and normalization.
pub fn parse_portal_config_toml(input: &str) -> Result<ValidatedPortalConfig, ErrorEnvelope> {
    let config: PortalConfig = toml::from_str(input).map_err(|error| {
        ErrorEnvelope::expected(
            ErrorCode::new("config", "invalid_toml"),
            format!("invalid config TOML: {error}"),
        )
    })?;

    config.validate_and_normalize().map_err(Into::into)
}

/// HTTP server configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields, default)]
pub struct ServerConfig {
    /// Listen address (`host:port`).
    pub bind: Box<str>,
    /// Value for `Access-Control-Allow-Origin`.
    pub allowed_origin: Box<str>,
    /// Deployment label reported by diagnostics.
    pub environment: Box<str>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: DEFAULT_BIND.into(),
            allowed_origin: "*".into(),
            environment: "development".into(),
        }
    }
}

impl ServerConfig {
    fn normalize(&mut self) {
        self.bind = trim_box(&self.bind);
        self.allowed_origin = trim_box(&self.allowed_origin);
        self.environment = trim_box(&self.environment);
    }

    fn validate(&self) -> Result<SocketAddr, ConfigSchemaError> {
        ensure_non_empty("server", "allowedOrigin", &self.allowed_origin)?;
        ensure_non_empty("server", "environment", &self.environment)?;
        if self
            .allowed_origin
            .chars()
            .any(|ch| ch.is_control() || ch == ',')
        {
            return Err(ConfigSchemaError::InvalidValue {
                section: "server",
                field: "allowedOrigin",
                reason: "must be a single origin or *".to_owned(),
            });
        }

        self.bind
            .parse::<SocketAddr>()
            .map_err(|_| ConfigSchemaError::InvalidBindAddress {
                value: self.bind.to_string(),
            })
    }
}

/// Dataset source selector.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DatasetSource {
    /// Compiled-in records.
    #[default]
    Builtin,
    /// Records loaded from `dataset.path`.
    File,
}

impl DatasetSource {
    /// Stable lowercase label.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Builtin => "builtin",
            Self::File => "file",
        }
    }
}

/// Student dataset configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields, default)]
pub struct DatasetConfig {
    /// Where records come from.
    pub source: DatasetSource,
    /// Dataset file (`.json` or `.csv`), required when `source = "file"`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub path: Option<Box<str>>,
}

impl DatasetConfig {
    fn normalize(&mut self) {
        self.path = self
            .path
            .as_deref()
            .map(str::trim)
            .filter(|path| !path.is_empty())
            .map(Into::into);
    }

    fn validate(&self) -> Result<DatasetSpec, ConfigSchemaError> {
        match self.source {
            DatasetSource::Builtin => Ok(DatasetSpec::Builtin),
            DatasetSource::File => {
                let Some(path) = self.path.as_deref() else {
                    return Err(ConfigSchemaError::MissingDatasetPath);
                };
                let path = Path::new(path);
                let extension = path
                    .extension()
                    .and_then(|value| value.to_str())
                    .map(str::to_ascii_lowercase);
                match extension.as_deref() {
                    Some("json") => Ok(DatasetSpec::JsonFile(path.to_path_buf())),
                    Some("csv") => Ok(DatasetSpec::CsvFile(path.to_path_buf())),
                    _ => Err(ConfigSchemaError::UnsupportedDatasetFormat {
                        path: path.to_string_lossy().into_owned(),
                    }),
                }
            },
        }
    }
}

/// Log line format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    /// Human-readable lines.
    #[default]
    Text,
    /// One JSON object per line.
    Json,
}

/// Logging configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields, default)]
pub struct LoggingConfig {
    /// Minimum level (`trace`, `debug`, `info`, `warn`, `error`, `off`).
    pub level: Box<str>,
    /// Output format.
    pub format: LogFormat,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".into(),
            format: LogFormat::Text,
        }
    }
}

impl LoggingConfig {
    fn normalize(&mut self) {
        self.level = self.level.trim().to_ascii_lowercase().into_boxed_str();
    }

    fn validate(&self) -> Result<(), ConfigSchemaError> {
        self.level
            .parse::<LevelFilter>()
            .map(|_| ())
            .map_err(|_| ConfigSchemaError::InvalidLogLevel {
                value: self.level.to_string(),
            })
    }
}

/// End-to-end probe configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields, default)]
pub struct ProbeConfig {
    /// Base URL of the service under test.
    pub base_url: Box<str>,
    /// Per-request timeout (ms).
    pub timeout_ms: u64,
}

impl Default for ProbeConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_PROBE_BASE_URL.into(),
            timeout_ms: DEFAULT_PROBE_TIMEOUT_MS,
        }
    }
}

impl ProbeConfig {
    fn normalize(&mut self) {
        let trimmed = self.base_url.trim().trim_end_matches('/');
        self.base_url = trimmed.to_owned().into_boxed_str();
    }

    fn validate(&self) -> Result<Url, ConfigSchemaError> {
        if !(PROBE_TIMEOUT_MIN_MS..=PROBE_TIMEOUT_MAX_MS).contains(&self.timeout_ms) {
            return Err(ConfigSchemaError::TimeoutOutOfRange {
                section: "probe",
                field: "timeoutMs",
                value_ms: self.timeout_ms,
                min_ms: PROBE_TIMEOUT_MIN_MS,
                max_ms: PROBE_TIMEOUT_MAX_MS,
            });
        }

        let invalid = || ConfigSchemaError::InvalidUrl {
            section: "probe",
            field: "baseUrl",
            url: self.base_url.to_string(),
        };
        let parsed = Url::parse(&self.base_url).map_err(|_| invalid())?;
        if parsed.scheme() != "http" && parsed.scheme() != "https" {
            return Err(invalid());
        }
        Ok(parsed)
    }
}

fn trim_box(value: &str) -> Box<str> {
    value.trim().to_owned().into_boxed_str()
}

fn ensure_non_empty(
    section: &'static str,
    field: &'static str,
    value: &str,
) -> Result<(), ConfigSchemaError> {
    if value.trim().is_empty() {
        return Err(ConfigSchemaError::EmptyField { section, field });
    }
    Ok(())
}

/// Validation failures for the portal config schema.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigSchemaError {
    /// The config version is not supported by this binary.
    UnsupportedVersion {
        /// Version found in the config.
        found: u32,
        /// Version supported by this crate.
        supported: u32,
    },
    /// A timeout value is out of bounds.
    TimeoutOutOfRange {
        /// Schema section (e.g. `probe`).
        section: &'static str,
        /// Field name in the config file (e.g. `timeoutMs`).
        field: &'static str,
        /// Value provided (ms).
        value_ms: u64,
        /// Minimum allowed value (ms).
        min_ms: u64,
        /// Maximum allowed value (ms).
        max_ms: u64,
    },
    /// A required string field is blank.
    EmptyField {
        /// Schema section.
        section: &'static str,
        /// Field name in the config file.
        field: &'static str,
    },
    /// A field value is malformed.
    InvalidValue {
        /// Schema section.
        section: &'static str,
        /// Field name in the config file.
        field: &'static str,
        /// Human readable reason.
        reason: String,
    },
    /// `server.bind` is not a socket address.
    InvalidBindAddress {
        /// Invalid value.
        value: String,
    },
    /// A URL entry is invalid.
    InvalidUrl {
        /// Schema section (e.g. `probe`).
        section: &'static str,
        /// Field name in the config file (e.g. `baseUrl`).
        field: &'static str,
        /// Invalid URL value.
        url: String,
    },
    /// `logging.level` is not a recognised level.
    InvalidLogLevel {
        /// Invalid value.
        value: String,
    },
    /// `dataset.source = "file"` without `dataset.path`.
    MissingDatasetPath,
    /// `dataset.path` has an extension other than `.json` or `.csv`.
    UnsupportedDatasetFormat {
        /// Offending path.
        path: String,
    },
}

impl ConfigSchemaError {
    fn error_code(&self) -> ErrorCode {
        match self {
            Self::UnsupportedVersion { .. } => ErrorCode::new("config", "unsupported_version"),
            Self::TimeoutOutOfRange { .. } => ErrorCode::new("config", "invalid_timeout"),
            Self::EmptyField { .. } | Self::InvalidValue { .. } => {
                ErrorCode::new("config", "invalid_value")
            },
            Self::InvalidBindAddress { .. } => ErrorCode::new("config", "invalid_bind_address"),
            Self::InvalidUrl { .. } => ErrorCode::new("config", "invalid_url"),
            Self::InvalidLogLevel { .. } => ErrorCode::new("config", "invalid_log_level"),
            Self::MissingDatasetPath => ErrorCode::new("config", "missing_dataset_path"),
            Self::UnsupportedDatasetFormat { .. } => {
                ErrorCode::new("config", "unsupported_dataset_format")
            },
        }
    }
}

impl fmt::Display for ConfigSchemaError {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::UnsupportedVersion { found, supported } => {
                write!(
                    formatter,
                    "unsupported config version: {found} (supported: {supported})"
                )
            },
            Self::TimeoutOutOfRange {
                section,
                field,
                value_ms,
                min_ms,
                max_ms,
            } => write!(
                formatter,
                "{section}.{field} must be within [{min_ms}, {max_ms}] ms (got {value_ms})"
            ),
            Self::EmptyField { section, field } => {
                write!(formatter, "{section}.{field} must be non-empty")
            },
            Self::InvalidValue {
                section,
                field,
                reason,
            } => write!(formatter, "invalid value for {section}.{field}: {reason}"),
            Self::InvalidBindAddress { value } => {
                write!(formatter, "server.bind must be host:port (got {value})")
            },
            Self::InvalidUrl { section, field, .. } => {
                write!(formatter, "invalid URL for {section}.{field}")
            },
            Self::InvalidLogLevel { value } => write!(
                formatter,
                "logging.level must be one of trace, debug, info, warn, error, off (got {value})"
            ),
            Self::MissingDatasetPath => {
                formatter.write_str("dataset.path is required when dataset.source is \"file\"")
            },
            Self::UnsupportedDatasetFormat { .. } => {
                formatter.write_str("dataset.path must end in .json or .csv")
            },
        }
    }
}

impl std::error::Error for ConfigSchemaError {}

impl From<ConfigSchemaError> for ErrorEnvelope {
    fn from(error: ConfigSchemaError) -> Self {
        let code = error.error_code();
        let message = error.to_string();
        let mut envelope = Self::expected(code, message);

        match error {
            ConfigSchemaError::UnsupportedVersion { found, supported } => {
                envelope = envelope
                    .with_metadata("found", found.to_string())
                    .with_metadata("supported", supported.to_string());
            },
            ConfigSchemaError::TimeoutOutOfRange {
                section,
                field,
                value_ms,
                min_ms,
                max_ms,
            } => {
                envelope = envelope
                    .with_metadata("section", section)
                    .with_metadata("field", field)
                    .with_metadata("value_ms", value_ms.to_string())
                    .with_metadata("min_ms", min_ms.to_string())
                    .with_metadata("max_ms", max_ms.to_string());
            },
            ConfigSchemaError::EmptyField { section, field } => {
                envelope = envelope
                    .with_metadata("section", section)
                    .with_metadata("field", field);
            },
            ConfigSchemaError::InvalidValue {
                section,
                field,
                reason,
            } => {
                envelope = envelope
                    .with_metadata("section", section)
                    .with_metadata("field", field)
                    .with_metadata("reason", reason);
            },
            ConfigSchemaError::InvalidBindAddress { value } => {
                envelope = envelope
                    .with_metadata("section", "server")
                    .with_metadata("field", "bind")
                    .with_metadata("value", value);
            },
            ConfigSchemaError::InvalidUrl {
                section,
                field,
                url,
            } => {
                envelope = envelope
                    .with_metadata("section", section)
                    .with_metadata("field", field)
                    .with_metadata("url", sanitize_url_for_error(&url));
            },
            ConfigSchemaError::InvalidLogLevel { value } => {
                envelope = envelope
                    .with_metadata("section", "logging")
                    .with_metadata("field", "level")
                    .with_metadata("value", value);
            },
            ConfigSchemaError::MissingDatasetPath => {
                envelope = envelope
                    .with_metadata("section", "dataset")
                    .with_metadata("field", "path");
            },
            ConfigSchemaError::UnsupportedDatasetFormat { path } => {
                envelope = envelope
                    .with_metadata("section", "dataset")
                    .with_metadata("field", "path")
                    .with_metadata("path", path);
            },
        }

        envelope
    }
}
