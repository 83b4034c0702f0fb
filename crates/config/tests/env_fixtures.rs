//! Integration tests for env parsing and env-to-config merging.

use results_portal_config::{
    DatasetSpec, EnvParseError, LogFormat, PortalConfig, PortalEnv, apply_env_overrides,
    load_portal_config_from_sources,
};
use results_portal_shared::ErrorCode;
use std::collections::BTreeMap;
use std::error::Error;
use std::fs;
use std::path::{Path, PathBuf};

fn read_env_map(name: &str) -> Result<BTreeMap<String, String>, Box<dyn Error>> {
    let path = Path::new(env!("CARGO_MANIFEST_DIR"))
        .join("tests")
        .join("fixtures")
        .join(name);
    let contents = fs::read_to_string(path)?;
    Ok(serde_json::from_str(&contents)?)
}

#[test]
fn env_fixture_merges_into_effective_config() -> Result<(), Box<dyn Error>> {
    let env = PortalEnv::from_map(&read_env_map("portal-env.valid.json")?)?;
    let config = apply_env_overrides(PortalConfig::default(), &env)?;

    assert_eq!(config.bind().port(), 4100);
    assert_eq!(config.server.environment.as_ref(), "ci");
    assert_eq!(
        config.dataset(),
        &DatasetSpec::JsonFile(PathBuf::from("/tmp/results.json"))
    );
    assert_eq!(config.logging.level.as_ref(), "trace");
    assert_eq!(config.logging.format, LogFormat::Json);
    assert_eq!(config.probe.timeout_ms, 1500);
    Ok(())
}

#[test]
fn env_wins_over_config_file() -> Result<(), Box<dyn Error>> {
    let env = PortalEnv::from_map(&read_env_map("portal-env.valid.json")?)?;
    let file = r#"{ "server": { "bind": "127.0.0.1:9999" }, "logging": { "level": "error" } }"#;
    let config = load_portal_config_from_sources(Some(file), None, &env)?;

    assert_eq!(config.bind().port(), 4100);
    assert_eq!(config.logging.level.as_ref(), "trace");
    Ok(())
}

#[test]
fn invalid_int_reports_env_var_and_value() -> Result<(), Box<dyn Error>> {
    let error = PortalEnv::from_map(&read_env_map("portal-env.invalid-timeout.json")?)
        .err()
        .ok_or_else(|| std::io::Error::other("expected int error"))?;
    assert!(matches!(error, EnvParseError::InvalidInt { .. }));

    let envelope: results_portal_shared::ErrorEnvelope = error.into();
    assert_eq!(envelope.code, ErrorCode::new("config", "invalid_env_int"));
    assert_eq!(
        envelope.metadata.get("env_var").map(String::as_str),
        Some("RP_PROBE_TIMEOUT_MS")
    );
    assert_eq!(
        envelope.metadata.get("value").map(String::as_str),
        Some("soon")
    );
    Ok(())
}

#[test]
fn invalid_dataset_source_is_rejected() -> Result<(), Box<dyn Error>> {
    let error = PortalEnv::from_map(&read_env_map("portal-env.invalid-source.json")?)
        .err()
        .ok_or_else(|| std::io::Error::other("expected enum error"))?;

    let envelope: results_portal_shared::ErrorEnvelope = error.into();
    assert_eq!(envelope.code, ErrorCode::new("config", "invalid_env_enum"));
    Ok(())
}

#[test]
fn file_source_without_path_fails_validation() -> Result<(), Box<dyn Error>> {
    let mut map = BTreeMap::new();
    map.insert("RP_DATASET_SOURCE".to_owned(), "file".to_owned());
    let env = PortalEnv::from_map(&map)?;

    let error = apply_env_overrides(PortalConfig::default(), &env)
        .err()
        .ok_or_else(|| std::io::Error::other("expected missing path error"))?;
    assert_eq!(error.code, ErrorCode::new("config", "missing_dataset_path"));
    Ok(())
}
