//! Environment validation helpers for CLI surfaces.

use results_portal_config::{PortalConfig, PortalEnv, apply_env_overrides};
use results_portal_shared::ErrorEnvelope;
use std::collections::BTreeMap;

/// Infra-level error type (shared error envelope).
pub type InfraError = ErrorEnvelope;

/// Infra-level result type.
pub type InfraResult<T> = Result<T, InfraError>;

/// Validate that the provided `RP_*` overrides parse and merge into a valid config.
pub fn validate_env_parsing(env: &BTreeMap<String, String>) -> InfraResult<()> {
    let parsed = PortalEnv::from_map(env).map_err(ErrorEnvelope::from)?;
    let _ = apply_env_overrides(PortalConfig::default(), &parsed)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn env(pairs: &[(&str, &str)]) -> BTreeMap<String, String> {
        pairs
            .iter()
            .map(|(key, value)| ((*key).to_owned(), (*value).to_owned()))
            .collect()
    }

    #[test]
    fn empty_env_is_valid() -> InfraResult<()> {
        validate_env_parsing(&BTreeMap::new())
    }

    #[test]
    fn bad_timeout_is_rejected() {
        let error = validate_env_parsing(&env(&[("RP_PROBE_TIMEOUT_MS", "soon")])).err();
        assert!(error.is_some_and(|error| error.code.namespace() == "config"));
    }

    #[test]
    fn file_source_without_path_is_rejected() {
        let error = validate_env_parsing(&env(&[("RP_DATASET_SOURCE", "file")])).err();
        assert!(error.is_some());
    }
}
