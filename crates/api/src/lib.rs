//! # results-portal-api
//!
//! API data transfer objects and wire formats.
//! This crate depends only on `domain` and `shared`.

/// API v1 DTOs.
pub mod v1;

/// Returns the api crate version.
#[must_use]
pub const fn api_crate_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

#[cfg(test)]
mod tests {
    use super::*;
    use results_portal_domain::domain_crate_version;
    use results_portal_shared::shared_crate_version;

    #[test]
    fn api_crate_compiles() {
        let version = api_crate_version();
        assert!(!version.is_empty());
    }

    #[test]
    fn api_can_use_domain_and_shared() {
        assert!(!domain_crate_version().is_empty());
        assert!(!shared_crate_version().is_empty());
    }
}
