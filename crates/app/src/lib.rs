//! # results-portal-app
//!
//! Application use cases for student lookup, listing, export, and the
//! end-to-end probe. This crate depends on `ports`, `domain`, and `shared`.

pub mod export_result;
pub mod list_students;
pub mod lookup_student;
pub mod probe;

/// Returns the app crate version.
#[must_use]
pub const fn app_crate_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

pub use export_result::{ExportResultDeps, ExportedResult, export_result};
pub use list_students::{
    DatasetDiagnostics, ListStudentsDeps, dataset_diagnostics, list_students, now_epoch_ms,
};
pub use lookup_student::{LookupStudentDeps, lookup_student};
pub use probe::{
    ProbeCase, ProbeExpectation, ProbeOutcome, ProbeReport, REQUIRED_STUDENT_FIELDS,
    RunProbeDeps, default_probe_suite, run_probe,
};

#[cfg(test)]
mod tests {
    use super::*;
    use results_portal_domain::domain_crate_version;
    use results_portal_ports::ports_crate_version;
    use results_portal_shared::shared_crate_version;

    #[test]
    fn app_crate_compiles() {
        let version = app_crate_version();
        assert!(!version.is_empty());
    }

    #[test]
    fn app_can_use_ports_domain_shared() {
        let ports_version = ports_crate_version();
        let domain_version = domain_crate_version();
        let shared_version = shared_crate_version();

        assert!(!ports_version.is_empty());
        assert!(!domain_version.is_empty());
        assert!(!shared_version.is_empty());
    }
}
