//! End-to-end probe of the validation contract against a running service.
//!
//! Each case issues one GET and judges the response. Outcomes are kept in
//! run order inside the returned report.

use results_portal_ports::{
    LogFields, LoggerPort, ProbeRequest, ProbeResponse, ProbeTransportPort,
};
use results_portal_shared::{RequestContext, Result};
use serde_json::Value;
use std::sync::Arc;

/// Student fields every successful lookup must carry.
pub const REQUIRED_STUDENT_FIELDS: [&str; 6] =
    ["usn", "fullName", "totalMarks", "percentage", "sgpa", "subjects"];

/// What a probe case expects back.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProbeExpectation {
    /// HTTP 200 with `ok: true` and a student carrying these fields.
    Success {
        /// Required student fields.
        required_fields: Vec<Box<str>>,
    },
    /// The given status; 403 and 500 must carry `ok: false` and `error`.
    Failure {
        /// Expected HTTP status.
        status: u16,
    },
}

impl ProbeExpectation {
    /// Success expecting the standard student fields.
    #[must_use]
    pub fn student() -> Self {
        Self::Success {
            required_fields: REQUIRED_STUDENT_FIELDS.iter().map(|&field| field.into()).collect(),
        }
    }

    /// Expected HTTP status.
    #[must_use]
    pub const fn status(&self) -> u16 {
        match self {
            Self::Success { .. } => 200,
            Self::Failure { status } => *status,
        }
    }
}

/// One probe request and its expectation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProbeCase {
    /// Display name.
    pub name: Box<str>,
    /// Path plus query string.
    pub path_and_query: Box<str>,
    /// Expected response.
    pub expectation: ProbeExpectation,
}

impl ProbeCase {
    /// Build a case.
    #[must_use]
    pub fn new(name: &str, path_and_query: &str, expectation: ProbeExpectation) -> Self {
        Self {
            name: name.into(),
            path_and_query: path_and_query.into(),
            expectation,
        }
    }
}

/// The standard validation suite.
#[must_use]
pub fn default_probe_suite() -> Vec<ProbeCase> {
    let student = ProbeExpectation::student;
    let forbidden = || ProbeExpectation::Failure { status: 403 };
    vec![
        ProbeCase::new(
            "Valid USN: 3VC24CD001",
            "/api/validate?usn=3VC24CD001",
            student(),
        ),
        ProbeCase::new(
            "Valid USN: 3VC24CD002",
            "/api/validate?usn=3VC24CD002",
            student(),
        ),
        ProbeCase::new(
            "Valid USN: 3VC24CD003",
            "/api/validate?usn=3VC24CD003",
            student(),
        ),
        ProbeCase::new(
            "Invalid USN: INVALID123",
            "/api/validate?usn=INVALID123",
            forbidden(),
        ),
        ProbeCase::new("Empty USN parameter", "/api/validate?usn=", forbidden()),
        ProbeCase::new("No parameters", "/api/validate", forbidden()),
        ProbeCase::new(
            "Search by name: A SAKSHI",
            "/api/validate?fullName=A%20SAKSHI",
            student(),
        ),
        ProbeCase::new(
            "Case insensitive name: a sakshi",
            "/api/validate?fullName=a%20sakshi",
            student(),
        ),
        ProbeCase::new(
            "Invalid name: NONEXISTENT STUDENT",
            "/api/validate?fullName=NONEXISTENT%20STUDENT",
            forbidden(),
        ),
        ProbeCase::new(
            "Both USN and name: 3VC24CD001 + A SAKSHI",
            "/api/validate?usn=3VC24CD001&fullName=A%20SAKSHI",
            student(),
        ),
    ]
}

/// Result of one case.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProbeOutcome {
    /// Case name.
    pub name: Box<str>,
    /// Whether the response met the expectation.
    pub passed: bool,
    /// What was observed, or why the case failed.
    pub detail: String,
}

/// Ordered outcomes of one probe run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProbeReport {
    /// Base URL the run targeted.
    pub base_url: String,
    /// Outcomes in case order.
    pub outcomes: Vec<ProbeOutcome>,
}

impl ProbeReport {
    /// Number of passed cases.
    #[must_use]
    pub fn passed(&self) -> usize {
        self.outcomes.iter().filter(|outcome| outcome.passed).count()
    }

    /// Number of failed cases.
    #[must_use]
    pub fn failed(&self) -> usize {
        self.outcomes.len() - self.passed()
    }

    /// Percentage of passed cases (0 for an empty run).
    #[must_use]
    #[allow(clippy::cast_precision_loss, reason = "case counts are tiny")]
    pub fn success_rate(&self) -> f64 {
        if self.outcomes.is_empty() {
            return 0.0;
        }
        self.passed() as f64 * 100.0 / self.outcomes.len() as f64
    }

    /// True when every case passed.
    #[must_use]
    pub fn all_passed(&self) -> bool {
        self.outcomes.iter().all(|outcome| outcome.passed)
    }

    /// Failed outcomes in case order.
    pub fn failures(&self) -> impl Iterator<Item = &ProbeOutcome> {
        self.outcomes.iter().filter(|outcome| !outcome.passed)
    }
}

/// Dependencies required by a probe run.
#[derive(Clone)]
pub struct RunProbeDeps {
    /// HTTP transport.
    pub transport: Arc<dyn ProbeTransportPort>,
    /// Optional logger.
    pub logger: Option<Arc<dyn LoggerPort>>,
}

/// Run every case in order.
///
/// Transport failures fail the affected case; only cancellation aborts the run.
pub async fn run_probe(
    ctx: &RequestContext,
    deps: &RunProbeDeps,
    cases: &[ProbeCase],
) -> Result<ProbeReport> {
    let mut report = ProbeReport {
        base_url: deps.transport.base_url().to_owned(),
        outcomes: Vec::with_capacity(cases.len()),
    };

    for case in cases {
        ctx.ensure_not_cancelled("probe.case")?;
        let request = ProbeRequest::from(case.path_and_query.as_ref());
        let verdict = match deps.transport.get(ctx, request).await {
            Ok(response) => judge(&case.expectation, &response),
            Err(error) if error.is_cancelled() => return Err(error),
            Err(error) => Err(format!("Request failed: {}", error.message)),
        };
        let (passed, detail) = match verdict {
            Ok(detail) => (true, detail),
            Err(detail) => (false, detail),
        };

        if let Some(logger) = deps.logger.as_ref() {
            let mut fields = LogFields::new();
            fields.insert("case".into(), Value::from(case.name.as_ref()));
            fields.insert("passed".into(), Value::from(passed));
            logger.debug("probe.case", &detail, Some(fields));
        }
        report.outcomes.push(ProbeOutcome {
            name: case.name.clone(),
            passed,
            detail,
        });
    }

    if let Some(logger) = deps.logger.as_ref() {
        let mut fields = LogFields::new();
        fields.insert("passed".into(), Value::from(report.passed()));
        fields.insert("failed".into(), Value::from(report.failed()));
        logger.info("probe.completed", "Probe run completed", Some(fields));
    }
    Ok(report)
}

/// Judge one response; `Ok` carries the pass detail, `Err` the failure detail.
fn judge(
    expectation: &ProbeExpectation,
    response: &ProbeResponse,
) -> std::result::Result<String, String> {
    let expected = expectation.status();
    if response.status != expected {
        return Err(format!("Expected status {expected}, got {}", response.status));
    }

    match expectation {
        ProbeExpectation::Success { required_fields } => {
            judge_success(required_fields, &response.body)
        },
        ProbeExpectation::Failure { status: 403 | 500 } => judge_error_body(&response.body),
        ProbeExpectation::Failure { status } => Ok(format!("Status {status}")),
    }
}

fn judge_success(required_fields: &[Box<str>], body: &str) -> std::result::Result<String, String> {
    let data: Value = serde_json::from_str(body).map_err(|_| "Invalid JSON response".to_owned())?;

    if data.get("ok").and_then(Value::as_bool) != Some(true) {
        let error = data
            .get("error")
            .and_then(Value::as_str)
            .unwrap_or("No error message");
        return Err(format!("Response 'ok' field is false or missing: {error}"));
    }
    let Some(student) = data.get("student") else {
        return Err("Missing 'student' field in response".to_owned());
    };

    let missing: Vec<&str> = required_fields
        .iter()
        .map(AsRef::as_ref)
        .filter(|field| student.get(field).is_none())
        .collect();
    if !missing.is_empty() {
        return Err(format!("Missing fields: {}", missing.join(", ")));
    }

    match student.get("subjects").and_then(Value::as_array) {
        Some(subjects) if subjects.is_empty() => {
            Err("Student data has no subjects".to_owned())
        },
        Some(subjects) => Ok(format!("Found student with {} subjects", subjects.len())),
        None => Err("Missing 'subjects' field in student data".to_owned()),
    }
}

fn judge_error_body(body: &str) -> std::result::Result<String, String> {
    let data: Value =
        serde_json::from_str(body).map_err(|_| "Invalid JSON in error response".to_owned())?;
    let ok_is_false = data.get("ok").and_then(Value::as_bool) == Some(false);
    match data.get("error") {
        Some(error) if ok_is_false => {
            let error = error.as_str().map_or_else(|| error.to_string(), str::to_owned);
            Ok(format!("Proper error response: {error}"))
        },
        _ => Err("Error response missing proper structure".to_owned()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use results_portal_ports::BoxFuture;
    use results_portal_shared::{ErrorClass, ErrorCode, ErrorEnvelope};
    use std::collections::HashMap;
    use std::error::Error;

    struct ScriptedTransport {
        responses: HashMap<&'static str, (u16, &'static str)>,
    }

    impl ProbeTransportPort for ScriptedTransport {
        fn base_url(&self) -> &str {
            "http://scripted"
        }

        fn get(
            &self,
            _ctx: &RequestContext,
            request: ProbeRequest,
        ) -> BoxFuture<'_, Result<ProbeResponse>> {
            let scripted = self.responses.get(request.path_and_query.as_ref()).copied();
            Box::pin(async move {
                scripted
                    .map(|(status, body)| ProbeResponse {
                        status,
                        body: body.into(),
                    })
                    .ok_or_else(|| {
                        ErrorEnvelope::unexpected(
                            ErrorCode::io(),
                            "connection refused",
                            ErrorClass::Retriable,
                        )
                    })
            })
        }
    }

    const STUDENT: &str = r#"{"ok":true,"student":{"usn":"3VC24CD001","fullName":"A SAKSHI",
        "totalMarks":300,"percentage":75,"sgpa":8,"subjects":[{"code":"BMATS101"}]}}"#;
    const REJECTED: &str = r#"{"ok":false,"error":"No matching record found."}"#;

    fn case(path: &'static str, expectation: ProbeExpectation) -> ProbeCase {
        ProbeCase::new(path, path, expectation)
    }

    #[test]
    fn default_suite_has_ten_ordered_cases() {
        let suite = default_probe_suite();
        assert_eq!(suite.len(), 10);
        let failures = suite
            .iter()
            .filter(|case| matches!(case.expectation, ProbeExpectation::Failure { status: 403 }))
            .count();
        assert_eq!(failures, 4);
        assert_eq!(
            suite.first().map(|case| case.name.as_ref()),
            Some("Valid USN: 3VC24CD001")
        );
    }

    #[test]
    fn judges_success_bodies() {
        let ok = ProbeResponse {
            status: 200,
            body: STUDENT.into(),
        };
        assert_eq!(
            judge(&ProbeExpectation::student(), &ok),
            Ok("Found student with 1 subjects".to_owned())
        );

        let partial = ProbeResponse {
            status: 200,
            body: r#"{"ok":true,"student":{"usn":"X","subjects":[]}}"#.into(),
        };
        assert_eq!(
            judge(&ProbeExpectation::student(), &partial),
            Err("Missing fields: fullName, totalMarks, percentage, sgpa".to_owned())
        );

        let no_subjects = ProbeResponse {
            status: 200,
            body: r#"{"ok":true,"student":{"usn":"3VC24CD001","fullName":"A SAKSHI",
                "totalMarks":0,"percentage":0,"sgpa":0,"subjects":[]}}"#
                .into(),
        };
        assert_eq!(
            judge(&ProbeExpectation::student(), &no_subjects),
            Err("Student data has no subjects".to_owned())
        );

        let not_json = ProbeResponse {
            status: 200,
            body: "<html>".into(),
        };
        assert_eq!(
            judge(&ProbeExpectation::student(), &not_json),
            Err("Invalid JSON response".to_owned())
        );
    }

    #[test]
    fn judges_error_bodies_and_statuses() {
        let forbidden = ProbeExpectation::Failure { status: 403 };
        let rejected = ProbeResponse {
            status: 403,
            body: REJECTED.into(),
        };
        assert!(judge(&forbidden, &rejected).is_ok());

        let bare = ProbeResponse {
            status: 403,
            body: r#"{"error":"nope"}"#.into(),
        };
        assert_eq!(
            judge(&forbidden, &bare),
            Err("Error response missing proper structure".to_owned())
        );

        let wrong_status = ProbeResponse {
            status: 200,
            body: STUDENT.into(),
        };
        assert_eq!(
            judge(&forbidden, &wrong_status),
            Err("Expected status 403, got 200".to_owned())
        );
    }

    #[tokio::test]
    async fn run_keeps_case_order_and_counts() -> std::result::Result<(), Box<dyn Error>> {
        let transport = ScriptedTransport {
            responses: HashMap::from([
                ("/ok", (200, STUDENT)),
                ("/rejected", (403, REJECTED)),
                ("/wrong", (500, REJECTED)),
            ]),
        };
        let deps = RunProbeDeps {
            transport: Arc::new(transport),
            logger: None,
        };
        let cases = vec![
            case("/ok", ProbeExpectation::student()),
            case("/rejected", ProbeExpectation::Failure { status: 403 }),
            case("/wrong", ProbeExpectation::Failure { status: 403 }),
            case("/down", ProbeExpectation::student()),
        ];

        let report = run_probe(&RequestContext::new_request(), &deps, &cases).await?;
        let names: Vec<&str> = report
            .outcomes
            .iter()
            .map(|outcome| outcome.name.as_ref())
            .collect();
        assert_eq!(names, vec!["/ok", "/rejected", "/wrong", "/down"]);
        assert_eq!(report.passed(), 2);
        assert_eq!(report.failed(), 2);
        assert!((report.success_rate() - 50.0).abs() < f64::EPSILON);
        assert!(!report.all_passed());
        assert_eq!(
            report.failures().last().map(|outcome| outcome.detail.as_str()),
            Some("Request failed: connection refused")
        );
        assert_eq!(report.base_url, "http://scripted");
        Ok(())
    }
}
