//! Probe command handler.

use crate::error::{CliError, ExitCode};
use crate::format::OutputMode;
use crate::{CliOutput, format_error_output, infra_exit_code};
use results_portal_facade::{ProbeReport, run_probe_local};
use std::fmt::Write;
use std::path::Path;

/// Run the end-to-end suite against a live service.
pub fn run_probe(
    mode: OutputMode,
    config_path: Option<&Path>,
    base_url: Option<&str>,
) -> Result<CliOutput, CliError> {
    match run_probe_local(config_path, None, base_url) {
        Ok(report) => format_probe_output(mode, &report),
        Err(error) => Ok(format_error_output(mode, &error, infra_exit_code(&error))),
    }
}

fn format_probe_output(mode: OutputMode, report: &ProbeReport) -> Result<CliOutput, CliError> {
    let stdout = if mode.is_ndjson() {
        format_probe_ndjson(report)?
    } else if mode.is_json() {
        format_probe_json(report)?
    } else {
        format_probe_text(report)
    };

    Ok(CliOutput {
        stdout,
        stderr: String::new(),
        exit_code: if report.all_passed() {
            ExitCode::Ok
        } else {
            ExitCode::Internal
        },
    })
}

fn summary(report: &ProbeReport) -> serde_json::Value {
    serde_json::json!({
        "baseUrl": report.base_url,
        "total": report.outcomes.len(),
        "passed": report.passed(),
        "failed": report.failed(),
        "successRate": report.success_rate(),
    })
}

fn format_probe_json(report: &ProbeReport) -> Result<String, CliError> {
    let cases: Vec<serde_json::Value> = report
        .outcomes
        .iter()
        .map(|outcome| {
            serde_json::json!({
                "name": outcome.name.as_ref(),
                "passed": outcome.passed,
                "detail": outcome.detail,
            })
        })
        .collect();
    let payload = serde_json::json!({
        "status": if report.all_passed() { "ok" } else { "failed" },
        "summary": summary(report),
        "cases": cases,
    });
    let mut out = serde_json::to_string_pretty(&payload)?;
    out.push('\n');
    Ok(out)
}

fn format_probe_ndjson(report: &ProbeReport) -> Result<String, CliError> {
    let mut out = String::new();
    for outcome in &report.outcomes {
        let payload = serde_json::json!({
            "type": "case",
            "name": outcome.name.as_ref(),
            "passed": outcome.passed,
            "detail": outcome.detail,
        });
        out.push_str(&serde_json::to_string(&payload)?);
        out.push('\n');
    }
    let mut payload = summary(report);
    if let Some(map) = payload.as_object_mut() {
        map.insert("type".to_owned(), "summary".into());
        map.insert(
            "status".to_owned(),
            if report.all_passed() { "ok" } else { "failed" }.into(),
        );
    }
    out.push_str(&serde_json::to_string(&payload)?);
    out.push('\n');
    Ok(out)
}

fn format_probe_text(report: &ProbeReport) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "probe: {}", report.base_url);
    for outcome in &report.outcomes {
        let mark = if outcome.passed { "PASS" } else { "FAIL" };
        let _ = writeln!(out, "{mark} {}: {}", outcome.name, outcome.detail);
    }
    let _ = writeln!(
        out,
        "total: {} passed: {} failed: {} success: {:.1}%",
        report.outcomes.len(),
        report.passed(),
        report.failed(),
        report.success_rate()
    );
    out
}
