//! Lookup command handler.

use crate::error::{CliError, ExitCode};
use crate::format::OutputMode;
use crate::{CliOutput, format_error_output, infra_exit_code};
use results_portal_facade::{LocalLookup, LookupQuery, run_lookup_local};
use std::path::Path;

/// Inputs for lookup command execution.
pub struct LookupCommandInput<'a> {
    pub config_path: Option<&'a Path>,
    pub usn: Option<&'a str>,
    pub full_name: Option<&'a str>,
}

/// Run the validation contract locally and print the response it would send.
pub fn run_lookup(mode: OutputMode, input: &LookupCommandInput<'_>) -> Result<CliOutput, CliError> {
    let query = LookupQuery::new(input.usn, input.full_name);
    match run_lookup_local(input.config_path, None, &query) {
        Ok(lookup) => format_lookup_output(mode, &lookup),
        Err(error) => Ok(format_error_output(mode, &error, infra_exit_code(&error))),
    }
}

fn format_lookup_output(mode: OutputMode, lookup: &LocalLookup) -> Result<CliOutput, CliError> {
    let stdout = if mode.is_ndjson() {
        let payload = serde_json::json!({
            "type": "summary",
            "httpStatus": lookup.status,
            "response": lookup.response,
        });
        let mut out = serde_json::to_string(&payload)?;
        out.push('\n');
        out
    } else if mode.is_json() {
        let payload = serde_json::json!({
            "httpStatus": lookup.status,
            "response": lookup.response,
        });
        let mut out = serde_json::to_string_pretty(&payload)?;
        out.push('\n');
        out
    } else {
        let mut out = format!("httpStatus: {}\n", lookup.status);
        out.push_str(&serde_json::to_string_pretty(&lookup.response)?);
        out.push('\n');
        out
    };

    Ok(CliOutput {
        stdout,
        stderr: String::new(),
        exit_code: lookup_exit_code(lookup.status),
    })
}

const fn lookup_exit_code(status: u16) -> ExitCode {
    match status {
        200 => ExitCode::Ok,
        403 => ExitCode::InvalidInput,
        _ => ExitCode::Internal,
    }
}
