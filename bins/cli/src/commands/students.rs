//! Students command handler.

use crate::error::{CliError, ExitCode};
use crate::format::OutputMode;
use crate::{CliOutput, format_error_output, infra_exit_code};
use results_portal_facade::{ApiV1StudentDto, run_students_local};
use std::fmt::Write;
use std::path::Path;

/// List every record in the configured dataset.
pub fn run_students(mode: OutputMode, config_path: Option<&Path>) -> Result<CliOutput, CliError> {
    match run_students_local(config_path, None) {
        Ok(students) => format_students_output(mode, &students),
        Err(error) => Ok(format_error_output(mode, &error, infra_exit_code(&error))),
    }
}

fn format_students_output(
    mode: OutputMode,
    students: &[ApiV1StudentDto],
) -> Result<CliOutput, CliError> {
    let stdout = if mode.is_ndjson() {
        format_students_ndjson(students)?
    } else if mode.is_json() {
        let mut out = serde_json::to_string_pretty(students)?;
        out.push('\n');
        out
    } else {
        format_students_text(students)
    };

    Ok(CliOutput {
        stdout,
        stderr: String::new(),
        exit_code: ExitCode::Ok,
    })
}

fn format_students_ndjson(students: &[ApiV1StudentDto]) -> Result<String, CliError> {
    let mut out = String::new();
    for student in students {
        let payload = serde_json::json!({
            "type": "student",
            "student": student,
        });
        out.push_str(&serde_json::to_string(&payload)?);
        out.push('\n');
    }
    let summary = serde_json::json!({
        "type": "summary",
        "status": "ok",
        "count": students.len(),
    });
    out.push_str(&serde_json::to_string(&summary)?);
    out.push('\n');
    Ok(out)
}

fn format_students_text(students: &[ApiV1StudentDto]) -> String {
    let mut out = String::new();
    out.push_str("status: ok\n");
    let _ = writeln!(out, "students: {}", students.len());
    for student in students {
        let _ = writeln!(
            out,
            "{} {} sgpa={} total={} subjects={}",
            student.usn,
            student.full_name,
            student.sgpa,
            student.total_marks,
            student.subjects.len()
        );
    }
    out
}
