//! Serve command handler.

use crate::error::{CliError, ExitCode};
use crate::format::OutputMode;
use crate::{CliOutput, format_error_output, infra_exit_code};
use results_portal_facade::run_server_local;
use std::path::Path;

/// Run the HTTP server until Ctrl-C.
pub fn run_serve(
    mode: OutputMode,
    config_path: Option<&Path>,
    bind: Option<&str>,
) -> Result<CliOutput, CliError> {
    let overrides = bind
        .map(|bind| serde_json::to_string(&serde_json::json!({ "server": { "bind": bind } })))
        .transpose()?;
    match run_server_local(config_path, overrides.as_deref()) {
        Ok(()) => Ok(CliOutput {
            stdout: String::new(),
            stderr: String::new(),
            exit_code: ExitCode::Ok,
        }),
        Err(error) => Ok(format_error_output(mode, &error, infra_exit_code(&error))),
    }
}
