//! Info command handler.

use crate::CliOutput;
use crate::error::{CliError, ExitCode};
use crate::format::OutputMode;
use results_portal_facade::facade_crate_version;

const BIN_NAME: &str = env!("CARGO_BIN_NAME");
const PKG_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Run the info command.
pub fn run_info(mode: OutputMode) -> Result<CliOutput, CliError> {
    let facade_version = facade_crate_version();

    let stdout = if mode.is_ndjson() || mode.is_json() {
        let payload = serde_json::json!({
            "status": "ok",
            "build": {
                "name": BIN_NAME,
                "version": PKG_VERSION,
                "facadeVersion": facade_version,
            }
        });
        let mut output = if mode.is_ndjson() {
            serde_json::to_string(&payload)?
        } else {
            serde_json::to_string_pretty(&payload)?
        };
        output.push('\n');
        output
    } else {
        format!("status: ok\nname: {BIN_NAME}\nversion: {PKG_VERSION}\nfacade: {facade_version}\n")
    };

    Ok(CliOutput {
        stdout,
        stderr: String::new(),
        exit_code: ExitCode::Ok,
    })
}
