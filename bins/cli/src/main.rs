//! CLI binary entrypoint.

mod commands;
mod error;
mod format;

use clap::{Parser, Subcommand, ValueEnum};
use commands::{LookupCommandInput, run_info, run_lookup, run_probe, run_serve, run_students};
use error::{CliError, ExitCode};
use format::{OutputArgs, OutputMode};
use results_portal_facade::{
    ConfigDocFormat, ErrorKind, InfraError, LogFormat, LoggingConfig, load_effective_config,
    load_logging_config, redact_if_sensitive,
};
use std::collections::BTreeMap;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;

const ENV_PREFIX: &str = "RP_";

#[derive(Debug, Parser)]
#[command(
    name = "rportal",
    version,
    about = "Student results lookup service and end-to-end probe",
    long_about = None
)]
struct Cli {
    #[command(flatten)]
    output: OutputArgs,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Show build and version details.
    Info,
    /// Run the HTTP server.
    Serve {
        /// Optional config file path (JSON/TOML).
        #[arg(long)]
        config: Option<PathBuf>,
        /// Listen address override (`host:port`).
        #[arg(long)]
        bind: Option<String>,
    },
    /// Run the validation contract locally and print the response.
    Lookup {
        /// Seat number.
        #[arg(long)]
        usn: Option<String>,
        /// Full name.
        #[arg(long)]
        full_name: Option<String>,
        /// Optional config file path (JSON/TOML).
        #[arg(long)]
        config: Option<PathBuf>,
    },
    /// List every record in the configured dataset.
    Students {
        /// Optional config file path (JSON/TOML).
        #[arg(long)]
        config: Option<PathBuf>,
    },
    /// Run the end-to-end suite against a live service.
    Probe {
        /// Base URL of the service under test.
        #[arg(long)]
        base_url: Option<String>,
        /// Optional config file path (JSON/TOML).
        #[arg(long)]
        config: Option<PathBuf>,
    },
    /// Config-related commands.
    Config {
        #[command(subcommand)]
        command: ConfigCommands,
    },
}

impl Commands {
    /// Subcommand name without its arguments.
    const fn name(&self) -> &'static str {
        match self {
            Self::Info => "info",
            Self::Serve { .. } => "serve",
            Self::Lookup { .. } => "lookup",
            Self::Students { .. } => "students",
            Self::Probe { .. } => "probe",
            Self::Config {
                command: ConfigCommands::Check { .. },
            } => "config check",
            Self::Config {
                command: ConfigCommands::Show { .. },
            } => "config show",
        }
    }
}

#[derive(Debug, Subcommand)]
enum ConfigCommands {
    /// Validate config loading, merging, and normalization.
    Check {
        /// Optional config file path (JSON/TOML).
        #[arg(long)]
        path: Option<PathBuf>,
        /// Partial config JSON applied over the file.
        #[arg(long)]
        overrides_json: Option<String>,
    },
    /// Show the effective config after applying overrides.
    Show {
        /// Optional config file path (JSON/TOML).
        #[arg(long)]
        path: Option<PathBuf>,
        /// Partial config JSON applied over the file.
        #[arg(long)]
        overrides_json: Option<String>,
        /// Document format for text output.
        #[arg(long, value_enum, default_value_t = ConfigShowFormat::Json)]
        format: ConfigShowFormat,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum ConfigShowFormat {
    Json,
    Toml,
}

impl From<ConfigShowFormat> for ConfigDocFormat {
    fn from(value: ConfigShowFormat) -> Self {
        match value {
            ConfigShowFormat::Json => Self::Json,
            ConfigShowFormat::Toml => Self::Toml,
        }
    }
}

pub(crate) struct CliOutput {
    stdout: String,
    stderr: String,
    exit_code: ExitCode,
}

fn main() -> std::process::ExitCode {
    let cli = Cli::parse();
    let mode = OutputMode::from_args(&cli.output);
    init_tracing(&cli.command, mode);

    match run(&cli.command, mode) {
        Ok(output) => match write_output(&output) {
            Ok(()) => std::process::ExitCode::from(output.exit_code.as_u8()),
            Err(error) => exit_with_error(&error),
        },
        Err(error) => exit_with_error(&error),
    }
}

fn exit_with_error(error: &CliError) -> std::process::ExitCode {
    let _ = writeln!(io::stderr(), "error: {error}");
    std::process::ExitCode::from(error.exit_code().as_u8())
}

fn run(command: &Commands, mode: OutputMode) -> Result<CliOutput, CliError> {
    tracing::debug!(command = command.name(), "dispatching command");
    match command {
        Commands::Info => run_info(mode),
        Commands::Serve { config, bind } => run_serve(mode, config.as_deref(), bind.as_deref()),
        Commands::Lookup {
            usn,
            full_name,
            config,
        } => run_lookup(
            mode,
            &LookupCommandInput {
                config_path: config.as_deref(),
                usn: usn.as_deref(),
                full_name: full_name.as_deref(),
            },
        ),
        Commands::Students { config } => run_students(mode, config.as_deref()),
        Commands::Probe { base_url, config } => {
            run_probe(mode, config.as_deref(), base_url.as_deref())
        },
        Commands::Config { command } => {
            let env = collect_scoped_env(ENV_PREFIX);
            match command {
                ConfigCommands::Check {
                    path,
                    overrides_json,
                } => config_check_with_env(mode, &env, path.as_deref(), overrides_json.as_deref()),
                ConfigCommands::Show {
                    path,
                    overrides_json,
                    format,
                } => config_show_with_env(
                    mode,
                    &env,
                    path.as_deref(),
                    overrides_json.as_deref(),
                    (*format).into(),
                ),
            }
        },
    }
}

/// Install the `tracing` subscriber; logs go to stderr so stdout stays parseable.
fn init_tracing(command: &Commands, mode: OutputMode) {
    if mode.no_progress {
        return;
    }
    let config_path = match command {
        Commands::Serve { config, .. }
        | Commands::Lookup { config, .. }
        | Commands::Students { config }
        | Commands::Probe { config, .. } => config.as_deref(),
        Commands::Info | Commands::Config { .. } => return,
    };
    let logging = load_logging_config(&collect_scoped_env(ENV_PREFIX), config_path)
        .unwrap_or_else(|_| LoggingConfig::default());

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&*logging.level));
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .with_target(true);
    let _ = match logging.format {
        LogFormat::Json => builder.json().try_init(),
        LogFormat::Text => builder.try_init(),
    };
}

fn config_check_with_env(
    mode: OutputMode,
    env: &BTreeMap<String, String>,
    path: Option<&Path>,
    overrides_json: Option<&str>,
) -> Result<CliOutput, CliError> {
    let config_json = match load_effective_config(env, path, overrides_json, ConfigDocFormat::Json)
    {
        Ok(config) => config,
        Err(error) => return Ok(format_error_output(mode, &error, ExitCode::InvalidInput)),
    };

    let mut stderr = String::new();
    log_info(&mut stderr, "config check completed", mode.no_progress);

    let stdout = if mode.is_ndjson() {
        format_ndjson_summary("ok", "config", None)
    } else if mode.is_json() {
        let config_value: serde_json::Value = serde_json::from_str(config_json.trim())?;
        let payload = serde_json::json!({
            "status": "ok",
            "configPath": path.map(|value| value.to_string_lossy().to_string()),
            "effectiveConfig": config_value,
        });
        let mut output = serde_json::to_string_pretty(&payload)?;
        output.push('\n');
        output
    } else {
        path.map_or_else(
            || "status: ok\nconfig: ok\n".to_string(),
            |path| format!("status: ok\nconfig: ok\npath: {}\n", path.to_string_lossy()),
        )
    };

    Ok(CliOutput {
        stdout,
        stderr,
        exit_code: ExitCode::Ok,
    })
}

fn config_show_with_env(
    mode: OutputMode,
    env: &BTreeMap<String, String>,
    path: Option<&Path>,
    overrides_json: Option<&str>,
    format: ConfigDocFormat,
) -> Result<CliOutput, CliError> {
    let document_format = if mode.is_json() || mode.is_ndjson() {
        ConfigDocFormat::Json
    } else {
        format
    };
    let document = match load_effective_config(env, path, overrides_json, document_format) {
        Ok(config) => config,
        Err(error) => return Ok(format_error_output(mode, &error, ExitCode::InvalidInput)),
    };

    let mut stderr = String::new();
    log_info(&mut stderr, "config show completed", mode.no_progress);

    let stdout = if mode.is_ndjson() || mode.is_json() {
        let config_value: serde_json::Value = serde_json::from_str(document.trim())?;
        let payload = serde_json::json!({
            "status": "ok",
            "configPath": path.map(|value| value.to_string_lossy().to_string()),
            "effectiveConfig": config_value,
        });
        let mut output = if mode.is_ndjson() {
            serde_json::to_string(&payload)?
        } else {
            serde_json::to_string_pretty(&payload)?
        };
        output.push('\n');
        output
    } else {
        let mut out = String::new();
        out.push_str("status: ok\nconfig:\n");
        out.push_str(&document);
        out
    };

    Ok(CliOutput {
        stdout,
        stderr,
        exit_code: ExitCode::Ok,
    })
}

pub(crate) fn format_error_output(
    mode: OutputMode,
    error: &InfraError,
    exit_code: ExitCode,
) -> CliOutput {
    let mut stderr = String::new();
    log_info(&mut stderr, "command failed", mode.no_progress);

    let meta: BTreeMap<&str, String> = error
        .metadata
        .iter()
        .map(|(key, value)| (key.as_str(), redact_if_sensitive(key, value)))
        .collect();
    let error_value = serde_json::json!({
        "code": error.code.to_string(),
        "message": error.message,
        "kind": error.kind.as_str(),
        "meta": meta,
    });

    let stdout = if mode.is_ndjson() {
        let payload = serde_json::json!({
            "type": "error",
            "status": "error",
            "error": error_value,
        });
        let mut out = serde_json::to_string(&payload).unwrap_or_else(|_| {
            "{\"type\":\"error\",\"status\":\"error\",\"error\":{\"code\":\"core:internal\",\"message\":\"internal error\",\"kind\":\"invariant\"}}".to_string()
        });
        out.push('\n');
        out
    } else if mode.is_json() {
        let payload = serde_json::json!({
            "status": "error",
            "error": error_value,
        });

        // This is a CLI boundary, so JSON serialization errors are internal.
        let mut output = serde_json::to_string_pretty(&payload).unwrap_or_else(|_| {
            "{\"status\":\"error\",\"error\":{\"code\":\"core:internal\",\"message\":\"internal error\",\"kind\":\"invariant\"}}".to_string()
        });
        output.push('\n');
        output
    } else {
        let mut out = format!(
            "status: error\ncode: {}\nmessage: {}\nkind: {}\n",
            error.code,
            error.message,
            error.kind.as_str()
        );
        if !meta.is_empty() {
            out.push_str("meta:\n");
            for (key, value) in &meta {
                out.push_str("  ");
                out.push_str(key);
                out.push_str(": ");
                out.push_str(value);
                out.push('\n');
            }
        }
        out
    };

    CliOutput {
        stdout,
        stderr,
        exit_code,
    }
}

pub(crate) fn infra_exit_code(error: &InfraError) -> ExitCode {
    match error.kind {
        ErrorKind::Expected => ExitCode::InvalidInput,
        ErrorKind::Invariant | ErrorKind::Unexpected => {
            if matches!(error.code.code(), "io" | "bind_failed") {
                ExitCode::Io
            } else {
                ExitCode::Internal
            }
        },
    }
}

fn log_info(stderr: &mut String, message: &str, no_progress: bool) {
    if no_progress {
        return;
    }
    stderr.push_str("info: ");
    stderr.push_str(message);
    stderr.push('\n');
}

fn format_ndjson_summary(status: &str, kind: &str, extra: Option<serde_json::Value>) -> String {
    let mut payload = serde_json::Map::new();
    payload.insert(
        "type".to_string(),
        serde_json::Value::String("summary".to_string()),
    );
    payload.insert(
        "status".to_string(),
        serde_json::Value::String(status.to_string()),
    );
    payload.insert(
        "kind".to_string(),
        serde_json::Value::String(kind.to_string()),
    );
    if let Some(serde_json::Value::Object(map)) = extra {
        for (key, value) in map {
            payload.insert(key, value);
        }
    }
    let mut out = serde_json::to_string(&serde_json::Value::Object(payload)).unwrap_or_else(|_| {
        "{\"type\":\"summary\",\"status\":\"error\",\"kind\":\"internal\"}".to_string()
    });
    out.push('\n');
    out
}

fn write_output(output: &CliOutput) -> Result<(), CliError> {
    let mut stdout = io::stdout();
    stdout.write_all(output.stdout.as_bytes())?;

    if !output.stderr.is_empty() {
        let mut stderr = io::stderr();
        stderr.write_all(output.stderr.as_bytes())?;
        stderr.flush()?;
    }

    Ok(())
}

fn collect_scoped_env(prefix: &str) -> BTreeMap<String, String> {
    std::env::vars()
        .filter(|(key, _)| key.starts_with(prefix))
        .collect()
}
