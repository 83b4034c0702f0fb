//! End-to-end tests for config and info commands.
#![allow(missing_docs)]

use serde_json::Value;
use std::error::Error;
use std::path::PathBuf;
use std::process::{Command, Output};

type TestResult<T = ()> = Result<T, Box<dyn Error>>;

fn run_cli(args: &[&str], env: &[(&str, &str)]) -> TestResult<Output> {
    let mut command = Command::new(env!("CARGO_BIN_EXE_rportal"));
    for (key, _) in std::env::vars() {
        if key.starts_with("RP_") {
            command.env_remove(key);
        }
    }
    command.args(args);
    for (key, value) in env {
        command.env(key, value);
    }
    Ok(command.output()?)
}

fn temp_dir(label: &str) -> TestResult<PathBuf> {
    let unique = std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)?
        .as_nanos();
    let dir = std::env::temp_dir().join(format!("rp-cli-e2e-{label}-{unique}"));
    std::fs::create_dir_all(&dir)?;
    Ok(dir)
}

#[test]
fn info_reports_versions() -> TestResult {
    let output = run_cli(&["--output", "json", "info"], &[])?;
    assert_eq!(output.status.code(), Some(0));
    let value: Value = serde_json::from_slice(&output.stdout)?;
    assert_eq!(value["status"], "ok");
    assert_eq!(value["build"]["name"], "rportal");
    Ok(())
}

#[test]
fn config_show_reflects_env_overrides() -> TestResult {
    let output = run_cli(
        &["--output", "json", "--no-progress", "config", "show"],
        &[
            ("RP_SERVER_BIND", "127.0.0.1:8123"),
            ("RP_SERVER_ENVIRONMENT", "production"),
            ("RP_LOG_FORMAT", "json"),
        ],
    )?;
    assert_eq!(output.status.code(), Some(0));
    let value: Value = serde_json::from_slice(&output.stdout)?;
    let config = &value["effectiveConfig"];
    assert_eq!(config["server"]["bind"], "127.0.0.1:8123");
    assert_eq!(config["server"]["environment"], "production");
    assert_eq!(config["logging"]["format"], "json");
    assert_eq!(config["dataset"]["source"], "builtin");
    Ok(())
}

#[test]
fn config_show_renders_toml_text() -> TestResult {
    let output = run_cli(
        &["--no-progress", "config", "show", "--format", "toml"],
        &[],
    )?;
    assert_eq!(output.status.code(), Some(0));
    let stdout = String::from_utf8(output.stdout)?;
    assert!(stdout.starts_with("status: ok\nconfig:\n"));
    assert!(stdout.contains("[server]"));
    assert!(stdout.contains("[dataset]"));
    Ok(())
}

#[test]
fn config_check_reads_files_and_overrides() -> TestResult {
    let dir = temp_dir("check")?;
    let path = dir.join("portal.toml");
    std::fs::write(
        &path,
        "[server]\nbind = \"0.0.0.0:9000\"\nenvironment = \"staging\"\n",
    )?;
    let path_arg = path.to_string_lossy().to_string();

    let output = run_cli(
        &[
            "--output",
            "json",
            "--no-progress",
            "config",
            "check",
            "--path",
            &path_arg,
            "--overrides-json",
            r#"{"probe":{"timeoutMs":2500}}"#,
        ],
        &[],
    )?;
    assert_eq!(output.status.code(), Some(0));
    let value: Value = serde_json::from_slice(&output.stdout)?;
    assert_eq!(value["configPath"], path_arg.as_str());
    assert_eq!(value["effectiveConfig"]["server"]["bind"], "0.0.0.0:9000");
    assert_eq!(value["effectiveConfig"]["server"]["environment"], "staging");
    assert_eq!(value["effectiveConfig"]["probe"]["timeoutMs"], 2500);

    let _ = std::fs::remove_dir_all(&dir);
    Ok(())
}

#[test]
fn invalid_env_values_exit_with_invalid_input() -> TestResult {
    let output = run_cli(
        &["--output", "json", "--no-progress", "config", "check"],
        &[("RP_PROBE_TIMEOUT_MS", "soon")],
    )?;
    assert_eq!(output.status.code(), Some(2));
    let value: Value = serde_json::from_slice(&output.stdout)?;
    assert_eq!(value["status"], "error");
    assert_eq!(value["error"]["kind"], "expected");
    Ok(())
}

#[test]
fn missing_config_file_is_reported_as_text() -> TestResult {
    let dir = temp_dir("missing")?;
    let path = dir.join("absent.json");
    let path_arg = path.to_string_lossy().to_string();

    let output = run_cli(&["--no-progress", "config", "check", "--path", &path_arg], &[])?;
    assert_eq!(output.status.code(), Some(2));
    let stdout = String::from_utf8(output.stdout)?;
    assert!(stdout.starts_with("status: error\n"));
    assert!(stdout.contains("code: config:config_file_not_found"));

    let _ = std::fs::remove_dir_all(&dir);
    Ok(())
}

#[test]
fn ndjson_config_check_emits_a_summary_line() -> TestResult {
    let output = run_cli(
        &["--output", "ndjson", "--no-progress", "config", "check"],
        &[],
    )?;
    assert_eq!(output.status.code(), Some(0));
    let stdout = String::from_utf8(output.stdout)?;
    let last = stdout.lines().last().ok_or("no output")?;
    let value: Value = serde_json::from_str(last)?;
    assert_eq!(value["type"], "summary");
    assert_eq!(value["status"], "ok");
    Ok(())
}
