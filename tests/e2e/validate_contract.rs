//! End-to-end tests: the `rportal` binary serving and probing over real sockets.
#![allow(missing_docs)]

use serde_json::Value;
use std::error::Error;
use std::net::TcpListener;
use std::process::{Child, Command, Output, Stdio};
use std::time::Duration;

type TestResult<T = ()> = Result<T, Box<dyn Error>>;

const NOT_FOUND_MESSAGE: &str =
    "No matching record found. Please verify your Name or USN and try again.";

fn rportal() -> Command {
    let mut command = Command::new(env!("CARGO_BIN_EXE_rportal"));
    for (key, _) in std::env::vars() {
        if key.starts_with("RP_") {
            command.env_remove(key);
        }
    }
    command.env_remove("RUST_LOG");
    command
}

fn free_local_addr() -> TestResult<String> {
    let listener = TcpListener::bind("127.0.0.1:0")?;
    Ok(listener.local_addr()?.to_string())
}

/// Kills the spawned server when dropped.
struct ServerProcess {
    child: Child,
    base_url: String,
}

impl ServerProcess {
    async fn spawn() -> TestResult<Self> {
        let addr = free_local_addr()?;
        let child = rportal()
            .args(["--no-progress", "serve"])
            .env("RP_SERVER_BIND", &addr)
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .spawn()?;
        let server = Self {
            child,
            base_url: format!("http://{addr}"),
        };
        server.wait_until_healthy().await?;
        Ok(server)
    }

    async fn wait_until_healthy(&self) -> TestResult {
        let client = reqwest::Client::new();
        for _ in 0..100 {
            if let Ok(response) = client.get(self.url("/healthz")).send().await {
                if response.status().is_success() {
                    return Ok(());
                }
            }
            tokio::time::sleep(Duration::from_millis(50)).await;
        }
        Err(format!("server at {} never became healthy", self.base_url).into())
    }

    fn url(&self, path_and_query: &str) -> String {
        format!("{}{path_and_query}", self.base_url)
    }
}

impl Drop for ServerProcess {
    fn drop(&mut self) {
        let _ = self.child.kill();
        let _ = self.child.wait();
    }
}

async fn get_json(server: &ServerProcess, path: &str) -> TestResult<(u16, Value)> {
    let response = reqwest::get(server.url(path)).await?;
    let status = response.status().as_u16();
    Ok((status, response.json().await?))
}

fn run_blocking(command: &mut Command) -> TestResult<Output> {
    Ok(command.output()?)
}

#[tokio::test]
async fn served_validate_endpoint_follows_the_contract() -> TestResult {
    let server = ServerProcess::spawn().await?;

    let (status, body) = get_json(&server, "/api/validate?usn=3vc24cd003").await?;
    assert_eq!(status, 200);
    assert_eq!(body["ok"], true);
    assert_eq!(body["student"]["usn"], "3VC24CD003");

    let (status, body) = get_json(&server, "/api/validate?fullName=%20%20a%20%20sakshi%20").await?;
    assert_eq!(status, 200);
    assert_eq!(body["student"]["usn"], "3VC24CD001");

    for path in [
        "/api/validate",
        "/api/validate?usn=%20%20",
        "/api/validate?usn=INVALID123",
    ] {
        let (status, body) = get_json(&server, path).await?;
        assert_eq!(status, 403, "{path}");
        assert_eq!(body, serde_json::json!({"ok": false, "error": NOT_FOUND_MESSAGE}));
    }

    let (status, students) = get_json(&server, "/api/students").await?;
    assert_eq!(status, 200);
    assert_eq!(students.as_array().map(Vec::len), Some(4));

    Ok(())
}

#[tokio::test]
async fn probe_passes_every_case_against_a_served_instance() -> TestResult {
    let server = ServerProcess::spawn().await?;
    let base_url = server.base_url.clone();

    let output = tokio::task::spawn_blocking(move || {
        run_blocking(rportal().args([
            "--output",
            "json",
            "--no-progress",
            "probe",
            "--base-url",
            &base_url,
        ]))
        .map_err(|error| error.to_string())
    })
    .await??;

    assert_eq!(output.status.code(), Some(0));
    let report: Value = serde_json::from_slice(&output.stdout)?;
    assert_eq!(report["status"], "ok");
    assert_eq!(report["summary"]["total"], 10);
    assert_eq!(report["summary"]["passed"], 10);
    assert_eq!(report["summary"]["failed"], 0);

    drop(server);
    Ok(())
}

#[test]
fn probe_against_a_closed_port_exits_non_zero() -> TestResult {
    let output = run_blocking(rportal().args([
        "--no-progress",
        "probe",
        "--base-url",
        "http://127.0.0.1:9",
    ]))?;

    assert_eq!(output.status.code(), Some(1));
    let stdout = String::from_utf8(output.stdout)?;
    assert!(stdout.lines().any(|line| line.starts_with("FAIL Valid USN: 3VC24CD001")));
    assert!(stdout.contains("passed: 0"));
    Ok(())
}

#[test]
fn lookup_runs_the_contract_in_process() -> TestResult {
    let found = run_blocking(rportal().args([
        "--output",
        "json",
        "lookup",
        "--full-name",
        "A SAKSHI",
    ]))?;
    assert_eq!(found.status.code(), Some(0));
    let value: Value = serde_json::from_slice(&found.stdout)?;
    assert_eq!(value["httpStatus"], 200);
    assert_eq!(value["response"]["student"]["usn"], "3VC24CD001");

    let mismatch = run_blocking(rportal().args([
        "--output",
        "json",
        "lookup",
        "--usn",
        "3VC24CD001",
        "--full-name",
        "ADITHYA PRAKASH R",
    ]))?;
    assert_eq!(mismatch.status.code(), Some(2));
    let value: Value = serde_json::from_slice(&mismatch.stdout)?;
    assert_eq!(value["httpStatus"], 403);
    assert_eq!(value["response"]["error"], NOT_FOUND_MESSAGE);
    Ok(())
}

#[test]
fn serve_reports_bind_failures() -> TestResult {
    let held = TcpListener::bind("127.0.0.1:0")?;
    let addr = held.local_addr()?.to_string();

    let output = run_blocking(rportal().args([
        "--output",
        "json",
        "--no-progress",
        "serve",
        "--bind",
        &addr,
    ]))?;

    assert_eq!(output.status.code(), Some(3));
    let value: Value = serde_json::from_slice(&output.stdout)?;
    assert_eq!(value["status"], "error");
    assert_eq!(value["error"]["code"], "server:bind_failed");
    Ok(())
}
