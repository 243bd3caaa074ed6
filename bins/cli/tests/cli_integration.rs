//! CLI integration tests.

use serde_json::Value;
use std::error::Error;
use std::path::{Path, PathBuf};
use std::process::{Command, Output};

type TestResult = Result<(), Box<dyn Error>>;

fn workspace_root() -> PathBuf {
    let manifest_dir = Path::new(env!("CARGO_MANIFEST_DIR"));
    manifest_dir
        .parent()
        .and_then(Path::parent)
        .map_or_else(|| manifest_dir.to_path_buf(), Path::to_path_buf)
}

fn fixture_path(relative: &str) -> PathBuf {
    workspace_root().join("fixtures").join(relative)
}

fn cli() -> Command {
    let mut command = Command::new(env!("CARGO_BIN_EXE_qlinks"));
    for (key, _) in std::env::vars() {
        if key.starts_with("QL_") {
            command.env_remove(key);
        }
    }
    command.env_remove("RUST_LOG");
    command
}

fn run_in(dir: &Path, portal: &str, args: &[&str]) -> std::io::Result<Output> {
    cli()
        .env("QL_SETTINGS_BACKEND", "local")
        .env("QL_SETTINGS_DIR", dir)
        .env("QL_PORTAL_ID", portal)
        .args(args)
        .output()
}

fn stdout(output: &Output) -> String {
    String::from_utf8_lossy(&output.stdout).into_owned()
}

#[test]
fn version_reports_binary_name() -> TestResult {
    let output = cli().arg("--version").output()?;
    assert!(output.status.success());
    assert!(stdout(&output).starts_with("qlinks "));
    Ok(())
}

#[test]
fn config_validate_accepts_valid_fixture() -> TestResult {
    let config = fixture_path("config/quick-links.valid.json");
    let output = cli()
        .args(["config", "validate", "--config"])
        .arg(&config)
        .output()?;

    assert_eq!(output.status.code(), Some(0));
    let text = stdout(&output);
    assert!(text.contains("status: ok"));
    assert!(text.contains("settings backend: remote"));
    Ok(())
}

#[test]
fn config_validate_rejects_invalid_fixture() -> TestResult {
    let config = fixture_path("config/quick-links.invalid.json");
    let output = cli()
        .args(["config", "validate", "--output", "json", "--config"])
        .arg(&config)
        .output()?;

    assert_eq!(output.status.code(), Some(2));
    let body: Value = serde_json::from_slice(&output.stdout)?;
    assert_eq!(body.pointer("/status").and_then(Value::as_str), Some("error"));
    assert_eq!(
        body.pointer("/error/code").and_then(Value::as_str),
        Some("config:invalid_timeout")
    );
    Ok(())
}

#[test]
fn settings_add_persists_to_local_store() -> TestResult {
    let dir = tempfile::tempdir()?;

    let added = run_in(dir.path(), "7", &["settings", "add", "--scope", "contact"])?;
    assert_eq!(added.status.code(), Some(0), "{}", stdout(&added));
    assert!(stdout(&added).contains("4. \"Link 4\" <- <unset>"));
    assert!(dir.path().join("7.json").is_file());

    let shown = run_in(
        dir.path(),
        "7",
        &["settings", "show", "--scope", "contact", "--output", "json"],
    )?;
    assert_eq!(shown.status.code(), Some(0));
    let body: Value = serde_json::from_slice(&shown.stdout)?;
    assert_eq!(body.pointer("/kind").and_then(Value::as_str), Some("settings.show"));
    assert_eq!(
        body.pointer("/result/scopes/contact")
            .and_then(Value::as_array)
            .map(Vec::len),
        Some(4)
    );
    assert!(body.pointer("/result/scopes/company").is_none());
    Ok(())
}

#[test]
fn removing_the_last_button_is_rejected() -> TestResult {
    let dir = tempfile::tempdir()?;
    std::fs::write(
        dir.path().join("8.json"),
        r#"{ "contactButtons": [ { "urlProperty": "website", "labelType": "static", "staticLabel": "Site" } ], "companyButtons": [] }"#,
    )?;

    let output = run_in(
        dir.path(),
        "8",
        &["settings", "remove", "--scope", "contact", "--position", "1"],
    )?;
    assert_eq!(output.status.code(), Some(2));
    assert!(stdout(&output).contains("code: editor:last_button"));
    Ok(())
}

#[test]
fn resolve_renders_links_from_values_file() -> TestResult {
    let dir = tempfile::tempdir()?;
    std::fs::copy(
        fixture_path("settings/scoped.json"),
        dir.path().join("4242.json"),
    )?;
    let values = fixture_path("properties/record.json");

    let output = cli()
        .env("QL_SETTINGS_DIR", dir.path())
        .args([
            "resolve",
            "--portal",
            "4242",
            "--object-type",
            "COMPANY",
            "--record-id",
            "17",
            "--properties",
        ])
        .arg(&values)
        .output()?;

    assert_eq!(output.status.code(), Some(0), "{}", stdout(&output));
    let text = stdout(&output);
    assert!(text.contains("scope: company"));
    assert!(text.contains("1. Acme Corp -> https://acme.example"));
    Ok(())
}

#[test]
fn resolve_reports_empty_state_as_ndjson() -> TestResult {
    let dir = tempfile::tempdir()?;
    let output = run_in(dir.path(), "9", &["resolve", "--output", "ndjson"])?;

    assert_eq!(output.status.code(), Some(0));
    let line = stdout(&output);
    let summary: Value = serde_json::from_str(line.trim())?;
    assert_eq!(summary.pointer("/type").and_then(Value::as_str), Some("summary"));
    assert_eq!(
        summary.pointer("/result/outcome/kind").and_then(Value::as_str),
        Some("empty")
    );
    Ok(())
}
