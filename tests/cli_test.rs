mod common;

use assert_cmd::Command;
use common::fixture_path;
use predicates::prelude::*;
use serde_json::Value;
use tempfile::TempDir;

/// Runs the binary from an empty directory so no local config file is picked up.
fn client_count(work_dir: &TempDir) -> Command {
    let mut cmd = Command::cargo_bin("client-count").unwrap();
    cmd.current_dir(work_dir.path())
        .env_remove("LOG_LEVEL")
        .env_remove("LOG_OUTPUT")
        .env_remove("LOG_FORMAT")
        .env_remove("CLIENT_COUNT_LOG_DIR")
        .env_remove("RUST_LOG");
    cmd
}

fn stdout_json(output: &std::process::Output) -> Value {
    serde_json::from_slice(&output.stdout).unwrap()
}

#[test]
fn test_summary_json() {
    let work_dir = TempDir::new().unwrap();
    let output = client_count(&work_dir)
        .arg("summary")
        .arg(fixture_path("activity_response.json"))
        .arg("--versions")
        .arg(fixture_path("version_history.json"))
        .arg("--json")
        .output()
        .unwrap();
    assert!(output.status.success());

    let report = stdout_json(&output);
    assert_eq!(report["start_time"], "2023-08-01T00:00:00Z");
    assert_eq!(report["upgrades"][0]["version"], "1.10.1");
    assert_eq!(report["upgrades"].as_array().unwrap().len(), 1);
    assert_eq!(report["average_clients"], 2179);
    assert_eq!(report["by_month"][0]["month"], "8/23");
    assert_eq!(report["by_month"][1]["month"], "9/23");
}

#[test]
fn test_summary_text() {
    let work_dir = TempDir::new().unwrap();
    client_count(&work_dir)
        .arg("summary")
        .arg(fixture_path("activity_response.json"))
        .assert()
        .success()
        .stdout(predicate::str::contains("Billing Period Summary"))
        .stdout(predicate::str::contains("ns1"));
}

#[test]
fn test_months_for_mount() {
    let work_dir = TempDir::new().unwrap();
    let output = client_count(&work_dir)
        .args(["months"])
        .arg(fixture_path("activity_response.json"))
        .args(["--namespace", "root", "--mount", "pki-engine-0", "--json"])
        .output()
        .unwrap();
    assert!(output.status.success());

    let series = stdout_json(&output);
    let points = series.as_array().unwrap();
    assert_eq!(points.len(), 2);
    assert!(points[0]["counts"].is_null());
    assert_eq!(points[1]["counts"]["acme_clients"], 792);
    assert_eq!(points[1]["new_clients"]["clients"], 98);
}

#[test]
fn test_months_text_shows_no_data() {
    let work_dir = TempDir::new().unwrap();
    client_count(&work_dir)
        .arg("months")
        .arg(fixture_path("activity_response.json"))
        .assert()
        .success()
        .stdout(predicate::str::contains("no data"));
}

#[test]
fn test_filters_with_stale_selection() {
    let work_dir = TempDir::new().unwrap();
    let output = client_count(&work_dir)
        .arg("filters")
        .arg("--export")
        .arg(fixture_path("export.jsonl"))
        .args(["--mount-type", "ldap", "--search", "july", "--dimension", "month", "--json"])
        .output()
        .unwrap();
    assert!(output.status.success());

    let report = stdout_json(&output);
    assert_eq!(report["dropdown_items"]["mountType"][2], "userpass");
    assert_eq!(report["alerts"][0], "Mount type \"ldap\" not found in the current data.");
    assert_eq!(report["search"]["matches"][0], "2024-07-01T00:00:00Z");
}

#[test]
fn test_filters_requires_a_source() {
    let work_dir = TempDir::new().unwrap();
    client_count(&work_dir).arg("filters").assert().failure();
}

#[test]
fn test_window_json() {
    let work_dir = TempDir::new().unwrap();
    let output = client_count(&work_dir)
        .args(["window", "--year", "2024", "--month", "2", "--json"])
        .output()
        .unwrap();
    assert!(output.status.success());

    let window = stdout_json(&output);
    assert_eq!(window["start"], 1706745600);
    assert_eq!(window["end"], 1709164800);
}

#[test]
fn test_window_rejects_month_out_of_range() {
    let work_dir = TempDir::new().unwrap();
    client_count(&work_dir)
        .args(["window", "--year", "2024", "--month", "13"])
        .assert()
        .failure();
}

#[test]
fn test_missing_activity_file_json_error() {
    let work_dir = TempDir::new().unwrap();
    client_count(&work_dir)
        .args(["summary", "missing.json", "--json"])
        .assert()
        .code(1)
        .stdout(predicate::str::contains("\"error\""))
        .stdout(predicate::str::contains("missing.json"));
}

fn read_log_files(log_dir: &std::path::Path) -> String {
    std::fs::read_dir(log_dir)
        .unwrap()
        .map(|entry| entry.unwrap().path())
        .filter(|path| {
            path.file_name()
                .and_then(|name| name.to_str())
                .is_some_and(|name| name.starts_with("client-count.log"))
        })
        .map(|path| std::fs::read_to_string(path).unwrap())
        .collect()
}

#[test]
fn test_failing_run_flushes_file_log() {
    let work_dir = TempDir::new().unwrap();
    let log_dir = work_dir.path().join("logs");
    std::fs::write(
        work_dir.path().join("client-count.toml"),
        format!(
            "[logging]\nlevel = \"INFO\"\noutput = \"file\"\n\n[paths]\nlog_directory = '{}'\n",
            log_dir.display()
        ),
    )
    .unwrap();

    client_count(&work_dir)
        .args(["summary", "missing.json", "--json"])
        .assert()
        .code(1);

    let logs = read_log_files(&log_dir);
    assert!(logs.contains("Loaded configuration from file"), "log was: {}", logs);
    assert!(logs.contains("client-count.toml"));
    assert!(logs.contains("Command failed"), "log was: {}", logs);
}
