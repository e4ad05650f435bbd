//! Smoke tests for the tiercast binary.

use assert_cmd::Command;
use predicates::prelude::*;

fn write_config(dir: &tempfile::TempDir) -> std::path::PathBuf {
    let config_path = dir.path().join("tiercast.toml");
    let history_path = dir.path().join("history.json");
    std::fs::write(
        &config_path,
        format!(
            "[history]\npath = \"{}\"\n\n[log]\nlevel = \"warn\"\n",
            history_path.display()
        ),
    )
    .unwrap();
    config_path
}

#[test]
fn help_lists_subcommands() {
    Command::cargo_bin("tiercast")
        .unwrap()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("record"))
        .stdout(predicate::str::contains("quantiles"));
}

#[test]
fn stats_on_fresh_store_reports_no_data() {
    let dir = tempfile::tempdir().unwrap();
    let config = write_config(&dir);

    Command::cargo_bin("tiercast")
        .unwrap()
        .args(["stats", "--config"])
        .arg(&config)
        .assert()
        .success()
        .stdout(predicate::str::contains("no predictions buffered yet"));
}

#[test]
fn record_then_recent_round_trips() {
    let dir = tempfile::tempdir().unwrap();
    let config = write_config(&dir);

    Command::cargo_bin("tiercast")
        .unwrap()
        .args([
            "record",
            "--probability",
            "0.25",
            "--employees",
            "50",
            "--config",
        ])
        .arg(&config)
        .assert()
        .success()
        .stdout(predicate::str::contains("tier A"));

    Command::cargo_bin("tiercast")
        .unwrap()
        .args(["recent", "-n", "5", "--config"])
        .arg(&config)
        .assert()
        .success()
        .stdout(predicate::str::contains("p=0.2500"));
}

#[test]
fn status_emits_json_when_asked() {
    let dir = tempfile::tempdir().unwrap();
    let config = write_config(&dir);

    let output = Command::cargo_bin("tiercast")
        .unwrap()
        .args(["status", "--json", "--config"])
        .arg(&config)
        .output()
        .unwrap();
    assert!(output.status.success());

    let parsed: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(parsed["history"]["len"], 0);
}

#[test]
fn rejects_malformed_summary_json() {
    let dir = tempfile::tempdir().unwrap();
    let config = write_config(&dir);

    Command::cargo_bin("tiercast")
        .unwrap()
        .args([
            "record",
            "--probability",
            "0.1",
            "--employees",
            "10",
            "--summary",
            "not json",
            "--config",
        ])
        .arg(&config)
        .assert()
        .failure();
}