//! Smoke tests for the trapcheck CLI
//!
//! These tests verify basic CLI functionality works correctly against the
//! simulated dialog page; no browser is needed.

#![allow(deprecated)] // Allow deprecated Command::cargo_bin until assert_cmd is updated
#![allow(clippy::expect_used, clippy::unwrap_used)]

use assert_cmd::Command;
use predicates::prelude::*;
use std::fs;
use tempfile::TempDir;

/// Get a command for the trapcheck binary
fn trapcheck() -> Command {
    Command::cargo_bin("trapcheck").expect("trapcheck binary should exist")
}

// ============================================================================
// Basic CLI Tests
// ============================================================================

#[test]
fn test_help_flag() {
    trapcheck()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("run"))
        .stdout(predicate::str::contains("simulate"))
        .stdout(predicate::str::contains("fixtures"));
}

#[test]
fn test_version_flag() {
    trapcheck()
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains("0.2.0"));
}

#[test]
fn test_no_args_shows_help() {
    trapcheck().assert().failure(); // Requires a subcommand
}

#[test]
fn test_run_subcommand_help() {
    trapcheck()
        .args(["run", "--help"])
        .assert()
        .success()
        .stdout(predicate::str::contains("--settle-timeout-ms"))
        .stdout(predicate::str::contains("--no-sandbox"));
}

// ============================================================================
// Simulate
// ============================================================================

#[test]
fn test_simulate_builtin_suite_passes() {
    trapcheck()
        .args([
            "simulate",
            "--color",
            "never",
            "--settle-timeout-ms",
            "20",
        ])
        .assert()
        .success()
        .stdout(predicate::str::contains("ok   key-tab (18/18 assertions"))
        .stdout(predicate::str::contains("ok   key-escape (14/14 assertions"))
        .stdout(predicate::str::contains("7/7 scenarios passed, 58 assertions"));
}

#[test]
fn test_simulate_selected_scenario_json() {
    let output = trapcheck()
        .args([
            "simulate",
            "--scenario",
            "dialog-role",
            "--format",
            "json",
        ])
        .assert()
        .success()
        .get_output()
        .stdout
        .clone();
    let value: serde_json::Value = serde_json::from_slice(&output).unwrap();
    assert_eq!(value["scenarios"].as_array().unwrap().len(), 1);
    assert_eq!(value["scenarios"][0]["name"], "dialog-role");
    assert_eq!(value["scenarios"][0]["planned"], 5);
}

#[test]
fn test_simulate_unknown_scenario_fails() {
    trapcheck()
        .args(["simulate", "--scenario", "key-space"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("unknown scenario"));
}

#[test]
fn test_simulate_failing_suite_exits_nonzero() {
    let temp = TempDir::new().unwrap();
    let path = temp.path().join("suite.yaml");
    fs::write(
        &path,
        r#"
aria:
  dialog_selector: '[role="dialog"]'
  expected_dialog_count: 2
  expected_tag: div
  describedby_selector: '#only'
dialogs:
  - name: only
    container: '#only'
    trigger: ['#open']
    focusable: ['#only input', '#only button']
"#,
    )
    .unwrap();

    trapcheck()
        .args([
            "simulate",
            "--color",
            "never",
            "--scenario",
            "dialog-role",
            "--config",
        ])
        .arg(&path)
        .assert()
        .failure()
        .stdout(predicate::str::contains("FAIL dialog-role"))
        .stderr(predicate::str::contains("1 of 1 scenario(s) failed"));
}

#[test]
fn test_simulate_writes_output_file() {
    let temp = TempDir::new().unwrap();
    let report = temp.path().join("report.json");

    trapcheck()
        .args([
            "simulate",
            "--scenario",
            "aria-modal",
            "--format",
            "json",
            "--output",
        ])
        .arg(&report)
        .assert()
        .success();

    let content = fs::read_to_string(&report).unwrap();
    assert!(content.contains("\"aria-modal\""));
}

#[test]
fn test_quiet_pass_prints_nothing() {
    trapcheck()
        .args(["-q", "simulate", "--scenario", "aria-modal"])
        .assert()
        .success()
        .stdout(predicate::str::is_empty());
}

// ============================================================================
// Fixtures
// ============================================================================

#[test]
fn test_fixtures_prints_builtin_yaml() {
    trapcheck()
        .arg("fixtures")
        .assert()
        .success()
        .stdout(predicate::str::contains("name: dialog1"))
        .stdout(predicate::str::contains("settle_timeout_ms: 200"));
}

#[test]
fn test_fixtures_round_trip_through_config() {
    let temp = TempDir::new().unwrap();
    let path = temp.path().join("suite.yaml");
    let dumped = trapcheck()
        .arg("fixtures")
        .assert()
        .success()
        .get_output()
        .stdout
        .clone();
    fs::write(&path, dumped).unwrap();

    trapcheck()
        .args([
            "simulate",
            "--scenario",
            "key-shift-tab",
            "--settle-timeout-ms",
            "20",
            "--config",
        ])
        .arg(&path)
        .assert()
        .success();
}

#[test]
fn test_missing_config_fails() {
    trapcheck()
        .args(["fixtures", "--config", "/nonexistent/suite.yaml"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("suite file not found"));
}

#[test]
fn test_run_without_url_fails() {
    trapcheck()
        .args(["run", "--scenario", "aria-modal"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Error:"));
}
