//! End-to-end tests for the `clawlog` binary.

use std::fs;

use assert_cmd::Command;
use predicates::prelude::*;

fn clawlog() -> Command {
    let mut cmd = Command::cargo_bin("clawlog").expect("binary built");
    cmd.env_remove("CLAWLOG_CONFIG");
    cmd
}

#[test]
fn generate_prints_matching_name() {
    clawlog()
        .args(["generate", "svc@%t.%sr.log", "-n", "2"])
        .assert()
        .success()
        .stdout(predicate::str::is_match(r"^(svc@\d{12}\.[0-9A-F]{8}\.log\n){2}$").expect("regex"));
}

#[test]
fn match_exit_code_reflects_result() {
    clawlog()
        .args(["match", "app@%t.%sr.log", "app@240102030405.0A1B2C3D.log"])
        .assert()
        .success()
        .stdout(predicate::str::contains("\tmatch"));

    clawlog()
        .args(["match", "app@%t.%sr.log", "app@24010203040.X.log"])
        .assert()
        .failure()
        .stdout(predicate::str::contains("no match"));
}

#[test]
fn write_appends_to_configured_directory() {
    let dir = tempfile::tempdir().expect("tempdir");
    let config = dir.path().join("sink.json");
    let location = dir.path().join("logs");
    fs::write(
        &config,
        serde_json::json!({
            "location": location,
            "name_format": "e2e@%t.%sr.log",
        })
        .to_string(),
    )
    .expect("write config");

    let assert = clawlog()
        .args(["write", "hello from e2e", "--severity", "important", "--config"])
        .arg(&config)
        .assert()
        .success();

    let path = String::from_utf8(assert.get_output().stdout.clone()).expect("utf8");
    let content = fs::read_to_string(path.trim()).expect("read log");
    assert!(content.starts_with("[Important Info @ "));
    assert!(content.trim_end().ends_with(":: hello from e2e"));
}

#[test]
fn write_fails_without_directory_when_creation_disabled() {
    let dir = tempfile::tempdir().expect("tempdir");
    clawlog()
        .args(["write", "nowhere", "--no-create-dir", "--location"])
        .arg(dir.path().join("missing"))
        .assert()
        .failure()
        .stderr(predicate::str::contains("no log file could be created"));
}

#[test]
fn sweep_requires_auto_delete() {
    let dir = tempfile::tempdir().expect("tempdir");
    clawlog()
        .args(["sweep", "--location"])
        .arg(dir.path())
        .assert()
        .failure()
        .stderr(predicate::str::contains("auto delete logs is not enabled"));
}
