//! CLI behaviour of the swmmscan binary

use assert_cmd::Command;
use predicates::prelude::*;
use std::fs;
use tempfile::TempDir;

use crate::helpers::fixture_path;

/// swmmscan with HOME pointed at a scratch directory.
fn swmmscan(home: &TempDir) -> Command {
    let mut cmd = Command::cargo_bin("swmmscan").unwrap();
    cmd.env("HOME", home.path())
        .env("NO_COLOR", "1")
        .env_remove("RUST_LOG");
    cmd
}

#[test]
fn parse_prints_text_summary() {
    let home = TempDir::new().unwrap();
    swmmscan(&home)
        .arg("parse")
        .arg(fixture_path("swmm5_full.rpt"))
        .arg("--no-log")
        .assert()
        .success()
        .stdout(predicate::str::contains("swmm5_full.rpt"))
        .stdout(predicate::str::contains("Flooded nodes: 3"))
        .stdout(predicate::str::contains("J-14"))
        .stdout(predicate::str::contains("C-22"))
        .stdout(predicate::str::contains("Flow Routing"));
}

#[test]
fn parse_json_keeps_argument_order() {
    let home = TempDir::new().unwrap();
    let output = swmmscan(&home)
        .args(["parse", "--format", "json", "--no-log", "--top", "1"])
        .arg(fixture_path("compact.rpt"))
        .arg(fixture_path("swmm5_full.rpt"))
        .output()
        .unwrap();
    assert!(output.status.success());

    let value: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    let files: Vec<&str> = value
        .as_array()
        .unwrap()
        .iter()
        .map(|f| f["file"].as_str().unwrap())
        .collect();
    assert_eq!(files, vec!["compact.rpt", "swmm5_full.rpt"]);
    assert_eq!(value[1]["top_flooded"].as_array().unwrap().len(), 1);
    assert_eq!(value[1]["top_flooded"][0]["node_id"], "J-14");
    assert_eq!(value[1]["report"]["summary"]["flooded_node_count"], 3);
}

#[test]
fn parse_appends_session_log() {
    let home = TempDir::new().unwrap();
    swmmscan(&home)
        .arg("parse")
        .arg(fixture_path("compact.rpt"))
        .assert()
        .success();

    let log = home
        .path()
        .join(".local")
        .join("share")
        .join("swmmscan")
        .join("sessions.jsonl");
    let contents = fs::read_to_string(&log).unwrap();
    assert_eq!(contents.lines().count(), 1);
    assert!(contents.contains("\"file_id\":\"compact.rpt\""));
}

#[test]
fn missing_file_fails_but_prints_the_rest() {
    let home = TempDir::new().unwrap();
    swmmscan(&home)
        .args(["parse", "--no-log", "does-not-exist.rpt"])
        .arg(fixture_path("compact.rpt"))
        .assert()
        .failure()
        .stdout(predicate::str::contains("compact.rpt"))
        .stderr(predicate::str::contains("does-not-exist.rpt"))
        .stderr(predicate::str::contains("1 of 2 reports could not be opened"));
}

#[test]
fn facts_prints_fact_sheet() {
    let home = TempDir::new().unwrap();
    swmmscan(&home)
        .arg("facts")
        .arg(fixture_path("malformed.rpt"))
        .assert()
        .success()
        .stdout(predicate::str::starts_with("SWMM report facts: malformed.rpt"))
        .stdout(predicate::str::contains("1 row could not be parsed"));
}

#[test]
fn config_init_then_show() {
    let home = TempDir::new().unwrap();
    let path = home.path().join("custom.toml");
    swmmscan(&home)
        .args(["config", "init", "--config"])
        .arg(&path)
        .assert()
        .success();
    assert!(path.exists());

    swmmscan(&home)
        .args(["config", "init", "--config"])
        .arg(&path)
        .assert()
        .failure()
        .stderr(predicate::str::contains("already exists"));

    swmmscan(&home)
        .args(["config", "show", "--config"])
        .arg(&path)
        .assert()
        .success()
        .stdout(predicate::str::contains("top_n = 5"))
        .stdout(predicate::str::contains("[sessions]"));
}

#[test]
fn config_path_defaults_under_home() {
    let home = TempDir::new().unwrap();
    swmmscan(&home)
        .args(["config", "path"])
        .assert()
        .success()
        .stdout(predicate::str::contains(".config/swmmscan/config.toml"));
}

#[test]
fn invalid_config_is_reported() {
    let home = TempDir::new().unwrap();
    let path = home.path().join("bad.toml");
    fs::write(&path, "[output]\ntop_n = 0\n").unwrap();
    swmmscan(&home)
        .args(["parse", "--config"])
        .arg(&path)
        .arg(fixture_path("compact.rpt"))
        .assert()
        .failure()
        .stderr(predicate::str::contains("top_n"));
}

#[test]
fn completions_are_generated() {
    let home = TempDir::new().unwrap();
    swmmscan(&home)
        .args(["completions", "bash"])
        .assert()
        .success()
        .stdout(predicate::str::contains("swmmscan"));
}
