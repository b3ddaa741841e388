//! Corruption recovery tests for the pills binary.
//!
//! These tests verify the system can handle:
//! - Corrupted interaction state
//! - Corrupted or truncated journal lines
//! - An invalid catalog override
//! - Missing files

use assert_cmd::Command;
use predicates::prelude::*;
use std::fs;
use std::io::Write as IoWrite;
use std::path::Path;
use tempfile::TempDir;

fn cli(data_dir: &Path) -> Command {
    let mut cmd = Command::new(assert_cmd::cargo::cargo_bin!("pills"));
    cmd.env("XDG_CONFIG_HOME", data_dir.join("config"))
        .arg("--data-dir")
        .arg(data_dir);
    cmd
}

fn setup_test_dir() -> TempDir {
    tempfile::tempdir().expect("Failed to create temp dir")
}

#[test]
fn test_corrupted_interaction_state() {
    let temp_dir = setup_test_dir();
    let data_dir = temp_dir.path();

    fs::create_dir_all(data_dir.join("state")).unwrap();
    fs::write(data_dir.join("state/interactions.json"), "{ invalid json }}}}").unwrap();

    // Treated as no interactions
    cli(data_dir)
        .args(["recommend", "--user", "1"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Database Design Fundamentals"));

    // Next save replaces the corrupt file
    cli(data_dir)
        .args(["complete", "--user", "1", "--content", "9"])
        .assert()
        .success();

    let contents = fs::read_to_string(data_dir.join("state/interactions.json")).unwrap();
    let state: serde_json::Value = serde_json::from_str(&contents).unwrap();
    assert_eq!(state["users"]["1"][0]["content_id"], 9);
}

#[test]
fn test_corrupted_journal_lines_skipped() {
    let temp_dir = setup_test_dir();
    let data_dir = temp_dir.path();

    cli(data_dir)
        .args(["stress", "log", "--user", "1", "--level", "critical"])
        .assert()
        .success();

    let journal = data_dir.join("log/stress_indicators.jsonl");
    let mut file = fs::OpenOptions::new().append(true).open(&journal).unwrap();
    writeln!(file, "{{ invalid json }}").unwrap();
    writeln!(file, "{{\"stress_level\": 9}}").unwrap();

    cli(data_dir)
        .args(["stress", "latest", "--user", "1"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Critical"));
}

#[test]
fn test_partial_journal_line() {
    let temp_dir = setup_test_dir();
    let data_dir = temp_dir.path();

    fs::create_dir_all(data_dir.join("log")).unwrap();
    // Simulate a crash mid-write
    fs::write(
        data_dir.join("log/health_metrics.jsonl"),
        "{\"id\":\"00000000-0000-0000-0000-000000000000\",\"user_id\":1,\"rea",
    )
    .unwrap();

    cli(data_dir)
        .args(["ingest", "--user", "1", "--hr", "72"])
        .assert()
        .success();

    cli(data_dir)
        .args(["metrics", "latest", "--user", "1"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Heart rate: 72 bpm"));
}

#[test]
fn test_invalid_catalog_override_refused() {
    let temp_dir = setup_test_dir();
    let data_dir = temp_dir.path();

    // A video without a URL fails validation
    fs::write(
        data_dir.join("catalog.json"),
        r#"[{"id": 1, "title": "Broken", "content_type": 2, "body": "",
            "created_at": "2025-01-01T00:00:00Z"}]"#,
    )
    .unwrap();

    cli(data_dir)
        .args(["recommend", "--user", "1"])
        .assert()
        .failure();
}

#[test]
fn test_invalid_catalog_does_not_block_ingestion() {
    let temp_dir = setup_test_dir();
    let data_dir = temp_dir.path();

    fs::write(
        data_dir.join("catalog.json"),
        r#"[{"id": 1, "title": "Broken", "content_type": 2, "body": "",
            "created_at": "2025-01-01T00:00:00Z"}]"#,
    )
    .unwrap();

    cli(data_dir)
        .args(["ingest", "--user", "1", "--hr", "130", "--sleep", "5"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Derived stress level: Critical"));

    cli(data_dir)
        .args(["stress", "latest", "--user", "1"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Critical"));

    // Catalog-backed commands still refuse the broken file
    cli(data_dir)
        .args(["complete", "--user", "1", "--content", "1"])
        .assert()
        .failure();
}

#[test]
fn test_duplicate_catalog_ids_refused() {
    let temp_dir = setup_test_dir();
    let data_dir = temp_dir.path();

    fs::write(
        data_dir.join("catalog.json"),
        r#"[{"id": 7, "title": "First", "content_type": 1, "body": "",
             "created_at": "2025-01-01T00:00:00Z"},
            {"id": 7, "title": "Second", "content_type": 1, "body": "",
             "created_at": "2025-01-02T00:00:00Z"}]"#,
    )
    .unwrap();

    cli(data_dir)
        .args(["content", "list"])
        .assert()
        .failure();
}

#[test]
fn test_catalog_override_replaces_seed() {
    let temp_dir = setup_test_dir();
    let data_dir = temp_dir.path();

    fs::write(
        data_dir.join("catalog.json"),
        r#"[{"id": 100, "title": "Breathing Basics", "content_type": 1,
            "body": "Box breathing in four steps.", "tags": ["calm"],
            "created_at": "2025-06-01T00:00:00Z"}]"#,
    )
    .unwrap();

    cli(data_dir)
        .args(["recommend", "--user", "1"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Breathing Basics"))
        .stdout(predicate::str::contains("Docker").not());
}

#[test]
fn test_malformed_config_reported() {
    let temp_dir = setup_test_dir();
    let data_dir = temp_dir.path();
    let config_path = data_dir.join("config.toml");
    fs::write(&config_path, "[recommendations\npage_size = ").unwrap();

    cli(data_dir)
        .arg("--config")
        .arg(&config_path)
        .args(["recommend", "--user", "1"])
        .assert()
        .failure();
}

#[test]
fn test_empty_data_directory() {
    let temp_dir = setup_test_dir();
    let data_dir = temp_dir.path();

    cli(data_dir)
        .args(["stress", "history", "--user", "1"])
        .assert()
        .success()
        .stdout(predicate::str::contains("No stress history for user 1"));

    cli(data_dir)
        .args(["export", "metrics", "--user", "1", "--out"])
        .arg(data_dir.join("metrics.csv"))
        .assert()
        .success()
        .stdout(predicate::str::contains("Exported 0 health metrics"));
}
