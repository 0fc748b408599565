//! End-to-end smoke tests driving the compiled binary against a temporary
//! data directory.

#![allow(clippy::unwrap_used)]

use assert_cmd::Command;
use predicates::prelude::*;
use std::path::Path;

fn pagebin(data_dir: &Path) -> Command {
    let mut cmd = Command::cargo_bin("pagebin").unwrap();
    cmd.env("PAGEBIN_DATA_DIR", data_dir);
    cmd.env_remove("PAGEBIN_CONFIG");
    cmd
}

fn create_page(data_dir: &Path, content: &str) -> serde_json::Value {
    let output = pagebin(data_dir)
        .args(["--json", "create"])
        .write_stdin(content.to_string())
        .assert()
        .success()
        .get_output()
        .stdout
        .clone();
    serde_json::from_slice(&output).unwrap()
}

#[test]
fn create_get_stats_delete_round_trip() {
    let dir = tempfile::tempdir().unwrap();

    let created = create_page(dir.path(), "<title>Smoke Test</title><p>body</p>");
    let id = created["id"].as_str().unwrap().to_string();
    assert_eq!(id.len(), 7);
    assert_eq!(created["password"].as_str().unwrap().len(), 5);

    pagebin(dir.path())
        .args(["get", &id])
        .assert()
        .success()
        .stdout(predicate::str::contains("Smoke Test"));

    pagebin(dir.path())
        .args(["--json", "stats"])
        .assert()
        .success()
        .stdout(predicate::str::contains("\"total\": 1"));

    pagebin(dir.path())
        .args(["delete", &id])
        .assert()
        .success()
        .stdout(predicate::str::contains("deleted"));

    pagebin(dir.path()).args(["get", &id]).assert().failure();
}

#[test]
fn list_reports_pagination_and_search() {
    let dir = tempfile::tempdir().unwrap();
    create_page(dir.path(), "<title>alpha one</title>");
    create_page(dir.path(), "<title>alpha two</title>");
    create_page(dir.path(), "<title>beta</title>");

    pagebin(dir.path())
        .args(["list"])
        .assert()
        .success()
        .stdout(predicate::str::contains("page 1 of 1 (3 total)"));

    pagebin(dir.path())
        .args(["list", "--search", "alpha"])
        .assert()
        .success()
        .stdout(predicate::str::contains("(2 total)"))
        .stdout(predicate::str::contains("alpha one"))
        .stdout(predicate::str::contains("beta").not());
}

#[test]
fn unknown_type_is_rejected_at_parse_time() {
    let dir = tempfile::tempdir().unwrap();

    pagebin(dir.path())
        .args(["create", "--type", "jsx"])
        .write_stdin("<p>x</p>".to_string())
        .assert()
        .failure()
        .stderr(predicate::str::contains("jsx"));
}
