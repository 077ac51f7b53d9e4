//! Integration tests for the optdeps CLI binary.
//!
//! These tests exercise the actual compiled binary using assert_cmd.

use assert_cmd::Command;
use optdeps_test_utils::{TestProject, sample_declarations};
use predicates::prelude::*;
use serde_json::json;

/// Get a Command for the optdeps binary
fn optdeps_cmd() -> Command {
    Command::new(assert_cmd::cargo::cargo_bin!("optdeps"))
}

// ============================================================================
// Help and Version Tests
// ============================================================================

#[test]
fn test_help_output() {
    optdeps_cmd()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("optional packages"));
}

#[test]
fn test_version_output() {
    optdeps_cmd()
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains("optdeps"));
}

#[test]
fn test_no_command_shows_help_hint() {
    optdeps_cmd()
        .assert()
        .success()
        .stdout(predicate::str::contains("optdeps --help"));
}

#[test]
fn test_completions() {
    optdeps_cmd()
        .args(["completions", "bash"])
        .assert()
        .success()
        .stdout(predicate::str::contains("optdeps"));
}

// ============================================================================
// List
// ============================================================================

#[test]
fn test_list_shows_declarations() {
    let project = TestProject::new();
    project.write_manifest_with_declarations(sample_declarations());

    optdeps_cmd()
        .arg("list")
        .current_dir(project.root())
        .assert()
        .success()
        .stdout(predicate::str::contains("zendframework/zend-db"))
        .stdout(predicate::str::contains("3 of 3 declarations valid"));
}

#[test]
fn test_list_json_reports_invalid_entries() {
    let project = TestProject::new();
    project.write_manifest_with_declarations(json!([
        {"name": "x/a", "constraint": "^1.0"},
        {"name": "x/b"}
    ]));
    let before = project.read_manifest_text();

    let output = optdeps_cmd()
        .args(["list", "--json"])
        .current_dir(project.root())
        .output()
        .unwrap();
    assert!(output.status.success());

    let listed: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(listed[0]["valid"], true);
    assert_eq!(listed[0]["package"]["name"], "x/a");
    assert_eq!(listed[1]["valid"], false);
    assert_eq!(project.read_manifest_text(), before);
}

#[test]
fn test_list_with_custom_tool_key() {
    let project = TestProject::new();
    project.write_manifest(&json!({
        "extra": {"zend-skeleton-installer": [{"name": "x/a", "constraint": "^1.0"}]}
    }));

    optdeps_cmd()
        .args(["list", "--tool-key", "zend-skeleton-installer"])
        .current_dir(project.root())
        .assert()
        .success()
        .stdout(predicate::str::contains("1 of 1 declarations valid"));
}

// ============================================================================
// Install
// ============================================================================

#[test]
fn test_install_missing_manifest_fails() {
    let project = TestProject::new();

    optdeps_cmd()
        .args(["install", "--no-interaction"])
        .current_dir(project.root())
        .assert()
        .failure()
        .stderr(predicate::str::contains("manifest not found"));
}

#[test]
fn test_install_requires_terminal_unless_no_interaction() {
    let project = TestProject::new();
    project.write_manifest_with_declarations(sample_declarations());

    optdeps_cmd()
        .arg("install")
        .current_dir(project.root())
        .write_stdin("n\n")
        .assert()
        .failure()
        .stderr(predicate::str::contains("--no-interaction"));
}

#[test]
fn test_install_no_interaction_is_minimal() {
    let project = TestProject::new();
    project.write_manifest_with_declarations(sample_declarations());
    // the installer must never run for a minimal install
    project.write_settings("[installer]\ncommand = \"exit 1;\"\n");

    optdeps_cmd()
        .args(["install", "--no-interaction"])
        .current_dir(project.root())
        .assert()
        .success()
        .stdout(predicate::str::contains("Removed optional package declarations"));

    let manifest = project.read_manifest();
    assert!(manifest.get("extra").is_none());
    assert_eq!(manifest["name"], "acme/skeleton");
}

#[test]
fn test_install_dry_run_prints_diff_only() {
    let project = TestProject::new();
    project.write_manifest_with_declarations(sample_declarations());
    let before = project.read_manifest_text();

    optdeps_cmd()
        .args(["install", "--no-interaction", "--dry-run"])
        .current_dir(project.root())
        .assert()
        .success()
        .stdout(predicate::str::contains("-    \"extra\": {"))
        .stdout(predicate::str::contains("dry run"));

    assert_eq!(project.read_manifest_text(), before);
}

#[test]
fn test_install_without_declarations_is_noop() {
    let project = TestProject::new();
    project.write_manifest(&json!({"name": "acme/app", "require": {"php": "^7.1"}}));
    let before = project.read_manifest_text();

    optdeps_cmd()
        .args(["install", "--no-interaction"])
        .current_dir(project.root())
        .assert()
        .success()
        .stdout(predicate::str::contains("No optional packages declared"));

    assert_eq!(project.read_manifest_text(), before);
}
