//! End-to-end tests for the hooklint binary.

use assert_cmd::cargo::cargo_bin_cmd;
use assert_cmd::Command;
use predicates::prelude::*;
use std::fs;
use std::os::unix::fs::PermissionsExt;
use std::path::Path;
use tempfile::TempDir;

const GUARD: &str = "#!/bin/bash\n# Event: PreToolUse\nINPUT=$(cat)\n\
if echo \"$INPUT\" | grep -q 'rm -rf'; then\n  echo 'blocked' >&2\n  exit 2\nfi\nexit 0\n";

fn hooklint() -> Command {
    let mut cmd = cargo_bin_cmd!("hooklint");
    cmd.env("NO_COLOR", "1");
    cmd
}

/// Project with user settings redirected into the temp dir.
fn create_project() -> TempDir {
    let dir = TempDir::new().unwrap();
    fs::create_dir_all(dir.path().join(".claude/hooks")).unwrap();
    fs::write(
        dir.path().join("hooklint.toml"),
        "user_settings = \"user-settings.json\"\n",
    )
    .unwrap();
    dir
}

fn add_hook(root: &Path, name: &str, body: &str) {
    let p = root.join(".claude/hooks").join(name);
    fs::write(&p, body).unwrap();
    fs::set_permissions(&p, fs::Permissions::from_mode(0o755)).unwrap();
}

fn register_guard(root: &Path) {
    fs::write(
        root.join(".claude/settings.json"),
        r#"{"hooks": {"PreToolUse": [{"matcher": "Bash", "hooks": [
            {"type": "command", "command": "\"$CLAUDE_PROJECT_DIR\"/.claude/hooks/guard.sh"}
        ]}]}}"#,
    )
    .unwrap();
}

#[test]
fn test_help_and_version() {
    hooklint().arg("--help").assert().success();
    hooklint().arg("--version").assert().success();
}

#[test]
fn test_missing_dir_is_fatal() {
    hooklint()
        .args(["--dir", "/definitely/not/here", "--settings"])
        .assert()
        .code(2)
        .stderr(predicate::str::contains("Project directory not found"));
}

#[test]
fn test_settings_with_unknown_event_fails() {
    let dir = create_project();
    fs::write(
        dir.path().join(".claude/settings.local.json"),
        r#"{"hooks": {"Bogus": []}}"#,
    )
    .unwrap();
    hooklint()
        .arg("--settings")
        .arg("--dir")
        .arg(dir.path())
        .assert()
        .code(1)
        .stdout(predicate::str::contains("Unknown event type: Bogus"));
}

#[test]
fn test_installed_script_passes() {
    let dir = create_project();
    add_hook(dir.path(), "guard.sh", GUARD);
    register_guard(dir.path());
    hooklint()
        .arg(".claude/hooks/guard.sh")
        .arg("--dir")
        .arg(dir.path())
        .assert()
        .success()
        .stdout(predicate::str::contains("PASSED"))
        .stdout(predicate::str::contains("Will run in THIS project only"));
}

#[test]
fn test_unregistered_script_is_valid_but_not_installed() {
    let dir = create_project();
    add_hook(dir.path(), "guard.sh", GUARD);
    hooklint()
        .arg(".claude/hooks/guard.sh")
        .arg("--dir")
        .arg(dir.path())
        .assert()
        .success()
        .stdout(predicate::str::contains("SCRIPT VALID but NOT INSTALLED"));
}

#[test]
fn test_missing_script_fails() {
    let dir = create_project();
    hooklint()
        .arg(".claude/hooks/nope.sh")
        .arg("--dir")
        .arg(dir.path())
        .assert()
        .code(1)
        .stdout(predicate::str::contains("Script not found"));
}

#[test]
fn test_project_json_output_parses() {
    let dir = create_project();
    add_hook(dir.path(), "guard.sh", GUARD);
    register_guard(dir.path());
    let out = hooklint()
        .args(["--project", "--output", "json", "--no-probe"])
        .arg("--dir")
        .arg(dir.path())
        .output()
        .unwrap();
    assert!(out.status.success());
    let doc: serde_json::Value = serde_json::from_slice(&out.stdout).unwrap();
    assert_eq!(doc["success"], true);
    assert_eq!(doc["settings"].as_array().map(|a| a.len()), Some(3));
    assert_eq!(doc["scripts"][0]["script"], ".claude/hooks/guard.sh");
    assert_eq!(doc["scripts"][0]["installation"]["project"], true);
}

#[test]
fn test_all_with_no_hooks_exits_zero() {
    let dir = TempDir::new().unwrap();
    fs::write(
        dir.path().join("hooklint.toml"),
        "user_settings = \"user-settings.json\"\n",
    )
    .unwrap();
    hooklint()
        .arg("--all")
        .arg("--dir")
        .arg(dir.path())
        .assert()
        .success()
        .stdout(predicate::str::contains("No hook scripts found"));
}

#[test]
fn test_all_reports_each_script() {
    let dir = create_project();
    add_hook(dir.path(), "guard.sh", GUARD);
    add_hook(dir.path(), "broken.sh", "#!/bin/bash\nif then\n");
    hooklint()
        .arg("--all")
        .arg("--dir")
        .arg(dir.path())
        .assert()
        .code(1)
        .stdout(predicate::str::contains("broken.sh"))
        .stdout(predicate::str::contains("Bash syntax error"))
        .stdout(predicate::str::contains("guard.sh"));
}
