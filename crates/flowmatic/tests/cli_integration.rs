//! CLI integration tests for the flowmatic command-line interface.
//!
//! These run without a backend: they cover argument parsing, help output
//! and the offline paths of the auth and projects commands.

use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;

/// Get a command for the flowmatic binary, isolated from the user's config.
fn flowmatic(config_dir: &TempDir) -> Command {
    let mut cmd = Command::cargo_bin("flowmatic").unwrap();
    cmd.current_dir(config_dir.path())
        .env("FLOWMATIC_CONFIG_DIR", config_dir.path())
        .env_remove("FLOWMATIC_BACKEND_URL")
        .env_remove("FLOWMATIC_PASSWORD");
    cmd
}

// ─────────────────────────────────────────────────────────────────────────────
// Help and Version Tests
// ─────────────────────────────────────────────────────────────────────────────

#[test]
fn test_help_lists_subcommands() {
    let dir = TempDir::new().unwrap();
    flowmatic(&dir)
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("serve"))
        .stdout(predicate::str::contains("auth"))
        .stdout(predicate::str::contains("projects"))
        .stdout(predicate::str::contains("health"));
}

#[test]
fn test_version_displays() {
    let dir = TempDir::new().unwrap();
    flowmatic(&dir)
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains("flowmatic"));
}

#[test]
fn test_auth_help_lists_actions() {
    let dir = TempDir::new().unwrap();
    flowmatic(&dir)
        .args(["auth", "--help"])
        .assert()
        .success()
        .stdout(predicate::str::contains("login"))
        .stdout(predicate::str::contains("register"))
        .stdout(predicate::str::contains("logout"))
        .stdout(predicate::str::contains("status"))
        .stdout(predicate::str::contains("refresh"));
}

#[test]
fn test_unknown_subcommand_fails() {
    let dir = TempDir::new().unwrap();
    flowmatic(&dir).arg("bogus").assert().failure();
}

#[test]
fn test_serve_rejects_invalid_bind() {
    let dir = TempDir::new().unwrap();
    flowmatic(&dir)
        .args(["serve", "--bind", "not-an-address"])
        .assert()
        .failure();
}

// ─────────────────────────────────────────────────────────────────────────────
// Offline Behaviour
// ─────────────────────────────────────────────────────────────────────────────

#[test]
fn test_auth_status_without_session() {
    let dir = TempDir::new().unwrap();
    flowmatic(&dir)
        .args(["--backend", "http://127.0.0.1:1", "auth", "status"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Not signed in"));
}

#[test]
fn test_auth_status_json() {
    let dir = TempDir::new().unwrap();
    flowmatic(&dir)
        .args(["--json", "--backend", "http://127.0.0.1:1", "auth", "status"])
        .assert()
        .success()
        .stdout(predicate::str::contains("\"authenticated\": false"));
}

#[test]
fn test_missing_backend_is_reported() {
    let dir = TempDir::new().unwrap();
    flowmatic(&dir)
        .args([
            "auth",
            "login",
            "--email",
            "ada@example.com",
            "--password",
            "pw",
        ])
        .assert()
        .failure()
        .stderr(predicate::str::contains("No backend URL configured"));
}

/// Write a signed-in session into the local storage file.
fn write_stored_session(dir: &TempDir) -> std::path::PathBuf {
    let expiry = serde_json::json!({
        "expiresIn": 3600,
        "expiresAt": "2999-01-01T00:00:00Z",
    });
    let user = serde_json::json!({ "id": "u1", "email": "ada@example.com" });
    let items = serde_json::json!({
        "flowmatic.user": user.to_string(),
        "flowmatic.access_token": "stored-access",
        "flowmatic.refresh_token": "stored-refresh",
        "flowmatic.token_expiry": expiry.to_string(),
    });

    let path = dir.path().join("local-storage.json");
    std::fs::write(&path, items.to_string()).unwrap();
    path
}

#[test]
fn test_status_reads_stored_session_without_backend() {
    let dir = TempDir::new().unwrap();
    write_stored_session(&dir);

    flowmatic(&dir)
        .args(["auth", "status"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Signed in as: ada@example.com"));
}

#[test]
fn test_logout_without_backend_clears_stored_session() {
    let dir = TempDir::new().unwrap();
    let path = write_stored_session(&dir);

    flowmatic(&dir)
        .args(["auth", "logout"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Signed out."));

    let remaining = std::fs::read_to_string(&path).unwrap();
    assert!(!remaining.contains("stored-access"));
    assert!(!remaining.contains("ada@example.com"));

    flowmatic(&dir)
        .args(["auth", "status"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Not signed in"));
}

#[test]
fn test_backend_from_project_config() {
    let dir = TempDir::new().unwrap();
    std::fs::write(
        dir.path().join("flowmatic.toml"),
        "[backend]\nbase_url = \"http://127.0.0.1:1\"\n",
    )
    .unwrap();

    flowmatic(&dir)
        .args(["auth", "status"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Not signed in"));
}

#[test]
fn test_projects_require_sign_in() {
    let dir = TempDir::new().unwrap();
    flowmatic(&dir)
        .args(["--backend", "http://127.0.0.1:1", "projects", "list"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Not signed in"));
}

#[test]
fn test_login_against_unreachable_backend_fails_cleanly() {
    let dir = TempDir::new().unwrap();
    flowmatic(&dir)
        .args([
            "--backend",
            "http://127.0.0.1:1",
            "auth",
            "login",
            "--email",
            "ada@example.com",
            "--password",
            "pw",
        ])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Unable to reach the server"));
}
