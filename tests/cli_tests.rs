//! CLI integration tests for the search-console-mcp binary
//!
//! These run the compiled binary. Each one clears the environment and runs
//! from an empty directory so no real credentials or `.env` file leak in.

use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;

/// Get a Command for the server binary with a clean environment.
#[allow(deprecated)]
fn server_cmd(dir: &TempDir) -> Command {
    let mut cmd =
        Command::cargo_bin("search-console-mcp").expect("Failed to find search-console-mcp binary");
    cmd.env_clear().current_dir(dir.path());
    cmd
}

// ============================================================================
// --version and --help
// ============================================================================

#[test]
fn test_version_flag() {
    let dir = TempDir::new().unwrap();
    server_cmd(&dir)
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains(env!("CARGO_PKG_VERSION")));
}

#[test]
fn test_help_flag() {
    let dir = TempDir::new().unwrap();
    server_cmd(&dir)
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("MCP server for Google Search Console"))
        .stdout(predicate::str::contains("--config"))
        .stdout(predicate::str::contains("--verbose"));
}

#[test]
fn test_quiet_conflicts_with_verbose() {
    let dir = TempDir::new().unwrap();
    server_cmd(&dir)
        .args(["-q", "-v"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("cannot be used with"));
}

// ============================================================================
// Startup configuration
// ============================================================================

#[test]
fn test_missing_credentials_fails_before_serving() {
    let dir = TempDir::new().unwrap();
    server_cmd(&dir)
        .arg("-q")
        .assert()
        .failure()
        .stderr(predicate::str::contains(
            "Missing required environment variables",
        ))
        .stdout(predicate::str::is_empty());
}

#[test]
fn test_empty_credentials_are_missing() {
    let dir = TempDir::new().unwrap();
    server_cmd(&dir)
        .arg("-q")
        .env("GOOGLE_CLIENT_ID", "")
        .env("GOOGLE_CLIENT_SECRET", "secret")
        .assert()
        .failure()
        .stderr(predicate::str::contains("GOOGLE_CLIENT_ID"));
}

#[test]
fn test_missing_config_file_fails() {
    let dir = TempDir::new().unwrap();
    server_cmd(&dir)
        .args(["-q", "--config", "does-not-exist.toml"])
        .env("GOOGLE_CLIENT_ID", "id")
        .env("GOOGLE_CLIENT_SECRET", "secret")
        .assert()
        .failure()
        .stderr(predicate::str::contains("Configuration file not found"));
}
