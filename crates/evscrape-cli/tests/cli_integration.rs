//! CLI Integration Tests
//!
//! These tests exercise argument handling of the `evscrape` binary. None of
//! them reach an automation server: every case fails or exits before the
//! session starts.
//!
//! ```
//! cargo test --package evscrape-cli --test cli_integration
//! ```

use std::process::{Command, Output};

/// Environment variables that would change how arguments resolve.
const SCRUBBED_ENV: &[&str] = &[
    "NISSAN_CONNECT_APP_APK",
    "NISSAN_CONNECT_USER_ID",
    "NISSAN_CONNECT_PASSWORD",
    "NISSAN_CONNECT_DEMO",
    "APPIUM_SERVER_URL",
    "APPIUM_SERVER_PORT",
    "EVSCRAPE_TIMEZONE",
    "EVSCRAPE_CONFIG",
];

/// Run the evscrape binary with a clean environment.
fn run_evscrape(args: &[&str]) -> Output {
    let mut command = Command::new(env!("CARGO_BIN_EXE_evscrape"));
    for var in SCRUBBED_ENV {
        command.env_remove(var);
    }
    command
        .args(args)
        .output()
        .expect("Failed to run evscrape binary")
}

// =============================================================================
// Help and Version Tests
// =============================================================================

#[test]
fn test_help_command() {
    let output = run_evscrape(&["--help"]);

    assert!(output.status.success(), "Help should succeed");

    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("evscrape"), "Help should name the binary");
    for flag in ["--user-id", "--password", "--demo", "--timezone", "--format"] {
        assert!(stdout.contains(flag), "Help should list {}", flag);
    }
}

#[test]
fn test_version_command() {
    let output = run_evscrape(&["--version"]);

    assert!(output.status.success(), "Version should succeed");

    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("evscrape"), "Version should contain evscrape");
    assert!(stdout.contains(env!("CARGO_PKG_VERSION")));
}

#[test]
fn test_help_hides_password_env_value() {
    let output = Command::new(env!("CARGO_BIN_EXE_evscrape"))
        .env("NISSAN_CONNECT_PASSWORD", "hunter2-secret")
        .arg("--help")
        .output()
        .expect("Failed to run evscrape binary");

    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(!stdout.contains("hunter2-secret"));
}

// =============================================================================
// Argument Errors
// =============================================================================

#[test]
fn test_missing_app_argument() {
    let output = run_evscrape(&["--demo"]);

    assert!(!output.status.success(), "Missing APK should fail");
    assert!(output.stdout.is_empty());
}

#[test]
fn test_nonexistent_app() {
    let output = run_evscrape(&["/nonexistent/app.apk", "--demo"]);

    assert!(!output.status.success(), "Nonexistent APK should fail");
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(
        stderr.contains("application binary not found"),
        "unexpected stderr: {}",
        stderr
    );
    assert!(output.stdout.is_empty());
}

#[test]
fn test_invalid_timezone_fails_before_session() {
    let apk = tempfile::NamedTempFile::new().unwrap();
    let output = run_evscrape(&[
        apk.path().to_str().unwrap(),
        "--demo",
        "--timezone",
        "Mars/Olympus_Mons",
    ]);

    assert!(!output.status.success(), "Unknown time zone should fail");
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("Mars/Olympus_Mons"), "unexpected stderr: {}", stderr);
    assert!(output.stdout.is_empty(), "No partial output on failure");
}

#[test]
fn test_invalid_format_rejected() {
    let apk = tempfile::NamedTempFile::new().unwrap();
    let output = run_evscrape(&[apk.path().to_str().unwrap(), "--format", "csv"]);

    assert!(!output.status.success());
    assert!(output.stdout.is_empty());
}

#[test]
fn test_unreadable_config_file() {
    let apk = tempfile::NamedTempFile::new().unwrap();
    let output = run_evscrape(&[
        apk.path().to_str().unwrap(),
        "--demo",
        "--config",
        "/nonexistent/evscrape.toml",
    ]);

    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("Failed to read config"), "unexpected stderr: {}", stderr);
}
