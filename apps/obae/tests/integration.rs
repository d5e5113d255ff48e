//! Integration tests for obae CLI

use std::process::Command;

#[test]
fn test_cli_version() {
    let output = Command::new(env!("CARGO_BIN_EXE_obae"))
        .arg("--version")
        .output()
        .expect("Failed to execute obae");

    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("obae"));
}

#[test]
fn test_cli_help() {
    let output = Command::new(env!("CARGO_BIN_EXE_obae"))
        .arg("--help")
        .output()
        .expect("Failed to execute obae");

    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("--mirror"));
    assert!(stdout.contains("--cookie"));
}

#[test]
fn test_missing_input_fails() {
    let output = Command::new(env!("CARGO_BIN_EXE_obae"))
        .output()
        .expect("Failed to execute obae");

    assert!(!output.status.success());
}

#[test]
fn test_invalid_identifier_rejected_before_download() {
    let temp = tempfile::tempdir().unwrap();
    let config = temp.path().join("config.toml");
    std::fs::write(&config, "").unwrap();
    let work = temp.path().join("work");

    let output = Command::new(env!("CARGO_BIN_EXE_obae"))
        .arg("not-a-beatmap")
        .arg("--config")
        .arg(&config)
        .arg("--working-dir")
        .arg(&work)
        .env_remove("OBAE_SESSION_COOKIE")
        .output()
        .expect("Failed to execute obae");

    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("invalid beatmap ID or beatmap link provided"));
    assert!(!work.exists());
}

#[test]
fn test_invalid_identifier_json_output() {
    let temp = tempfile::tempdir().unwrap();
    let config = temp.path().join("config.toml");
    std::fs::write(&config, "").unwrap();

    let output = Command::new(env!("CARGO_BIN_EXE_obae"))
        .args(["--json", "https://example.com/nothing"])
        .arg("--config")
        .arg(&config)
        .env("RUST_LOG", "off")
        .output()
        .expect("Failed to execute obae");

    assert!(!output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("\"success\":false"));
}
