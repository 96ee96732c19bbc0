//! CLI integration tests for chatbotx-server.

use std::fs;
use std::path::Path;
use std::process::{Command, Output};
use tempfile::TempDir;

fn run_cli(args: &[&str], working_dir: Option<&Path>) -> Output {
    let mut cmd = Command::new(env!("CARGO_BIN_EXE_chatbotx-server"));
    cmd.args(args).arg("--no-color").env_remove("RUST_LOG");

    if let Some(dir) = working_dir {
        cmd.current_dir(dir);
    }

    cmd.output().expect("Failed to execute command")
}

#[test]
fn test_help_command() {
    let output = Command::new(env!("CARGO_BIN_EXE_chatbotx-server"))
        .arg("--help")
        .output()
        .expect("Failed to execute command");

    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("ChatBotX"));
    assert!(stdout.contains("init"));
    assert!(stdout.contains("config"));
    assert!(stdout.contains("ask"));
}

#[test]
fn test_init_scaffolds_project() {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let path = temp_dir.path().to_str().unwrap();

    let output = run_cli(&["init", path, "--port", "9100"], None);
    assert!(output.status.success());

    let config = fs::read_to_string(temp_dir.path().join("chatbotx.toml")).unwrap();
    assert!(config.contains("port = 9100"));
    assert!(temp_dir.path().join(".env.example").exists());
    assert!(temp_dir.path().join(".gitignore").exists());
    assert!(temp_dir.path().join("data").is_dir());
}

#[test]
fn test_init_keeps_existing_config_without_force() {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let config_path = temp_dir.path().join("chatbotx.toml");
    fs::write(&config_path, "existing").unwrap();

    let output = run_cli(&["init", temp_dir.path().to_str().unwrap()], None);
    assert!(output.status.success());
    assert_eq!(fs::read_to_string(&config_path).unwrap(), "existing");
}

#[test]
fn test_config_validate() {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    run_cli(&["init", temp_dir.path().to_str().unwrap()], None);

    let output = Command::new(env!("CARGO_BIN_EXE_chatbotx-server"))
        .args(["config", "--validate", "--no-color"])
        .current_dir(temp_dir.path())
        .env("JWT_SECRET", "cli-test-secret-with-enough-length")
        .output()
        .expect("Failed to execute command");

    assert!(output.status.success());
    assert!(String::from_utf8_lossy(&output.stdout).contains("is valid"));
}

#[test]
fn test_config_missing_file_fails() {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let output = run_cli(&["config"], Some(temp_dir.path()));
    assert!(!output.status.success());
}

#[test]
fn test_ask_prints_reply() {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let output = run_cli(&["ask", "/pricing"], Some(temp_dir.path()));

    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("Our courses have different pricing"));
    assert!(stdout.contains("Payment Options"));
    assert!(stdout.contains("pricing"));
}

#[test]
fn test_ask_empty_message_fails() {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let output = run_cli(&["ask", " "], Some(temp_dir.path()));
    assert!(!output.status.success());
}
