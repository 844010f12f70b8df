//! Tests of the `term-explore` binary's exit behavior.
//!
//! Each test runs in its own temporary working directory so no `.env` file
//! or previous report leaks in.

use std::path::Path;
use std::process::{Command, Output};

const BIN: &str = env!("CARGO_BIN_EXE_term-explore");

fn run_in(dir: &Path, args: &[&str], token: Option<&str>) -> Output {
    let mut command = Command::new(BIN);
    command
        .args(args)
        .current_dir(dir)
        .env_remove("AIPROXY_TOKEN")
        .env("RUST_LOG", "error")
        .env("NO_COLOR", "1");
    if let Some(token) = token {
        command.env("AIPROXY_TOKEN", token);
    }
    command.output().expect("failed to launch binary")
}

#[test]
fn test_missing_argument_is_usage_error() {
    let dir = tempfile::tempdir().unwrap();
    let output = run_in(dir.path(), &[], Some("test-token"));

    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.to_lowercase().contains("usage"));
}

#[test]
fn test_missing_token_is_fatal() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(dir.path().join("data.csv"), "a,b\n1,2\n3,4\n").unwrap();

    let output = run_in(dir.path(), &["data.csv"], None);

    assert_eq!(output.status.code(), Some(1));
    assert!(String::from_utf8_lossy(&output.stderr).contains("AIPROXY_TOKEN"));
    assert!(!dir.path().join("README.md").exists());
}

#[test]
fn test_token_from_dotenv_file_is_used() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(dir.path().join(".env"), "AIPROXY_TOKEN=from-file\n").unwrap();

    // The token is found, so the run gets as far as ingestion and fails there.
    let output = run_in(dir.path(), &["absent.csv"], None);

    assert_eq!(output.status.code(), Some(1));
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(!stderr.contains("AIPROXY_TOKEN not found"));
    assert!(stderr.contains("absent.csv"));
}

#[test]
fn test_missing_input_file_is_fatal() {
    let dir = tempfile::tempdir().unwrap();

    let output = run_in(dir.path(), &["absent.csv"], Some("test-token"));

    assert_eq!(output.status.code(), Some(1));
    assert!(String::from_utf8_lossy(&output.stderr).contains("absent.csv"));
    assert!(!dir.path().join("README.md").exists());
}

#[test]
fn test_malformed_input_is_fatal() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(dir.path().join("broken.csv"), "a,b\n1,2,3\n").unwrap();

    let output = run_in(dir.path(), &["broken.csv"], Some("test-token"));

    assert_eq!(output.status.code(), Some(1));
    assert!(!dir.path().join("README.md").exists());
}
