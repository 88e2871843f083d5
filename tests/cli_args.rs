//! Integration tests for CLI argument handling
//!
//! Tests flag parsing through the compiled binary. Only invocations that
//! exit before any network fetch (--help, invalid flags) are exercised here;
//! snapshot behavior is covered by unit tests.

use std::process::Command;

/// Helper to run the CLI with given args and capture output
fn run_cli(args: &[&str]) -> std::process::Output {
    Command::new(env!("CARGO_BIN_EXE_bagyo"))
        .args(args)
        .output()
        .expect("Failed to execute bagyo")
}

#[test]
fn test_help_flag_exits_successfully() {
    let output = run_cli(&["--help"]);
    assert!(
        output.status.success(),
        "Expected --help to exit successfully"
    );
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("bagyo"), "Help should mention bagyo");
    assert!(
        stdout.contains("min-magnitude"),
        "Help should mention --min-magnitude"
    );
    assert!(stdout.contains("watch"), "Help should mention --watch");
}

#[test]
fn test_version_flag_exits_successfully() {
    let output = run_cli(&["--version"]);
    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("bagyo"));
}

#[test]
fn test_invalid_magnitude_prints_error_and_exits() {
    let output = run_cli(&["--min-magnitude", "not_a_number"]);
    assert!(
        !output.status.success(),
        "Expected invalid magnitude to fail"
    );
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(
        stderr.contains("invalid") || stderr.contains("error"),
        "Should print a parse error: {}",
        stderr
    );
}

#[test]
fn test_verbose_quiet_conflict_rejected() {
    let output = run_cli(&["--verbose", "--quiet"]);
    assert!(
        !output.status.success(),
        "Expected conflicting flags to fail"
    );
}

#[test]
fn test_unknown_flag_rejected() {
    let output = run_cli(&["--no-such-flag"]);
    assert!(!output.status.success());
}
