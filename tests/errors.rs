use assert_cmd::Command;
use predicates::prelude::*;
use std::time::Duration;

fn cargo_bin() -> Command {
    let mut cmd = Command::cargo_bin("bf").unwrap();
    // Keep a user's bf-stepper.toml out of the picture.
    cmd.env("XDG_CONFIG_HOME", env!("CARGO_TARGET_TMPDIR"))
        .env("HOME", env!("CARGO_TARGET_TMPDIR"))
        .env_remove("RUST_LOG")
        .env_remove("BF_TIMEOUT_MS")
        .env_remove("BF_MAX_STEPS");
    cmd
}

#[test]
fn test_unmatched_open_bracket_error() {
    cargo_bin()
        .timeout(Duration::from_secs(5)).arg("run").arg("+.-[")
        .assert()
        .code(1)
        .stdout(": 1\n")
        .stderr(predicate::str::contains("unmatched bracket '['"))
        .stderr(predicate::str::contains("at instruction 3"));
}

#[test]
fn test_unmatched_close_bracket_error_shows_caret() {
    cargo_bin()
        .timeout(Duration::from_secs(5)).arg("run").arg("+]")
        .assert()
        .code(1)
        .stderr(predicate::str::contains("unmatched bracket ']' at instruction 1"))
        .stderr(predicate::str::contains("  +]\n   ^"));
}

#[test]
fn test_unreached_unmatched_bracket_is_harmless() {
    // `]` with a zero cell falls through without looking for its partner.
    cargo_bin()
        .timeout(Duration::from_secs(5)).arg("run").arg("].")
        .assert()
        .success()
        .stdout(": 0\n");
}

#[test]
fn test_trace_marks_fault_row() {
    cargo_bin()
        .timeout(Duration::from_secs(5)).arg("run").arg("-t").arg("[")
        .assert()
        .code(1)
        .stdout(predicate::str::contains("Unmatched bracket '[' at instruction 0"));
}

#[test]
fn test_step_limit_aborts() {
    cargo_bin()
        .timeout(Duration::from_secs(5)).arg("run").arg("--max-steps").arg("50").arg("+[]")
        .assert()
        .code(1)
        .stderr(predicate::str::contains("step limit exceeded (50)"));
}

#[test]
fn test_step_limit_from_env() {
    cargo_bin()
        .timeout(Duration::from_secs(5))
        .env("BF_MAX_STEPS", "7")
        .arg("run").arg("+[]")
        .assert()
        .code(1)
        .stderr(predicate::str::contains("step limit exceeded (7)"));
}

#[test]
fn test_wall_clock_timeout_aborts() {
    cargo_bin()
        .timeout(Duration::from_secs(10)).arg("run").arg("--timeout").arg("100").arg("+.[]")
        .assert()
        .code(1)
        .stdout(": 1\n")
        .stderr(predicate::str::contains("wall-clock timeout exceeded (100 ms)"));
}

#[test]
fn test_tui_log_path_that_is_a_directory_fails() {
    let dir = tempfile::tempdir().unwrap();
    cargo_bin()
        .timeout(Duration::from_secs(5)).arg("tui").arg("--log").arg(dir.path()).arg("+.")
        .assert()
        .code(1)
        .stderr(predicate::str::contains("failed to open log file"));
}
