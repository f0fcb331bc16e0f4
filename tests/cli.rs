//! End-to-end tests for the amqp-probe binary
//!
//! Most runs use --dry-run so no broker is required.

use assert_cmd::prelude::*;
use predicates::prelude::*;
use std::fs;
use std::process::Command;
use tempfile::TempDir;

/// Helper function to create a test command isolated from the caller's environment
fn create_test_cmd() -> Command {
    let mut cmd = Command::cargo_bin("amqp-probe").unwrap();
    for (name, _) in std::env::vars_os() {
        if name.to_string_lossy().starts_with("AMQP_PROBE_") {
            cmd.env_remove(name);
        }
    }
    cmd
}

#[test]
fn test_dry_run_publishes_every_iteration() {
    create_test_cmd()
        .args(["--dry-run", "--no-color", "-n", "3"])
        .assert()
        .success()
        .stdout(predicate::str::contains("#1 OK [200]"))
        .stdout(predicate::str::contains("#3 OK [200]"))
        .stdout(predicate::str::contains("Published 256 bytes, correlationId="))
        .stdout(predicate::str::contains("Completed 3 iterations, 3 published"));
}

#[test]
fn test_literal_body_param() {
    create_test_cmd()
        .args(["--dry-run", "--no-color", "-n", "1", "-p", "message_body=hello"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Published 5 bytes"));
}

/// Run the binary in JSON mode and parse every stdout line
fn json_lines(extra: &[&str]) -> Vec<serde_json::Value> {
    let output = create_test_cmd()
        .args(["--dry-run", "--json", "-n", "2"])
        .args(extra)
        .output()
        .unwrap();
    assert!(output.status.success());

    let stdout = String::from_utf8(output.stdout).unwrap();
    stdout
        .lines()
        .map(|line| {
            serde_json::from_str(line).unwrap_or_else(|e| panic!("non-JSON line {:?}: {}", line, e))
        })
        .collect()
}

#[test]
fn test_json_lines() {
    let lines = json_lines(&[]);

    let results: Vec<_> = lines.iter().filter(|v| v.get("iteration").is_some()).collect();
    assert_eq!(results.len(), 2);
    assert_eq!(results[0]["label"], "AMQP Publish");
    assert_eq!(results[0]["success"], true);
    assert_eq!(results[0]["status_code"], "200");
    assert_ne!(results[0]["response"], results[1]["response"]);
    assert!(lines.iter().any(|v| v["event"] == "setup" && v["ready"] == true));
    assert!(lines.iter().any(|v| v["event"] == "complete" && v["published"] == 2));
}

#[test]
fn test_json_lines_stay_clean_with_verbose_and_debug() {
    for flag in ["--verbose", "--debug"] {
        let lines = json_lines(&[flag]);
        assert_eq!(lines.iter().filter(|v| v.get("iteration").is_some()).count(), 2, "{flag}");
        assert!(lines.iter().any(|v| v["event"] == "complete"), "{flag}");
    }
}

#[test]
fn test_json_mode_logs_go_to_stderr() {
    create_test_cmd()
        .args(["--dry-run", "--json", "--verbose", "-n", "1"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Configuration:").not())
        .stderr(predicate::str::contains("Connecting to broker"));
}

#[test]
fn test_oversized_message_size_uses_default() {
    create_test_cmd()
        .args(["--dry-run", "--no-color", "-n", "1", "-p", "message_size_bytes=100000000000000"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Published 256 bytes"));
}

#[test]
fn test_large_iteration_count_starts_immediately() {
    assert_cmd::Command::cargo_bin("amqp-probe")
        .unwrap()
        .args(["--dry-run", "--no-color", "-n", "4294967295", "--interval-ms", "50"])
        .timeout(std::time::Duration::from_secs(1))
        .assert()
        .interrupted()
        .stdout(predicate::str::contains("#1 OK [200]"));
}

#[cfg(unix)]
#[test]
fn test_non_unicode_unrelated_variable_is_ignored() {
    use std::ffi::OsStr;
    use std::os::unix::ffi::OsStrExt;

    create_test_cmd()
        .env("UNRELATED_VAR", OsStr::from_bytes(b"\xff\xfe"))
        .args(["--dry-run", "--no-color", "-n", "1"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Completed 1 iterations, 1 published"));
}

#[test]
fn test_show_defaults() {
    create_test_cmd()
        .arg("--show-defaults")
        .assert()
        .success()
        .stdout(predicate::str::contains("uri"))
        .stdout(predicate::str::contains("amqp://localhost:5672"))
        .stdout(predicate::str::contains("test.key"))
        .stdout(predicate::str::contains("connect_timeout_ms"));
}

#[test]
fn test_malformed_param_rejected() {
    create_test_cmd()
        .args(["--dry-run", "-p", "routing_key"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Expected KEY=VALUE"));
}

#[test]
fn test_env_variable_overrides_default() {
    create_test_cmd()
        .env("AMQP_PROBE_MESSAGE_SIZE_BYTES", "12")
        .args(["--dry-run", "--no-color", "-n", "1"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Published 12 bytes"));
}

#[test]
fn test_param_overrides_env_variable() {
    create_test_cmd()
        .env("AMQP_PROBE_MESSAGE_SIZE_BYTES", "12")
        .args(["--dry-run", "--no-color", "-n", "1", "-p", "message_size_bytes=20"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Published 20 bytes"));
}

#[test]
fn test_unreachable_broker_exits_with_failure() {
    create_test_cmd()
        .args([
            "--no-color",
            "-n", "2",
            "-p", "uri=amqp://127.0.0.1:1",
            "-p", "connect_timeout_ms=2000",
        ])
        .assert()
        .failure()
        .stdout(predicate::str::contains("FAIL [500]"))
        .stdout(predicate::str::contains("ChannelUnavailable"))
        .stdout(predicate::str::contains("Completed 2 iterations, 0 published"));
}

#[test]
fn test_write_env_example() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("probe.env");

    create_test_cmd()
        .arg("--write-env")
        .arg(&path)
        .assert()
        .success();

    let content = fs::read_to_string(&path).unwrap();
    assert!(content.contains("AMQP_PROBE_ROUTING_KEY"));
    assert!(content.contains("AMQP_PROBE_CONNECT_TIMEOUT_MS"));
}
