use assert_cmd::cargo::cargo_bin_cmd;
use predicates::prelude::*;
use serde_json::Value;

#[test]
fn test_log_format_text() {
    let mut cmd = cargo_bin_cmd!("logport");
    cmd.arg("--log-format")
        .arg("text")
        .arg("--log-level")
        .arg("info")
        .arg("islocal")
        .arg("localhost");

    cmd.assert()
        .success()
        .stderr(predicate::str::contains("INFO"))
        .stderr(predicate::str::contains("Discovery finished"));
}

#[test]
fn test_log_format_json() {
    let mut cmd = cargo_bin_cmd!("logport");
    cmd.arg("--log-format")
        .arg("json")
        .arg("--log-level")
        .arg("info")
        .arg("islocal")
        .arg("localhost");

    let output = cmd.output().unwrap();
    assert!(output.status.success());

    // Verify each line of stderr is valid JSON and has the correct structure
    let stderr = String::from_utf8(output.stderr).unwrap();
    let log_lines: Vec<Value> = stderr
        .lines()
        .map(|line| serde_json::from_str(line).expect("stderr line should be valid JSON"))
        .collect();

    assert_eq!(log_lines.len(), 1);
    assert_eq!(
        log_lines[0]
            .get("fields")
            .and_then(|fields| fields.get("message"))
            .and_then(Value::as_str),
        Some("Discovery finished.")
    );
    assert_eq!(
        log_lines[0].get("level").and_then(Value::as_str),
        Some("INFO")
    );
}

#[test]
fn test_log_level_error_suppresses_info() {
    let mut cmd = cargo_bin_cmd!("logport");
    cmd.arg("--log-level")
        .arg("error")
        .arg("islocal")
        .arg("localhost");

    cmd.assert()
        .success()
        .stderr(predicate::str::contains("Discovery finished").not());
}
