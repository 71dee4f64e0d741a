use assert_cmd::cargo::cargo_bin_cmd;
use predicates::prelude::*;

#[test]
fn islocal_reports_localhost_as_local() {
    let mut cmd = cargo_bin_cmd!("logport");
    cmd.arg("--log-level")
        .arg("error")
        .arg("islocal")
        .arg("localhost");

    cmd.assert()
        .success()
        .stdout(predicate::str::diff("local\n"));
}

#[test]
fn islocal_is_case_insensitive_for_localhost() {
    let mut cmd = cargo_bin_cmd!("logport");
    cmd.arg("--log-level")
        .arg("error")
        .arg("islocal")
        .arg("LOCALHOST");

    cmd.assert()
        .success()
        .stdout(predicate::str::diff("local\n"));
}

#[test]
fn islocal_fails_for_unresolvable_host() {
    // RFC 2606 reserves .invalid; an honest resolver never answers.
    let mut cmd = cargo_bin_cmd!("logport");
    cmd.arg("--log-level")
        .arg("error")
        .arg("islocal")
        .arg("no-such-host.invalid");

    cmd.assert()
        .failure()
        .stderr(predicate::str::contains("Error:"));
}
