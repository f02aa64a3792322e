// Copyright (c) The cordon Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! End-to-end tests driving the fixture binary.
//!
//! Each test spawns `cordon-fixture` with a particular flag combination
//! and asserts on its exit code and captured output. The fixture in turn
//! spawns its own children for isolated execution, so these tests cover
//! the full parent/child protocol path.

use pretty_assertions::assert_eq;
use std::process::{Command, Output};
use std::time::Instant;

fn run_fixture(args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_cordon-fixture"))
        .args(args)
        .output()
        .expect("fixture binary ran")
}

fn stdout_of(output: &Output) -> String {
    String::from_utf8_lossy(&output.stdout).into_owned()
}

fn stderr_of(output: &Output) -> String {
    String::from_utf8_lossy(&output.stderr).into_owned()
}

#[test]
fn exact_match_pass_emits_protocol_line() {
    let output = run_fixture(&[
        "--test",
        "fixture/basics/pass-one",
        "--reporter",
        "subprocess",
    ]);
    assert!(output.status.success(), "exit: {:?}", output.status);
    assert_eq!(stdout_of(&output), "0 \n");
}

#[test]
fn exact_match_failure_carries_message() {
    let output = run_fixture(&[
        "--test",
        "fixture/basics/soft-failure",
        "--reporter",
        "subprocess",
    ]);
    assert_eq!(output.status.code(), Some(1));
    assert_eq!(stdout_of(&output), "1 expected 4, got 5\n");
}

#[test]
fn exact_match_panic_is_reported_as_failure() {
    let output = run_fixture(&[
        "--test",
        "fixture/basics/panics",
        "--reporter",
        "subprocess",
    ]);
    assert_eq!(output.status.code(), Some(1));
    assert_eq!(stdout_of(&output), "1 boom\n");
}

#[test]
fn prefix_filter_runs_only_descendants() {
    let output = run_fixture(&["--test", "fixture/tree"]);
    assert!(output.status.success(), "exit: {:?}", output.status);
    let stdout = stdout_of(&output);
    assert!(stdout.contains("fixture/tree/inner/deep-pass"));
    assert!(stdout.contains("fixture/tree/outer-pass"));
    // Sibling suites of the filter are pruned without any notification.
    assert!(!stdout.contains("basics"));
    assert!(!stdout.contains("hazards"));
    assert!(stdout.contains("2 tests run, 2 passed, 0 did not pass"));
}

#[test]
fn child_suite_completes_before_parent_level_tests() {
    let output = run_fixture(&["--test", "fixture/tree"]);
    let stdout = stdout_of(&output);
    let deep = stdout
        .find("fixture/tree/inner/deep-pass")
        .expect("deep test reported");
    let outer = stdout
        .find("fixture/tree/outer-pass")
        .expect("outer test reported");
    assert!(
        deep < outer,
        "inner suite must fully finish before the parent's own tests:\n{stdout}"
    );
}

#[test]
fn crash_and_timeout_are_distinguished() {
    let started = Instant::now();
    let output = run_fixture(&["--test", "fixture/hazards", "--timeout", "1"]);
    let elapsed = started.elapsed();
    assert_eq!(output.status.code(), Some(1));

    let stdout = stdout_of(&output);
    assert!(stdout.contains("CRASH"), "missing CRASH in:\n{stdout}");
    assert!(stdout.contains("fixture/hazards/aborts"));
    assert!(stdout.contains("TIMEOUT"), "missing TIMEOUT in:\n{stdout}");
    assert!(stdout.contains("fixture/hazards/hangs"));
    assert!(stdout.contains("2 tests run, 0 passed, 2 did not pass"));

    // One second of timeout plus scheduling slack. Tight enough to catch
    // a watchdog that fires late, not just one that never fires.
    assert!(
        elapsed.as_secs() < 10,
        "hazards run took {elapsed:?}, watchdog fired late or not at all"
    );
}

#[test]
fn full_run_isolates_every_test() {
    let output = run_fixture(&["--timeout", "1"]);
    assert_eq!(output.status.code(), Some(1));
    let stdout = stdout_of(&output);
    assert!(stdout.contains("8 tests run, 4 passed, 4 did not pass"));
    // Descriptions decoded from isolated children survive the protocol
    // round trip.
    assert!(stdout.contains("expected 4, got 5"));
    assert!(stdout.contains("boom"));
}

#[test]
fn summary_counts_are_identical_across_worker_counts() {
    let serial = run_fixture(&["--test", "fixture/basics", "-j", "1"]);
    let parallel = run_fixture(&["--test", "fixture/basics", "-j", "8"]);
    assert_eq!(serial.status.code(), Some(1));
    assert_eq!(parallel.status.code(), Some(1));

    for output in [&serial, &parallel] {
        let stdout = stdout_of(output);
        assert!(
            stdout.contains("4 tests run, 2 passed, 2 did not pass"),
            "unexpected summary in:\n{stdout}"
        );
        // Same set of failures regardless of completion order.
        assert!(stdout.contains("fixture/basics/soft-failure"));
        assert!(stdout.contains("fixture/basics/panics"));
    }
}

#[test]
fn quiet_malformed_filter_degrades_to_protocol_not_found() {
    let output = run_fixture(&["--test", "nonsense", "--quiet"]);
    assert_eq!(output.status.code(), Some(1));
    assert_eq!(stdout_of(&output), "4");
}

#[test]
fn malformed_filter_reports_a_user_facing_error() {
    let output = run_fixture(&["--test", "nonsense"]);
    assert_eq!(output.status.code(), Some(1));
    assert!(stderr_of(&output).contains("invalid test filter"));
    // Nothing ran.
    assert!(!stdout_of(&output).contains("tests run"));
}

#[test]
fn unknown_reporter_is_rejected() {
    let output = run_fixture(&["--test", "fixture/basics/pass-one", "--reporter", "junit"]);
    assert_eq!(output.status.code(), Some(1));
    assert!(stderr_of(&output).contains("unknown reporter"));
}
