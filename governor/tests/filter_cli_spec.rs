use assert_cmd::Command;
use predicates::prelude::*;

fn governor() -> Command {
    let mut cmd = Command::cargo_bin("governor").unwrap();
    for var in [
        "GOVERNOR_CONFIG",
        "GOVERNOR_THRESHOLD",
        "GOVERNOR_STEPS",
        "GOVERNOR_LATTICE_SIZE",
        "GOVERNOR_DT",
        "GOVERNOR_DAMPING",
        "GOVERNOR_WARDS",
    ] {
        cmd.env_remove(var);
    }
    cmd.env_remove("RUST_LOG");
    cmd.env("NO_COLOR", "1");
    cmd.timeout(std::time::Duration::from_secs(30));
    cmd
}

/// With the ceiling threshold nothing can be blocked, so the pipe is lossless
#[test]
fn given_max_threshold_when_filter_then_every_line_passes() {
    governor()
        .args(["--threshold", "1.0"])
        .write_stdin("The sky is blue.\n  Water is wet.  \n\nGrass is green.\n")
        .assert()
        .success()
        .stdout("The sky is blue.\nWater is wet.\nGrass is green.\n")
        .stderr(predicate::str::contains("Status: Listening on stdin"))
        .stderr(predicate::str::contains("VERIFIED  Coherent — entropy").count(3));
}

/// A zero threshold blocks anything carrying energy
#[test]
fn given_zero_threshold_when_filter_then_stdout_is_empty() {
    governor()
        .args(["filter", "--threshold", "0"])
        .write_stdin("one\ntwo\n")
        .assert()
        .success()
        .stdout("")
        .stderr(predicate::str::contains("BLOCKED   Hallucination — entropy").count(2));
}

#[test]
fn given_fail_on_block_when_line_blocked_then_exit_code_1() {
    governor()
        .args(["--threshold", "0", "--fail-on-block"])
        .write_stdin("blocked line\n")
        .assert()
        .code(1)
        .stdout("");
}

#[test]
fn given_fail_on_block_when_nothing_blocked_then_success() {
    governor()
        .args(["--threshold", "1", "--fail-on-block"])
        .write_stdin("fine line\n")
        .assert()
        .success()
        .stdout("fine line\n");
}

#[test]
fn given_json_flag_when_filter_then_stderr_has_json_lines() {
    governor()
        .args(["--threshold", "0", "--json"])
        .write_stdin("hello\n")
        .assert()
        .success()
        .stderr(predicate::str::contains(r#""verdict":"blocked""#))
        .stderr(predicate::str::contains(r#""bytes":5"#))
        .stderr(predicate::str::contains("Hallucination").not());
}

#[test]
fn given_quiet_when_filter_then_stderr_is_silent() {
    governor()
        .args(["-q", "--threshold", "1"])
        .write_stdin("hello\n")
        .assert()
        .success()
        .stdout("hello\n")
        .stderr("");
}

#[test]
fn given_env_threshold_when_filter_then_env_applies() {
    governor()
        .env("GOVERNOR_THRESHOLD", "0")
        .write_stdin("dropped by env\n")
        .assert()
        .success()
        .stdout("");
}

#[test]
fn given_bad_threshold_when_filter_then_error_exit() {
    governor()
        .args(["--threshold", "7"])
        .write_stdin("x\n")
        .assert()
        .failure()
        .stderr(predicate::str::contains("Error:"))
        .stderr(predicate::str::contains("threshold must be within [0, 1]"));
}

#[test]
fn given_malformed_env_when_filter_then_error_names_variable() {
    governor()
        .env("GOVERNOR_STEPS", "lots")
        .write_stdin("x\n")
        .assert()
        .failure()
        .stderr(predicate::str::contains("GOVERNOR_STEPS"));
}

#[test]
fn given_empty_stdin_when_filter_then_success_and_no_output() {
    governor().write_stdin("").assert().success().stdout("");
}

#[cfg(not(feature = "visualizer"))]
#[test]
fn given_visualize_without_feature_when_filter_then_warns_and_keeps_filtering() {
    governor()
        .env("RUST_LOG", "warn")
        .args(["--visualize", "--threshold", "1"])
        .write_stdin("hi\n")
        .assert()
        .success()
        .stdout("hi\n")
        .stderr(predicate::str::contains("visualizer"));
}
