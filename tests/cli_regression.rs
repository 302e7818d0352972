// CLI behavior: exit codes, report lines, golden generation and diagnostics.
// Requires: assert_cmd, predicates, tempfile in [dev-dependencies]

mod common;

use std::fs;

use assert_cmd::Command;
use predicates::prelude::*;
use predicates::str::contains;

use common::{capture_name, fixture, golden_name, read, stage, stage_captures, PASSING};
use ur_verify::ur::bytewords::{self, Style};
use ur_verify::ur::fountain::Part;

fn ur_verify() -> Command {
    let mut cmd = Command::cargo_bin("ur-verify").unwrap();
    cmd.env_remove("UR_VERIFY_CASES_DIR")
        .env_remove("UR_VERIFY_COMPARE")
        .env_remove("RUST_LOG");
    cmd
}

#[test]
fn passing_suite_exits_zero() {
    let dir = stage(&PASSING);
    ur_verify()
        .env("UR_VERIFY_CASES_DIR", dir.path())
        .assert()
        .success()
        .stdout(contains("=== Testing file: "))
        .stdout(contains("Data reconstruction is complete: YES"))
        .stdout(contains("Data reconstruction is success (valid): YES"))
        .stdout(contains("Parts used/total available parts: 9/12"))
        .stdout(contains("Parts used/total available parts: 19/26"))
        .stdout(contains("Output matches expected: YES"))
        .stdout(contains("Tests passed: 3/3"));
}

#[test]
fn default_cases_directory_is_test_cases() {
    let dir = tempfile::tempdir().unwrap();
    let cases = dir.path().join("test_cases");
    fs::create_dir(&cases).unwrap();
    fs::copy(
        fixture(&capture_name("single_part")),
        cases.join(capture_name("single_part")),
    )
    .unwrap();

    ur_verify()
        .current_dir(dir.path())
        .assert()
        .success()
        .stdout(contains("Tests passed: 1/1"));
}

#[test]
fn any_failing_file_fails_the_run() {
    let dir = stage(&["single_part", "interleaved", "bad_checksum"]);
    ur_verify()
        .env("UR_VERIFY_CASES_DIR", dir.path())
        .assert()
        .failure()
        .code(1)
        .stdout(contains("Data reconstruction is complete: NO"))
        .stdout(contains("Parts used/total available parts: 4/8"))
        .stdout(contains("Data reconstruction is success (valid): NO"))
        .stdout(contains("Decoder status: reassembled message checksum"))
        .stdout(contains("Tests passed: 1/3"));
}

#[test]
fn empty_capture_is_reported_and_fails() {
    let dir = stage_captures(&["no_fragments"]);
    ur_verify()
        .env("UR_VERIFY_CASES_DIR", dir.path())
        .assert()
        .failure()
        .stdout(contains("No fragments found in file"))
        .stdout(contains("Parts used/total available parts: 0/0"))
        .stdout(contains("Tests passed: 0/1"));
}

#[test]
fn no_test_files_is_a_diagnostic() {
    let dir = tempfile::tempdir().unwrap();
    fs::write(dir.path().join("notes.txt"), "nothing here").unwrap();
    ur_verify()
        .env("UR_VERIFY_CASES_DIR", dir.path())
        .assert()
        .failure()
        .code(1)
        .stderr(contains("no test files found"))
        .stderr(contains("ur_verify::discovery::no_test_files"))
        .stdout(contains("Tests passed").not());
}

#[test]
fn legacy_file_names_are_discovered() {
    let dir = tempfile::tempdir().unwrap();
    fs::copy(
        fixture(&capture_name("single_part")),
        dir.path().join("fragments_1.txt"),
    )
    .unwrap();

    ur_verify()
        .env("UR_VERIFY_CASES_DIR", dir.path())
        .arg("--generate-expected")
        .assert()
        .success();
    assert_eq!(
        read(dir.path().join("fragments_1.expected")),
        read(fixture(&golden_name("single_part")))
    );
}

#[test]
fn generate_expected_writes_hex_goldens() {
    let dir = stage_captures(&["single_part", "multipart_extra"]);
    let hex_line = predicate::str::is_match(r"^hex:[0-9a-f]+\n$").unwrap();

    for _ in 0..2 {
        ur_verify()
            .env("UR_VERIFY_CASES_DIR", dir.path())
            .arg("--generate-expected")
            .assert()
            .success()
            .stdout(contains("Mode: generating expected output files"))
            .stdout(contains("Generated expected output: "));

        for case in ["single_part", "multipart_extra"] {
            let written = read(dir.path().join(golden_name(case)));
            assert!(hex_line.eval(&written), "{written:?}");
            assert_eq!(written, read(fixture(&golden_name(case))));
        }
    }
}

#[test]
fn explicit_files_skip_discovery() {
    let dir = stage(&PASSING);
    let only = dir.path().join(capture_name("single_part"));
    ur_verify()
        .env("UR_VERIFY_CASES_DIR", "/nonexistent/cases")
        .arg(&only)
        .assert()
        .success()
        .stdout(contains(only.display().to_string()))
        .stdout(contains("Tests passed: 1/1"));
}

#[test]
fn unreadable_file_counts_as_empty() {
    let dir = tempfile::tempdir().unwrap();
    ur_verify()
        .arg(dir.path().join("missing.UR_fragments.txt"))
        .assert()
        .failure()
        .stdout(contains("Parts used/total available parts: 0/0"))
        .stdout(contains("Tests passed: 0/1"));
}

#[test]
fn oversized_part_header_is_skipped() {
    let bogus = Part {
        seq_num: 400_001,
        seq_len: 400_000,
        message_len: 1,
        checksum: 0,
        data: vec![0],
    };
    let line = format!(
        "ur:bytes/400001-400000/{}\n",
        bytewords::encode(&bogus.to_cbor().unwrap(), Style::Minimal)
    );
    let dir = tempfile::tempdir().unwrap();
    let capture = dir.path().join(capture_name("oversized"));
    fs::write(&capture, line + &read(fixture(&capture_name("single_part")))).unwrap();

    ur_verify()
        .arg(&capture)
        .timeout(std::time::Duration::from_secs(30))
        .assert()
        .success()
        .stdout(contains("Parts used/total available parts: 1/2"));
}

#[test]
fn mismatched_golden_is_reported() {
    let dir = stage(&["single_part"]);
    fs::write(dir.path().join(golden_name("single_part")), "hex:00\n").unwrap();

    ur_verify()
        .env("UR_VERIFY_CASES_DIR", dir.path())
        .assert()
        .failure()
        .stdout(contains("Output matches expected: NO"));

    ur_verify()
        .env("UR_VERIFY_CASES_DIR", dir.path())
        .env("UR_VERIFY_COMPARE", "0")
        .assert()
        .success();
}
