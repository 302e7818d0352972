// Shared helpers for integration tests: stage fixture captures in a scratch directory.

#![allow(dead_code)]

use std::fs;
use std::path::{Path, PathBuf};

use tempfile::TempDir;

pub const FIXTURES: &str = concat!(env!("CARGO_MANIFEST_DIR"), "/tests/fixtures");

/// Captures that decode successfully and carry a golden file.
pub const PASSING: [&str; 3] = ["single_part", "multipart_extra", "fountain_only"];

pub fn fixture(name: &str) -> PathBuf {
    Path::new(FIXTURES).join(name)
}

pub fn capture_name(case: &str) -> String {
    format!("{case}.UR_fragments.txt")
}

pub fn golden_name(case: &str) -> String {
    format!("{case}.UR_object.txt")
}

/// Copies the named cases (captures plus any golden file) into a fresh directory.
pub fn stage(cases: &[&str]) -> TempDir {
    let dir = tempfile::tempdir().expect("create temp dir");
    for case in cases {
        copy_into(dir.path(), &capture_name(case));
        let golden = fixture(&golden_name(case));
        if golden.exists() {
            copy_into(dir.path(), &golden_name(case));
        }
    }
    dir
}

/// Like [`stage`] but without golden files.
pub fn stage_captures(cases: &[&str]) -> TempDir {
    let dir = tempfile::tempdir().expect("create temp dir");
    for case in cases {
        copy_into(dir.path(), &capture_name(case));
    }
    dir
}

fn copy_into(dir: &Path, name: &str) {
    fs::copy(fixture(name), dir.join(name)).expect("copy fixture");
}

pub fn read(path: impl AsRef<Path>) -> String {
    fs::read_to_string(path).expect("read file")
}
