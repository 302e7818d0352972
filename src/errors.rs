//! Harness-level errors and their rendering.
//!
//! Per-fragment and per-file problems never surface here; they are recorded
//! in the file's report. These are the conditions that stop a whole run.

use std::io;
use std::path::PathBuf;

use miette::Diagnostic;
use thiserror::Error;

#[derive(Debug, Error, Diagnostic)]
pub enum HarnessError {
    #[error("no test files found in {}", .dir.display())]
    #[diagnostic(
        code(ur_verify::discovery::no_test_files),
        help("add `*UR_fragments.txt` files (or legacy `fragments_*.txt`), or pass files explicitly")
    )]
    NoTestFiles { dir: PathBuf },

    #[error("failed to scan test directory {}", .dir.display())]
    #[diagnostic(code(ur_verify::discovery::walk))]
    Discovery {
        dir: PathBuf,
        #[source]
        source: walkdir::Error,
    },

    #[error("invalid file name pattern `{pattern}`")]
    #[diagnostic(code(ur_verify::discovery::pattern))]
    Pattern {
        pattern: String,
        #[source]
        source: regex::Error,
    },

    #[error("failed to write golden file {}", .path.display())]
    #[diagnostic(code(ur_verify::golden::write))]
    GoldenWrite {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("failed to write report output")]
    #[diagnostic(code(ur_verify::output))]
    Output(#[from] io::Error),
}

#[derive(Debug, Error, Diagnostic)]
pub enum GoldenError {
    #[error("failed to read golden file {}", .path.display())]
    #[diagnostic(code(ur_verify::golden::read))]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("golden file {} is empty", .path.display())]
    #[diagnostic(code(ur_verify::golden::empty))]
    Empty { path: PathBuf },

    #[error("golden file {} does not hold a hex payload", .path.display())]
    #[diagnostic(
        code(ur_verify::golden::hex),
        help("the first line should look like `hex:0a1b2c...`")
    )]
    Hex {
        path: PathBuf,
        #[source]
        source: hex::FromHexError,
    },
}

/// Renders an error as a miette report on stderr.
pub fn print_error(error: impl Diagnostic + Send + Sync + 'static) {
    let report = miette::Report::new(error);
    eprintln!("{report:?}");
}
