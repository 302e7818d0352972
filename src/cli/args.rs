//! Command-line arguments for `ur-verify`.
//!
//! Everything beyond these is configured through `UR_VERIFY_*` environment
//! variables; see [`crate::config`].

use clap::Parser;
use std::path::PathBuf;

#[derive(Debug, Parser)]
#[command(
    name = "ur-verify",
    version,
    about = "Replays recorded UR fragment captures through a decoder and checks the results."
)]
pub struct VerifyArgs {
    /// Write a golden file for every successfully decoded capture.
    #[arg(long)]
    pub generate_expected: bool,

    /// Capture files to verify. Defaults to discovering them in the cases directory.
    #[arg(value_name = "FILES")]
    pub files: Vec<PathBuf>,
}
