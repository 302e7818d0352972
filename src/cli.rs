//! The `ur-verify` command-line interface.
//!
//! Parses arguments, builds the run configuration and drives the suite
//! runner with the UR decoder. Exit status is success only when at least one
//! file ran and every file passed.

use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use termcolor::StandardStream;
use tracing_subscriber::EnvFilter;

use crate::config::HarnessConfig;
use crate::decoder::Decoder;
use crate::errors::{print_error, HarnessError};
use crate::runner::{SuiteRunner, SuiteSummary};
use crate::ur::UrDecoder;

pub mod args;
pub mod output;

use self::args::VerifyArgs;

/// The main entry point for the CLI.
pub fn run() -> ExitCode {
    init_tracing();
    let args = VerifyArgs::parse();
    let config = HarnessConfig::from_env().with_generate_expected(args.generate_expected);

    match execute::<UrDecoder>(&config, &args.files) {
        Ok(summary) if summary.all_passed() => ExitCode::SUCCESS,
        Ok(_) => ExitCode::FAILURE,
        Err(err) => {
            print_error(err);
            ExitCode::FAILURE
        }
    }
}

/// Runs the suite over `files`, or over discovered files when none are given.
pub fn execute<D: Decoder + Default>(
    config: &HarnessConfig,
    files: &[PathBuf],
) -> Result<SuiteSummary, HarnessError> {
    let mut stdout = StandardStream::stdout(config.color);
    output::print_banner(&mut stdout, config.generate_expected)?;

    let runner = SuiteRunner::new(config.clone());
    let files = if files.is_empty() {
        runner.discover()?
    } else {
        files.to_vec()
    };

    Ok(runner.run::<D, _>(&files, &mut stdout)?)
}

// ============================================================================
// LOGGING
// ============================================================================

/// Logs go to stderr, filtered by `RUST_LOG` (default `warn`).
fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();
}
