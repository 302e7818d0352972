//! Runs every capture file through a decoder and tallies the results.

use std::io;
use std::path::{Path, PathBuf};

use termcolor::WriteColor;
use tracing::{error, info};

use crate::cli::output;
use crate::config::HarnessConfig;
use crate::decoder::Decoder;
use crate::discovery::TestDiscoverer;
use crate::errors::HarnessError;
use crate::golden::{GoldenCheck, ResultRecorder};
use crate::session::{verify_file, Outcome};

/// Everything the harness learned about one capture file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileReport {
    pub outcome: Outcome,
    pub golden: GoldenCheck,
    /// Golden file written during generation.
    pub written: Option<PathBuf>,
    /// Golden file that should have been written but could not be.
    pub write_error: Option<String>,
}

impl FileReport {
    pub fn new(outcome: Outcome) -> Self {
        Self {
            outcome,
            golden: GoldenCheck::Skipped,
            written: None,
            write_error: None,
        }
    }

    pub fn passed(&self) -> bool {
        self.outcome.succeeded && !self.golden.is_failure() && self.write_error.is_none()
    }
}

/// Pass/fail counts for a whole run.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct SuiteSummary {
    pub passed: usize,
    pub total: usize,
}

impl SuiteSummary {
    pub fn from_reports(reports: &[FileReport]) -> Self {
        Self {
            passed: reports.iter().filter(|report| report.passed()).count(),
            total: reports.len(),
        }
    }

    pub fn failed(&self) -> usize {
        self.total - self.passed
    }

    /// True only when at least one file ran and every file passed.
    pub fn all_passed(&self) -> bool {
        self.total > 0 && self.passed == self.total
    }
}

pub struct SuiteRunner {
    config: HarnessConfig,
    recorder: ResultRecorder,
}

impl SuiteRunner {
    pub fn new(config: HarnessConfig) -> Self {
        let recorder = ResultRecorder::new(config.naming.clone());
        Self { config, recorder }
    }

    pub fn config(&self) -> &HarnessConfig {
        &self.config
    }

    pub fn discover(&self) -> Result<Vec<PathBuf>, HarnessError> {
        TestDiscoverer::discover_test_files(&self.config.cases_dir, &self.config.patterns)
    }

    /// Decodes one file with a fresh `D`, then records or checks its golden file.
    pub fn verify<D: Decoder + Default>(&self, path: &Path) -> FileReport {
        let mut report = FileReport::new(verify_file::<D>(path));

        if self.config.generate_expected {
            match self.recorder.record(&report.outcome) {
                Ok(written) => report.written = written,
                Err(err) => {
                    error!(path = %path.display(), error = %err, "could not record golden file");
                    report.write_error = Some(err.to_string());
                }
            }
        } else if self.config.compare_golden {
            report.golden = self.recorder.check(&report.outcome);
        }

        info!(
            path = %path.display(),
            consumed = report.outcome.consumed,
            available = report.outcome.available,
            passed = report.passed(),
            "file verified"
        );
        report
    }

    /// Verifies `files` in order without printing anything.
    pub fn verify_all<D: Decoder + Default>(&self, files: &[PathBuf]) -> Vec<FileReport> {
        files.iter().map(|path| self.verify::<D>(path)).collect()
    }

    /// Verifies `files` in order, printing each report as it completes and a
    /// summary at the end.
    pub fn run<D: Decoder + Default, W: WriteColor>(
        &self,
        files: &[PathBuf],
        out: &mut W,
    ) -> io::Result<SuiteSummary> {
        let mut reports = Vec::with_capacity(files.len());
        for path in files {
            let report = self.verify::<D>(path);
            output::print_file_report(out, &report)?;
            reports.push(report);
        }

        let summary = SuiteSummary::from_reports(&reports);
        output::print_summary(out, &summary)?;
        Ok(summary)
    }
}
