//! Golden files: recorded payloads that later runs are checked against.
//!
//! A golden file holds a single line, `hex:<lowercase hex>`. It sits next to
//! its capture file under a name derived from the capture file's name.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use tracing::{debug, info};

use crate::errors::{GoldenError, HarnessError};
use crate::session::Outcome;

pub const HEX_PREFIX: &str = "hex:";

// ============================================================================
// NAMING
// ============================================================================

/// Replaces a file-name suffix when it matches.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SuffixRule {
    pub input: String,
    pub output: String,
}

impl SuffixRule {
    pub fn new(input: impl Into<String>, output: impl Into<String>) -> Self {
        Self {
            input: input.into(),
            output: output.into(),
        }
    }
}

/// Maps capture file names to golden file names.
///
/// The first matching rule wins; names matching no rule get
/// `fallback_suffix` appended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GoldenNaming {
    pub rules: Vec<SuffixRule>,
    pub fallback_suffix: String,
}

impl Default for GoldenNaming {
    fn default() -> Self {
        Self {
            rules: vec![
                SuffixRule::new(".UR_fragments.txt", ".UR_object.txt"),
                SuffixRule::new(".txt", ".expected"),
            ],
            fallback_suffix: ".expected".into(),
        }
    }
}

impl GoldenNaming {
    pub fn golden_path(&self, fragments_path: &Path) -> PathBuf {
        let name = fragments_path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_default();

        let golden_name = self
            .rules
            .iter()
            .find_map(|rule| {
                name.strip_suffix(rule.input.as_str())
                    .map(|stem| format!("{stem}{}", rule.output))
            })
            .unwrap_or_else(|| format!("{name}{}", self.fallback_suffix));

        fragments_path.with_file_name(golden_name)
    }
}

// ============================================================================
// READ / WRITE
// ============================================================================

/// The golden file body for `payload`.
pub fn render(payload: &[u8]) -> String {
    format!("{HEX_PREFIX}{}\n", hex::encode(payload))
}

/// Writes (or overwrites) a golden file.
pub fn write_golden(path: &Path, payload: &[u8]) -> Result<(), HarnessError> {
    fs::write(path, render(payload)).map_err(|source| HarnessError::GoldenWrite {
        path: path.to_path_buf(),
        source,
    })?;
    info!(path = %path.display(), len = payload.len(), "golden file written");
    Ok(())
}

/// Reads a golden payload. A missing file is `Ok(None)`.
///
/// Only the first line counts, and the `hex:` prefix is optional.
pub fn read_golden(path: &Path) -> Result<Option<Vec<u8>>, GoldenError> {
    let text = match fs::read_to_string(path) {
        Ok(text) => text,
        Err(err) if err.kind() == io::ErrorKind::NotFound => return Ok(None),
        Err(source) => {
            return Err(GoldenError::Read {
                path: path.to_path_buf(),
                source,
            })
        }
    };

    let line = text.lines().next().map(str::trim).unwrap_or_default();
    let digits = line.strip_prefix(HEX_PREFIX).unwrap_or(line);
    if digits.is_empty() {
        return Err(GoldenError::Empty {
            path: path.to_path_buf(),
        });
    }
    hex::decode(digits)
        .map(Some)
        .map_err(|source| GoldenError::Hex {
            path: path.to_path_buf(),
            source,
        })
}

// ============================================================================
// COMPARISON
// ============================================================================

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GoldenCheck {
    /// The payload equals the recorded one.
    Matched,
    Mismatched { expected_len: usize, actual_len: usize },
    /// No golden file exists for this capture.
    Missing,
    Unreadable(String),
    /// Nothing to compare: comparison is off or the decode did not succeed.
    Skipped,
}

impl GoldenCheck {
    pub fn is_failure(&self) -> bool {
        matches!(self, Self::Mismatched { .. } | Self::Unreadable(_))
    }
}

/// Compares `payload` against the golden file at `path`.
pub fn compare(path: &Path, payload: &[u8]) -> GoldenCheck {
    match read_golden(path) {
        Ok(Some(expected)) if expected == payload => GoldenCheck::Matched,
        Ok(Some(expected)) => GoldenCheck::Mismatched {
            expected_len: expected.len(),
            actual_len: payload.len(),
        },
        Ok(None) => GoldenCheck::Missing,
        Err(err) => GoldenCheck::Unreadable(err.to_string()),
    }
}

/// Persists and checks reconstructed payloads for successful outcomes.
#[derive(Debug, Clone, Default)]
pub struct ResultRecorder {
    naming: GoldenNaming,
}

impl ResultRecorder {
    pub fn new(naming: GoldenNaming) -> Self {
        Self { naming }
    }

    pub fn golden_path(&self, outcome: &Outcome) -> PathBuf {
        self.naming.golden_path(&outcome.path)
    }

    /// Writes the golden file for a successful outcome. Returns where it went.
    pub fn record(&self, outcome: &Outcome) -> Result<Option<PathBuf>, HarnessError> {
        let Some(payload) = outcome.payload.as_deref() else {
            debug!(path = %outcome.path.display(), "no payload to record");
            return Ok(None);
        };
        let path = self.golden_path(outcome);
        write_golden(&path, payload)?;
        Ok(Some(path))
    }

    pub fn check(&self, outcome: &Outcome) -> GoldenCheck {
        match outcome.payload.as_deref() {
            Some(payload) => compare(&self.golden_path(outcome), payload),
            None => GoldenCheck::Skipped,
        }
    }
}
