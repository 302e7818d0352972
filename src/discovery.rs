//! Finds capture files in the cases directory.

use std::io;
use std::path::{Path, PathBuf};

use regex::Regex;
use tracing::debug;
use walkdir::WalkDir;

use crate::config::DiscoveryPatterns;
use crate::errors::HarnessError;

/// Scans a single directory level for capture files.
#[derive(Debug)]
pub struct TestDiscoverer;

impl TestDiscoverer {
    /// Returns files matching the primary pattern, or the legacy pattern when
    /// nothing matches the primary one. Results are sorted.
    ///
    /// A missing directory is reported as having no test files.
    pub fn discover_test_files<P: AsRef<Path>>(
        root: P,
        patterns: &DiscoveryPatterns,
    ) -> Result<Vec<PathBuf>, HarnessError> {
        let root = root.as_ref();
        let primary = Self::matching_files(root, &patterns.primary)?;
        if !primary.is_empty() {
            return Ok(primary);
        }

        debug!(pattern = %patterns.legacy, "no primary matches, trying legacy pattern");
        let legacy = Self::matching_files(root, &patterns.legacy)?;
        if legacy.is_empty() {
            return Err(HarnessError::NoTestFiles {
                dir: root.to_path_buf(),
            });
        }
        Ok(legacy)
    }

    fn matching_files(root: &Path, pattern: &str) -> Result<Vec<PathBuf>, HarnessError> {
        let matcher = pattern_regex(pattern)?;
        let mut files = Vec::new();
        for entry in WalkDir::new(root).min_depth(1).max_depth(1) {
            let entry = match entry {
                Ok(entry) => entry,
                Err(err) if err.depth() == 0 && is_not_found(&err) => break,
                Err(source) => {
                    return Err(HarnessError::Discovery {
                        dir: root.to_path_buf(),
                        source,
                    })
                }
            };

            if !entry.file_type().is_file() {
                continue;
            }
            if matcher.is_match(&entry.file_name().to_string_lossy()) {
                files.push(entry.into_path());
            }
        }
        files.sort();
        Ok(files)
    }
}

fn is_not_found(err: &walkdir::Error) -> bool {
    err.io_error()
        .is_some_and(|io| io.kind() == io::ErrorKind::NotFound)
}

/// Compiles a file-name pattern where `*` stands for any run of characters.
/// Everything else matches literally, and the whole name must match.
pub fn pattern_regex(pattern: &str) -> Result<Regex, HarnessError> {
    let body = pattern
        .split('*')
        .map(regex::escape)
        .collect::<Vec<_>>()
        .join(".*");
    Regex::new(&format!("(?s)^{body}$")).map_err(|source| HarnessError::Pattern {
        pattern: pattern.to_owned(),
        source,
    })
}
