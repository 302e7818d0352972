//! Run configuration: where cases live, how they are named, what to do with goldens.

use std::env;
use std::io::IsTerminal;
use std::path::PathBuf;

use termcolor::ColorChoice;

use crate::golden::GoldenNaming;

/// Overrides [`HarnessConfig::cases_dir`].
pub const CASES_DIR_ENV: &str = "UR_VERIFY_CASES_DIR";

/// Set to `0`, `false` or `off` to skip golden comparison.
pub const COMPARE_ENV: &str = "UR_VERIFY_COMPARE";

pub const DEFAULT_CASES_DIR: &str = "test_cases";

/// Glob-style patterns (only `*` is special) used to find capture files.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DiscoveryPatterns {
    pub primary: String,
    /// Tried only when nothing matches `primary`.
    pub legacy: String,
}

impl Default for DiscoveryPatterns {
    fn default() -> Self {
        Self {
            primary: "*UR_fragments.txt".into(),
            legacy: "fragments_*.txt".into(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct HarnessConfig {
    pub cases_dir: PathBuf,
    pub patterns: DiscoveryPatterns,
    pub naming: GoldenNaming,
    /// Write a golden file for every successful decode.
    pub generate_expected: bool,
    /// Compare successful decodes against existing golden files.
    pub compare_golden: bool,
    pub color: ColorChoice,
}

impl Default for HarnessConfig {
    fn default() -> Self {
        Self {
            cases_dir: PathBuf::from(DEFAULT_CASES_DIR),
            patterns: DiscoveryPatterns::default(),
            naming: GoldenNaming::default(),
            generate_expected: false,
            compare_golden: true,
            color: ColorChoice::Auto,
        }
    }
}

impl HarnessConfig {
    /// Defaults, adjusted by the `UR_VERIFY_*` environment variables.
    pub fn from_env() -> Self {
        let mut config = Self::default();
        if let Some(dir) = env::var_os(CASES_DIR_ENV).filter(|dir| !dir.is_empty()) {
            config.cases_dir = PathBuf::from(dir);
        }
        if let Ok(value) = env::var(COMPARE_ENV) {
            config.compare_golden = !is_disabled(&value);
        }
        if !std::io::stdout().is_terminal() {
            config.color = ColorChoice::Never;
        }
        config
    }

    pub fn with_generate_expected(mut self, generate: bool) -> Self {
        self.generate_expected = generate;
        self
    }

    pub fn with_cases_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.cases_dir = dir.into();
        self
    }
}

fn is_disabled(value: &str) -> bool {
    matches!(
        value.trim().to_ascii_lowercase().as_str(),
        "0" | "false" | "off" | "no"
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_compare_without_generating() {
        let config = HarnessConfig::default();
        assert_eq!(config.cases_dir, PathBuf::from("test_cases"));
        assert!(config.compare_golden);
        assert!(!config.generate_expected);
        assert_eq!(config.patterns.primary, "*UR_fragments.txt");
        assert_eq!(config.patterns.legacy, "fragments_*.txt");
    }

    #[test]
    fn disable_values() {
        for value in ["0", "false", "OFF", " no "] {
            assert!(is_disabled(value), "{value}");
        }
        for value in ["1", "true", "", "yes"] {
            assert!(!is_disabled(value), "{value}");
        }
    }
}
