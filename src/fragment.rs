//! Pulls UR fragment strings out of recorded capture files.
//!
//! Capture files are loosely formatted: JSON arrays, quoted lists, log lines.
//! A line contributes at most one fragment, starting at the first
//! case-insensitive `ur:` and running up to the first delimiter.

use std::fmt;
use std::fs;
use std::path::Path;

use tracing::{debug, warn};

/// Marker that opens a fragment, matched case-insensitively.
pub const SCHEME_MARKER: &str = "ur:";

/// Characters that end a fragment.
pub const DELIMITERS: [char; 4] = ['"', ',', '\r', '\n'];

/// One encoded UR string, exactly as extracted from a line.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Fragment(String);

impl Fragment {
    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_string(self) -> String {
        self.0
    }
}

impl fmt::Display for Fragment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for Fragment {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// Extracts the fragment carried by `line`, if any.
///
/// A marker followed directly by a delimiter or the end of the line yields
/// nothing.
pub fn extract_fragment(line: &str) -> Option<Fragment> {
    let start = find_marker(line)?;
    let tail = &line[start..];
    let end = tail.find(|c: char| DELIMITERS.contains(&c)).unwrap_or(tail.len());
    let token = &tail[..end];
    if token.len() <= SCHEME_MARKER.len() {
        return None;
    }
    Some(Fragment(token.to_owned()))
}

fn find_marker(line: &str) -> Option<usize> {
    // The match starts on an ASCII byte, so the offset is a char boundary.
    line.as_bytes()
        .windows(SCHEME_MARKER.len())
        .position(|window| window.eq_ignore_ascii_case(SCHEME_MARKER.as_bytes()))
}

/// Extracts fragments from every line of `text`, in order.
pub fn fragments_from_str(text: &str) -> Vec<Fragment> {
    text.lines().filter_map(extract_fragment).collect()
}

/// Reads a capture file. An unreadable file yields no fragments.
pub fn read_fragments(path: &Path) -> Vec<Fragment> {
    match fs::read_to_string(path) {
        Ok(text) => {
            let fragments = fragments_from_str(&text);
            debug!(path = %path.display(), count = fragments.len(), "fragments loaded");
            fragments
        }
        Err(err) => {
            warn!(path = %path.display(), error = %err, "could not read fragment file");
            Vec::new()
        }
    }
}
