//! Handles all user-facing report output.
//!
//! Everything goes through a `WriteColor` so the same functions serve the
//! terminal and in-memory buffers in tests.

use std::io::{self, Write};

use termcolor::{Color, ColorSpec, WriteColor};

use crate::golden::GoldenCheck;
use crate::runner::{FileReport, SuiteSummary};

// ============================================================================
// CORE OUTPUT FUNCTIONS
// ============================================================================

pub fn print_banner<W: WriteColor>(out: &mut W, generate_expected: bool) -> io::Result<()> {
    out.set_color(ColorSpec::new().set_fg(Some(Color::Cyan)).set_bold(true))?;
    writeln!(out, "=== UR Fragment Decode Verification ===")?;
    out.reset()?;
    if generate_expected {
        writeln!(out, "Mode: generating expected output files")?;
    }
    Ok(())
}

pub fn print_file_report<W: WriteColor>(out: &mut W, report: &FileReport) -> io::Result<()> {
    let outcome = &report.outcome;

    writeln!(out)?;
    out.set_color(ColorSpec::new().set_bold(true))?;
    writeln!(out, "=== Testing file: {} ===", outcome.path.display())?;
    out.reset()?;

    if outcome.available == 0 {
        writeln!(out, "No fragments found in file")?;
    }

    write!(out, "Data reconstruction is complete: ")?;
    print_flag(out, outcome.completed)?;
    write!(out, "Data reconstruction is success (valid): ")?;
    print_flag(out, outcome.succeeded)?;
    writeln!(
        out,
        "Parts used/total available parts: {}/{}",
        outcome.consumed, outcome.available
    )?;
    if let Some(detail) = &outcome.detail {
        writeln!(out, "Decoder status: {detail}")?;
    }

    match &report.golden {
        GoldenCheck::Matched => {
            write!(out, "Output matches expected: ")?;
            print_flag(out, true)?;
        }
        GoldenCheck::Mismatched {
            expected_len,
            actual_len,
        } => {
            write!(out, "Output matches expected: ")?;
            print_flag(out, false)?;
            writeln!(out, "  expected {expected_len} bytes, got {actual_len} bytes")?;
        }
        GoldenCheck::Unreadable(reason) => {
            print_colored(out, Color::Red, &format!("Expected output unreadable: {reason}"))?;
        }
        GoldenCheck::Missing | GoldenCheck::Skipped => {}
    }

    if let Some(path) = &report.written {
        writeln!(out, "Generated expected output: {}", path.display())?;
    }
    if let Some(reason) = &report.write_error {
        print_colored(out, Color::Red, &format!("Failed to generate expected output: {reason}"))?;
    }
    Ok(())
}

pub fn print_summary<W: WriteColor>(out: &mut W, summary: &SuiteSummary) -> io::Result<()> {
    writeln!(out)?;
    writeln!(out, "=== Summary ===")?;
    let color = if summary.all_passed() {
        Color::Green
    } else {
        Color::Red
    };
    out.set_color(ColorSpec::new().set_fg(Some(color)).set_bold(true))?;
    write!(out, "Tests passed: {}/{}", summary.passed, summary.total)?;
    out.reset()?;
    writeln!(out)
}

// ============================================================================
// PRIVATE HELPERS
// ============================================================================

fn print_flag<W: WriteColor>(out: &mut W, flag: bool) -> io::Result<()> {
    let (color, text) = if flag {
        (Color::Green, "YES")
    } else {
        (Color::Red, "NO")
    };
    out.set_color(ColorSpec::new().set_fg(Some(color)))?;
    write!(out, "{text}")?;
    out.reset()?;
    writeln!(out)
}

fn print_colored<W: WriteColor>(out: &mut W, color: Color, text: &str) -> io::Result<()> {
    out.set_color(ColorSpec::new().set_fg(Some(color)))?;
    write!(out, "{text}")?;
    out.reset()?;
    writeln!(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::{Outcome, SessionResult};
    use termcolor::NoColor;

    fn render(report: &FileReport) -> String {
        let mut out = NoColor::new(Vec::new());
        print_file_report(&mut out, report).unwrap();
        String::from_utf8(out.into_inner()).unwrap()
    }

    fn report(completed: bool, succeeded: bool, consumed: usize, available: usize) -> FileReport {
        FileReport::new(Outcome::new(
            "cases/a.UR_fragments.txt",
            SessionResult {
                available,
                consumed,
                completed,
                succeeded,
                payload: succeeded.then(|| vec![7]),
                detail: None,
            },
        ))
    }

    #[test]
    fn file_report_lines() {
        let text = render(&report(true, true, 9, 12));
        assert_eq!(
            text,
            "\n=== Testing file: cases/a.UR_fragments.txt ===\n\
             Data reconstruction is complete: YES\n\
             Data reconstruction is success (valid): YES\n\
             Parts used/total available parts: 9/12\n"
        );
    }

    #[test]
    fn incomplete_and_empty_files() {
        let text = render(&report(false, false, 0, 0));
        assert!(text.contains("No fragments found in file\n"));
        assert!(text.contains("Data reconstruction is complete: NO\n"));
        assert!(text.contains("Data reconstruction is success (valid): NO\n"));
        assert!(text.contains("Parts used/total available parts: 0/0\n"));
        assert!(!text.contains("Decoder status"));
    }

    #[test]
    fn decoder_status_follows_the_counts() {
        let mut incomplete = report(false, false, 4, 8);
        incomplete.outcome.detail = Some("3 of 9 fragments recovered from 4 parts".into());
        assert!(render(&incomplete).ends_with(
            "Parts used/total available parts: 4/8\n\
             Decoder status: 3 of 9 fragments recovered from 4 parts\n"
        ));
    }

    #[test]
    fn golden_results_are_reported() {
        let mut mismatched = report(true, true, 1, 1);
        mismatched.golden = GoldenCheck::Mismatched {
            expected_len: 4,
            actual_len: 1,
        };
        let text = render(&mismatched);
        assert!(text.contains("Output matches expected: NO\n"));
        assert!(text.contains("expected 4 bytes, got 1 bytes"));

        let mut written = report(true, true, 1, 1);
        written.written = Some("cases/a.UR_object.txt".into());
        assert!(render(&written).contains("Generated expected output: cases/a.UR_object.txt\n"));
    }

    #[test]
    fn summary_line() {
        let mut out = NoColor::new(Vec::new());
        print_summary(&mut out, &SuiteSummary { passed: 3, total: 4 }).unwrap();
        let text = String::from_utf8(out.into_inner()).unwrap();
        assert_eq!(text, "\n=== Summary ===\nTests passed: 3/4\n");
    }
}
