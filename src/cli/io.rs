//! Output handling for the CLI
//!
//! - Check reports are human-readable text, errors listed verbatim
//! - Everything else is JSON on stdout
//! - Logs go to stderr and never mix with this output

use std::io::{self, Write};

use serde::Serialize;

use crate::checker::CheckReport;

use super::errors::CliResult;

/// Write a value as pretty JSON to stdout
pub fn write_json<T: Serialize + ?Sized>(value: &T) -> CliResult<()> {
    let mut stdout = io::stdout();
    serde_json::to_writer_pretty(&mut stdout, value)?;
    writeln!(stdout)?;
    stdout.flush()?;

    Ok(())
}

/// Write a raw JSON string to stdout
pub fn write_raw(json_str: &str) -> CliResult<()> {
    let mut stdout = io::stdout();
    writeln!(stdout, "{}", json_str)?;
    stdout.flush()?;

    Ok(())
}

/// Verdict line followed by one line per error
pub fn render_report(report: &CheckReport) -> String {
    let source = report.source.as_deref().unwrap_or("submission");
    let verdict = if report.passed() { "good" } else { "not good" };
    let mut out = format!("{}: {}\n", source, verdict);
    for error in report.errors() {
        out.push_str("  ");
        out.push_str(&error);
        out.push('\n');
    }
    out
}

pub fn write_report(report: &CheckReport) -> CliResult<()> {
    let mut stdout = io::stdout();
    stdout.write_all(render_report(report).as_bytes())?;
    stdout.flush()?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::checker::{Finding, FindingKind};

    #[test]
    fn test_render_passed_report() {
        let report = CheckReport::new(Some("cruise.xlsx".to_string()));
        assert_eq!(render_report(&report), "cruise.xlsx: good\n");
    }

    #[test]
    fn test_render_failed_report_lists_errors() {
        let mut report = CheckReport::new(None);
        report.push(Finding::new(FindingKind::DuplicateId, "Duplicate eventID 'x' on rows [4, 9]"));
        report.push(Finding::new(FindingKind::UnknownColumn, "Unknown column 'foo' is not a recognised field"));
        let text = render_report(&report);
        assert!(text.starts_with("submission: not good\n"));
        assert!(text.contains("  Duplicate eventID 'x' on rows [4, 9]\n"));
        assert!(text.contains("  Unknown column 'foo'"));
    }
}
