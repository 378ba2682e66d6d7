//! Human-readable text output reporter
//!
//! Only failing statements are printed, grouped per file and sorted by path:
//! ```text
//! File migrations/001.sql Results:
//!     Rule high-availability-avoid-table-rename violation found for statement:
//!       ALTER TABLE movies RENAME TO films;
//!     Explanation: Renaming a table can cause errors in previous application versions.
//! ```
//! (indentation is a tab in the real output).

use std::collections::BTreeMap;
use std::fmt::Write as FmtWrite;
use std::io::Write;
use std::path::Path;

use crate::output::{FileReport, ReportError, Reporter, TextReporter};
use crate::rules::ReportedError;

/// Format the failures of one file, or `None` when every statement passed.
fn format_file(path: &Path, reports: &[&FileReport]) -> Option<String> {
    let errors: Vec<&ReportedError> = reports
        .iter()
        .flat_map(|r| r.results.iter())
        .flat_map(|result| {
            let mut sorted: Vec<&ReportedError> = result.errors.iter().collect();
            sorted.sort_by(|a, b| a.alias().cmp(b.alias()));
            sorted
        })
        .collect();
    if errors.is_empty() {
        return None;
    }

    let mut buf = String::new();
    // Writing to a String cannot fail.
    let _ = writeln!(buf, "File {} Results:", path.to_string_lossy().replace('\\', "/"));
    for e in errors {
        let _ = write!(
            buf,
            "\tRule {} violation found for statement:\n\t  {}\n\tExplanation: {}\n\n",
            e.alias(),
            e.statement().trim(),
            e.documentation()
        );
    }
    Some(buf)
}

/// Format every report into a single text string, without trailing whitespace.
fn format_all(reports: &[FileReport]) -> String {
    let mut by_path: BTreeMap<&Path, Vec<&FileReport>> = BTreeMap::new();
    for report in reports {
        by_path.entry(report.path.as_path()).or_default().push(report);
    }

    let output: String = by_path
        .iter()
        .filter_map(|(path, reports)| format_file(path, reports))
        .collect();
    output.trim().to_string()
}

impl Reporter for TextReporter {
    fn emit(&self, reports: &[FileReport], out: &mut dyn Write) -> Result<(), ReportError> {
        let text = format_all(reports);
        if !text.is_empty() {
            writeln!(out, "{text}")?;
        }
        out.flush()?;
        Ok(())
    }
}
