//! JSON output reporter
//!
//! Emits an array with one object per linted file, each carrying every
//! statement result (passing ones included) in evaluation order.

use std::io::Write;

use crate::output::{FileReport, JsonReporter, ReportError, Reporter};

impl Reporter for JsonReporter {
    fn emit(&self, reports: &[FileReport], out: &mut dyn Write) -> Result<(), ReportError> {
        if self.pretty {
            serde_json::to_writer_pretty(&mut *out, reports)?;
        } else {
            serde_json::to_writer(&mut *out, reports)?;
        }
        writeln!(out)?;
        out.flush()?;
        Ok(())
    }
}
