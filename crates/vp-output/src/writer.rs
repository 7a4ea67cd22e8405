//! The `ReportWriter` trait implemented by all backend writers.

use vp_core::{Table, WideTable};

use crate::{OutputError, OutputResult};

/// Trait implemented by the CSV and SQLite writers.
///
/// `name` identifies the table within the output (a file stem or a
/// database table) and must be non-empty without path separators.
pub trait ReportWriter {
    /// Write a pivoted report table.
    fn write_wide(&mut self, name: &str, table: &WideTable) -> OutputResult<()>;

    /// Write a flat table.
    fn write_table(&mut self, name: &str, table: &Table) -> OutputResult<()>;

    /// Flush and close all underlying handles.
    ///
    /// Calling it again is a no-op.
    fn finish(&mut self) -> OutputResult<()>;
}

pub(crate) fn check_name(name: &str) -> OutputResult<()> {
    if name.trim().is_empty() || name.contains(['/', '\\']) || name == "." || name == ".." {
        return Err(OutputError::InvalidName(name.to_owned()));
    }
    Ok(())
}
