//! Typed access to loader tables.

use vp_core::{Table, Value};

use crate::{SegmentError, SegmentResult};

/// Index of a required column.
pub(crate) fn require(table: &Table, name: &str) -> SegmentResult<usize> {
    table
        .column_index(name)
        .ok_or_else(|| SegmentError::MissingColumn(name.to_owned()))
}

/// Numeric view of a cell; empty cells are `NaN`.
pub(crate) fn number(value: &Value, row: usize, column: &str) -> SegmentResult<f64> {
    match value {
        Value::Number(n) => Ok(*n),
        Value::Empty => Ok(f64::NAN),
        Value::Text(s) => Err(SegmentError::NotNumeric {
            row,
            column: column.to_owned(),
            value:  s.clone(),
        }),
    }
}

/// `true` if the cell's key is one of `runs`.  Numeric run ids compare
/// without a fractional part.
pub(crate) fn run_matches(value: &Value, runs: &[String]) -> bool {
    value
        .as_key()
        .is_some_and(|k| runs.iter().any(|r| r.trim() == k))
}
