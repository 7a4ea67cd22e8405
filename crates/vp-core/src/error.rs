//! Workspace base error type.
//!
//! Sub-crates define their own error enums and wrap `VpError` as one
//! variant via `#[from]`.

use thiserror::Error;

/// Errors produced by `vp-core`.
#[derive(Debug, Error)]
pub enum VpError {
    #[error("parse error: {0}")]
    Parse(String),

    #[error("configuration error: {0}")]
    Config(String),

    #[error("row has {got} cells but the table has {expected} columns")]
    RowWidth { expected: usize, got: usize },

    #[error("duplicate entry for row {key} in column ({group}, {metric})")]
    DuplicateCell {
        key:    String,
        group:  String,
        metric: String,
    },
}

/// Shorthand result type for `vp-core`.
pub type VpResult<T> = Result<T, VpError>;
