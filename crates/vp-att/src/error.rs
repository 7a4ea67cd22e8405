//! Error types for vp-att.

use std::path::PathBuf;

use thiserror::Error;

use vp_core::VpError;

/// Errors that can occur while reading exports or mapping sheets.
#[derive(Debug, Error)]
pub enum LoadError {
    #[error("input file not found: {}", .0.display())]
    NotFound(PathBuf),

    #[error("I/O error reading {}: {source}", path.display())]
    Io {
        path:   PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("{0} contains no data rows")]
    Empty(String),

    #[error("{source_name} has no header row")]
    MissingHeader { source_name: String },

    #[error("columns normalize to the same name: {0:?}")]
    DuplicateColumn(Vec<String>),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("cannot read workbook {}: {source}", path.display())]
    Workbook {
        path:   PathBuf,
        #[source]
        source: calamine::Error,
    },

    #[error("mapping sheet {0:?} not found in workbook")]
    MissingSheet(String),

    #[error("mapping sheet {sheet:?}: {message}")]
    Sheet { sheet: String, message: String },

    #[error(transparent)]
    Core(#[from] VpError),
}

/// Alias for `Result<T, LoadError>`.
pub type LoadResult<T> = Result<T, LoadError>;
