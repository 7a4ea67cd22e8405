use std::path::PathBuf;

use thiserror::Error;

use vp_att::LoadError;
use vp_core::VpError;

#[derive(Debug, Error)]
pub enum SegmentError {
    #[error("malformed link segment {0:?}: expected \"<link>-<start>-<end>\"")]
    MalformedSegment(String),

    #[error("cannot read a run number from file name {0:?}: expected \"<name>_<run>.rsr\"")]
    RunNumber(PathBuf),

    #[error("required column {0:?} missing")]
    MissingColumn(String),

    #[error("row {row}, column {column:?}: expected a number, found {value:?}")]
    NotNumeric {
        row:    usize,
        column: String,
        value:  String,
    },

    #[error("run {run}: no measured occupancy for transit vehicle {vehicle}")]
    MissingOccupancy { run: u32, vehicle: u64 },

    #[error("no data found for run(s) {0:?}")]
    RunNotFound(Vec<String>),

    #[error(transparent)]
    Load(#[from] LoadError),

    #[error(transparent)]
    Core(#[from] VpError),
}

pub type SegmentResult<T> = Result<T, SegmentError>;
