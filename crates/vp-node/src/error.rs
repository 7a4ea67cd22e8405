use thiserror::Error;

use vp_att::LoadError;
use vp_core::{NodeNo, VpError};

/// Errors produced by the node evaluation pipeline.
#[derive(Debug, Error)]
pub enum NodeError {
    #[error("malformed movement label {0:?}: no leading node number")]
    MalformedMovement(String),

    #[error("required column {0:?} missing from node results")]
    MissingColumn(String),

    #[error("row {row}, column {column:?}: expected a number, found {value:?}")]
    NotNumeric {
        row:    usize,
        column: String,
        value:  String,
    },

    #[error("no data found for run(s) {0:?}")]
    RunNotFound(Vec<String>),

    #[error(
        "direction {direction:?} occurs more than once at node {node} (run {run}, interval {interval}); \
         the de-duplication table is incomplete"
    )]
    DuplicateDirection {
        run:       String,
        interval:  String,
        node:      NodeNo,
        direction: String,
    },

    #[error("direction {direction:?} at node {node} has no entry in the direction crosswalk")]
    UnmappedDirection { node: NodeNo, direction: String },

    #[error("zero vehicles in group run {run}, interval {interval}, node {node}{}", approach_suffix(.approach))]
    ZeroVolume {
        run:      String,
        interval: String,
        node:     NodeNo,
        approach: Option<String>,
    },

    #[error("node {node} has unknown control type {node_type:?}")]
    UnknownControlType { node: NodeNo, node_type: String },

    #[error(transparent)]
    Load(#[from] LoadError),

    #[error(transparent)]
    Core(#[from] VpError),
}

fn approach_suffix(approach: &Option<String>) -> String {
    approach.as_ref().map(|a| format!(", approach {a}")).unwrap_or_default()
}

pub type NodeResult<T> = Result<T, NodeError>;
