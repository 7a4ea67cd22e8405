//! `vp-node` — the node evaluation report.
//!
//! Turns a VISSIM node results export into a per-node report of queue
//! lengths, volumes, delays and HCM level of service, broken down by
//! movement, approach and intersection.
//!
//! # Crate layout
//!
//! | Module          | Contents                                                  |
//! |-----------------|-----------------------------------------------------------|
//! | [`movement`]    | movement label grammar (`"101: Link5 @ Link9"`)           |
//! | [`record`]      | `MovementRecord`, column names and row filter             |
//! | [`dedup`]       | direction de-duplication rules and checks                 |
//! | [`crosswalk`]   | simulator direction → report direction, node types        |
//! | [`aggregate`]   | vehicle-weighted intersection and approach delay          |
//! | [`report`]      | long report rows, LOS grading, pivot to `WideTable`       |
//! | [`pipeline`]    | `NodeEvalConfig`, `NodeEvalPipeline`                      |
//! | [`error`]       | `NodeError`, `NodeResult<T>`                              |

pub mod aggregate;
pub mod crosswalk;
pub mod dedup;
pub mod error;
pub mod movement;
pub mod pipeline;
pub mod record;
pub mod report;

#[cfg(test)]
mod tests;

pub use aggregate::{approach_delay, intersection_delay, AggregatedDelay, INTERSECTION};
pub use crosswalk::{
    approach_of, map_directions, CrosswalkRow, DirectionCrosswalk, MappedMovement, MappedMovements,
};
pub use dedup::{
    deduplicate, verify_rules_cover_data, verify_unique_directions, DeduplicationRule,
    DeduplicationTable, UniqueMovement,
};
pub use error::{NodeError, NodeResult};
pub use movement::{parse_movement, MovementLabel};
pub use pipeline::{Diagnostics, NodeEvalConfig, NodeEvalOutput, NodeEvalPipeline};
pub use record::{records_from_table, MovementRecord, NodeColumns, RecordFilter};
pub use report::{assemble_report_rows, format_report, ReportOrder, ReportRow};
