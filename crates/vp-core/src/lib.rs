//! `vp-core` — foundational types for the VISSIM post-processing workspace.
//!
//! Every other `vp-*` crate depends on this one.  It has no `vp-*`
//! dependencies of its own.
//!
//! # What lives here
//!
//! | Module         | Contents                                                  |
//! |----------------|-----------------------------------------------------------|
//! | [`ids`]        | `NodeNo`, `LinkNo`, `SegmentNo`                           |
//! | [`value`]      | `Value` — one cell of a delimited simulator export        |
//! | [`table`]      | `Table` (long form), `WideTable`, `PivotBuilder`          |
//! | [`columns`]    | simulator header → snake_case identifier normalization    |
//! | [`interval`]   | `TimeInterval`, `IntervalOrder`                           |
//! | [`los`]        | `ControlType`, `Los`, HCM delay thresholds                |
//! | [`policy`]     | `Strictness` (raise vs. warn on data-quality problems)    |
//! | [`error`]      | `VpError`, `VpResult`                                     |

pub mod columns;
pub mod error;
pub mod ids;
pub mod interval;
pub mod los;
pub mod policy;
pub mod table;
pub mod value;

#[cfg(test)]
mod tests;

// ── Re-exports ────────────────────────────────────────────────────────────────

pub use columns::{find_collisions, normalize_column, normalize_columns};
pub use error::{VpError, VpResult};
pub use ids::{LinkNo, NodeNo, SegmentNo};
pub use interval::{IntervalOrder, IntervalSpec, TimeInterval};
pub use los::{los, ControlType, Los};
pub use policy::Strictness;
pub use table::{PivotBuilder, Table, WideRow, WideTable};
pub use value::Value;
