//! Simulator direction → report direction crosswalk.

use std::collections::{BTreeSet, HashMap};
use std::sync::LazyLock;

use regex::Regex;
use serde::Deserialize;

use vp_core::{NodeNo, Strictness};

use crate::dedup::UniqueMovement;
use crate::{NodeError, NodeResult};

/// Sheet holding the crosswalk.
pub const CROSSWALK_SHEET: &str = "vissim_report_convertion";

/// Report direction of the export's own cross-check row.
pub const TOTAL: &str = "Total";

static APPROACH: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\S{2}").expect("static pattern"));

/// One row of the crosswalk sheet.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
pub struct CrosswalkRow {
    #[serde(alias = "node_id")]
    pub node_no:                   NodeNo,
    pub movement_direction_unique: String,
    #[serde(alias = "report_direction")]
    pub direction_results:         String,
    #[serde(default)]
    pub node_type:                 String,
}

/// `(node, direction_unique) → report_direction`, plus the control type of
/// every node.
///
/// A row with a blank `direction_results` cell declares a movement that is
/// kept out of the report (freeway, bike path or crosswalk movements).  It
/// is stored as `None` so it can be told apart from a missing row.
#[derive(Clone, Debug, Default)]
pub struct DirectionCrosswalk {
    directions: HashMap<(NodeNo, String), Option<String>>,
    node_types: HashMap<NodeNo, String>,
}

impl DirectionCrosswalk {
    pub fn new(rows: Vec<CrosswalkRow>) -> Self {
        let mut cw = Self::default();
        for row in rows {
            let node_type = row.node_type.trim();
            if !node_type.is_empty() {
                // first declared type wins
                cw.node_types.entry(row.node_no).or_insert_with(|| node_type.to_owned());
            }
            let report = row.direction_results.trim();
            cw.directions.insert(
                (row.node_no, row.movement_direction_unique.trim().to_owned()),
                (!report.is_empty()).then(|| report.to_owned()),
            );
        }
        cw
    }

    /// Report direction of a movement.  `None` both for movements absent
    /// from the crosswalk and for those declared with a blank cell.
    pub fn report_direction(&self, node: NodeNo, direction_unique: &str) -> Option<&str> {
        self.entry(node, direction_unique).flatten()
    }

    /// Whether the crosswalk has a row for the movement, blank or not.
    pub fn contains(&self, node: NodeNo, direction_unique: &str) -> bool {
        self.entry(node, direction_unique).is_some()
    }

    fn entry(&self, node: NodeNo, direction_unique: &str) -> Option<Option<&str>> {
        self.directions
            .get(&(node, direction_unique.trim().to_owned()))
            .map(|d| d.as_deref())
    }

    pub fn node_type(&self, node: NodeNo) -> Option<&str> {
        self.node_types.get(&node).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.directions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.directions.is_empty()
    }
}

/// A movement joined to the crosswalk.
#[derive(Clone, Debug, PartialEq)]
pub struct MappedMovement {
    pub movement:         UniqueMovement,
    /// `None` when the crosswalk has no entry or a blank one.
    pub report_direction: Option<String>,
    pub approach:         Option<String>,
}

/// Approach code of a report direction: its first two consecutive
/// non-whitespace characters (`"NBR"` → `"NB"`).
pub fn approach_of(report_direction: &str) -> Option<String> {
    APPROACH.find(report_direction).map(|m| m.as_str().to_owned())
}

/// Result of [`map_directions`].
#[derive(Clone, Debug, Default)]
pub struct MappedMovements {
    /// Every non-`Total` movement, mapped or not.
    pub movements: Vec<MappedMovement>,
    /// Distinct `(node, direction_unique)` pairs with no crosswalk entry.
    pub unmapped:  Vec<(NodeNo, String)>,
}

/// Join movements to the crosswalk and drop `Total` rows.
///
/// Unmapped movements stay in the output with `report_direction = None`
/// so they still count towards intersection delay.  Under
/// [`Strictness::Strict`] the first unmapped movement is an error.
/// Movements the crosswalk declares with a blank report direction are
/// treated the same way but are neither reported as unmapped nor an error.
pub fn map_directions(
    movements: Vec<UniqueMovement>,
    crosswalk: &DirectionCrosswalk,
    strictness: Strictness,
) -> NodeResult<MappedMovements> {
    let mut out = MappedMovements::default();
    let mut unmapped = BTreeSet::new();
    let mut dropped_totals = 0usize;
    let mut excluded = 0usize;

    for movement in movements {
        if movement.direction_unique == TOTAL {
            dropped_totals += 1;
            continue;
        }
        let node = movement.record.node;
        let report_direction = crosswalk
            .report_direction(node, &movement.direction_unique)
            .map(str::to_owned);
        if report_direction.as_deref() == Some(TOTAL) {
            dropped_totals += 1;
            continue;
        }
        if report_direction.is_none() && crosswalk.contains(node, &movement.direction_unique) {
            excluded += 1;
        } else if report_direction.is_none() {
            if strictness.is_strict() {
                return Err(NodeError::UnmappedDirection {
                    node,
                    direction: movement.direction_unique,
                });
            }
            unmapped.insert((node, movement.direction_unique.clone()));
        }
        let approach = report_direction.as_deref().and_then(approach_of);
        out.movements.push(MappedMovement { movement, report_direction, approach });
    }

    for (node, direction) in &unmapped {
        log::warn!("node {node}: direction {direction:?} not in crosswalk, left out of the report");
    }
    log::debug!("dropped {dropped_totals} total rows, {excluded} movements excluded by the crosswalk");
    out.unmapped = unmapped.into_iter().collect();
    Ok(out)
}
