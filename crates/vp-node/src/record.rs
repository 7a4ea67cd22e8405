//! Typed movement rows extracted from a node-results table.

use std::collections::{BTreeMap, BTreeSet};

use serde::Deserialize;

use vp_core::{NodeNo, Table, Value};

use crate::movement::parse_movement;
use crate::{NodeError, NodeResult};

// ── Column names ──────────────────────────────────────────────────────────────

/// Normalized names of the node-results columns the pipeline reads.
///
/// Defaults match the VISSIM 2020 movement evaluation export.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct NodeColumns {
    pub run:             String,
    pub time_interval:   String,
    pub movement:        String,
    pub direction:       String,
    pub from_link_level: String,
    pub queue_len:       String,
    pub queue_len_max:   String,
    pub vehicle_count:   String,
    pub vehicle_delay:   String,
}

impl Default for NodeColumns {
    fn default() -> Self {
        Self {
            run:             "movementevaluation_simrun".into(),
            time_interval:   "timeint".into(),
            movement:        "movement".into(),
            direction:       "movement_direction".into(),
            from_link_level: "movement_fromlink_level".into(),
            queue_len:       "qlen".into(),
            queue_len_max:   "qlenmax".into(),
            vehicle_count:   "vehs_all".into(),
            vehicle_delay:   "vehdelay_all".into(),
        }
    }
}

impl NodeColumns {
    /// Every configured name, in export order.
    pub fn names(&self) -> [&str; 9] {
        [
            &self.run,
            &self.time_interval,
            &self.movement,
            &self.direction,
            &self.from_link_level,
            &self.queue_len,
            &self.queue_len_max,
            &self.vehicle_count,
            &self.vehicle_delay,
        ]
    }
}

// ── Row filter ────────────────────────────────────────────────────────────────

/// Which rows of the export to keep.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RecordFilter {
    /// Simulation run ids (`"AVG"`, `"1"`, …).
    pub keep_runs:          Vec<String>,
    /// From-link levels on the primary geometry.
    pub keep_levels:        Vec<i64>,
    /// Also keep rows whose level cell is empty.
    pub keep_missing_level: bool,
}

impl RecordFilter {
    fn keeps_level(&self, level: Option<i64>) -> bool {
        match level {
            Some(l) => self.keep_levels.contains(&l),
            None => self.keep_missing_level,
        }
    }
}

// ── MovementRecord ────────────────────────────────────────────────────────────

/// One row per (run, time interval, movement).
#[derive(Clone, Debug, PartialEq)]
pub struct MovementRecord {
    pub run_id:             String,
    pub time_interval:      String,
    pub movement_label:     String,
    pub from_link_level:    Option<i64>,
    pub queue_len:          f64,
    pub queue_len_max:      f64,
    pub vehicle_count:      f64,
    pub vehicle_delay:      f64,
    pub node:               NodeNo,
    pub from_link:          String,
    pub to_link:            String,
    /// Simulator-native direction token, e.g. `"N-S"`.
    pub movement_direction: String,
    /// Any further numeric columns retained by the caller, by name.
    pub extra:              BTreeMap<String, f64>,
}

impl MovementRecord {
    /// See [`records_from_table`].
    pub fn from_table(
        table: &Table,
        columns: &NodeColumns,
        filter: &RecordFilter,
    ) -> NodeResult<Vec<MovementRecord>> {
        records_from_table(table, columns, filter)
    }
}

/// Extract typed records from `table`.
///
/// Fails with [`NodeError::RunNotFound`] if none of `filter.keep_runs`
/// occurs in the data at all.
pub fn records_from_table(
    table: &Table,
    columns: &NodeColumns,
    filter: &RecordFilter,
) -> NodeResult<Vec<MovementRecord>> {
    for name in [&columns.run, &columns.time_interval, &columns.movement, &columns.direction] {
        if !table.has_column(name) {
            return Err(NodeError::MissingColumn(name.clone()));
        }
    }

    let col = |name: &str| table.column_index(name);
    let run_col = col(&columns.run).ok_or_else(|| NodeError::MissingColumn(columns.run.clone()))?;

    let runs_present: BTreeSet<String> =
        table.rows().iter().filter_map(|r| r[run_col].as_key()).collect();
    if !filter.keep_runs.iter().any(|r| runs_present.contains(r.trim())) {
        return Err(NodeError::RunNotFound(filter.keep_runs.clone()));
    }

    let known = columns.names();
    let extra_cols: Vec<(String, usize)> = table
        .columns()
        .iter()
        .enumerate()
        .filter(|(_, name)| !known.contains(&name.as_str()))
        .map(|(i, name)| (name.clone(), i))
        .collect();

    let mut records = Vec::new();
    for (i, row) in table.rows().iter().enumerate() {
        let Some(run_id) = row[run_col].as_key() else { continue };
        if !filter.keep_runs.iter().any(|r| r.trim() == run_id) {
            continue;
        }

        let level = match col(&columns.from_link_level).map(|c| &row[c]) {
            None | Some(Value::Empty) => None,
            Some(v) => Some(number(v, i, &columns.from_link_level)? as i64),
        };
        if !filter.keeps_level(level) {
            continue;
        }

        let text = |name: &str| -> String {
            col(name).and_then(|c| row[c].as_key()).unwrap_or_default().trim().to_owned()
        };
        let metric = |name: &str| -> NodeResult<f64> {
            match col(name) {
                Some(c) => number(&row[c], i, name),
                None => Ok(f64::NAN),
            }
        };

        let movement_label = text(&columns.movement);
        let parsed = parse_movement(&movement_label)?;

        let mut extra = BTreeMap::new();
        for (name, c) in &extra_cols {
            if let Some(n) = row[*c].as_f64() {
                extra.insert(name.clone(), n);
            }
        }

        records.push(MovementRecord {
            run_id,
            time_interval:      text(&columns.time_interval),
            movement_label,
            from_link_level:    level,
            queue_len:          metric(&columns.queue_len)?,
            queue_len_max:      metric(&columns.queue_len_max)?,
            vehicle_count:      metric(&columns.vehicle_count)?,
            vehicle_delay:      metric(&columns.vehicle_delay)?,
            node:               parsed.node,
            from_link:          parsed.from_link,
            to_link:            parsed.to_link,
            movement_direction: text(&columns.direction),
            extra,
        });
    }

    log::info!("kept {} of {} node result rows", records.len(), table.len());
    Ok(records)
}

/// Numeric view of a cell; empty cells are `NaN`.
fn number(value: &Value, row: usize, column: &str) -> NodeResult<f64> {
    match value {
        Value::Number(n) => Ok(*n),
        Value::Empty => Ok(f64::NAN),
        Value::Text(s) => Err(NodeError::NotNumeric {
            row,
            column: column.to_owned(),
            value:  s.clone(),
        }),
    }
}
