//! End-to-end node evaluation.
//!
//! ```text
//! Table ─ filter_records ─ deduplicate ─ verify_unique_directions
//!       ─ map_directions ─ intersection_delay / approach_delay
//!       ─ assemble_report_rows ─ format_report ─ WideTable
//! ```
//!
//! Each stage is a free function over the previous stage's output.
//! [`NodeEvalPipeline`] holds only the immutable inputs (configuration,
//! crosswalk, de-duplication rules) and can run any number of tables.

use std::path::Path;

use serde::Deserialize;

use vp_att::{load_att_path, MappingWorkbook};
use vp_core::{IntervalOrder, IntervalSpec, NodeNo, Strictness, Table, WideTable};

use crate::aggregate::{approach_delay, intersection_delay};
use crate::crosswalk::{map_directions, CrosswalkRow, DirectionCrosswalk, CROSSWALK_SHEET};
use crate::dedup::{
    deduplicate, verify_rules_cover_data, verify_unique_directions, DeduplicationRule,
    DeduplicationTable, DEDUP_SHEET,
};
use crate::record::{records_from_table, MovementRecord, NodeColumns, RecordFilter};
use crate::report::{assemble_report_rows, format_report, ReportOrder, ReportRow, LOS_METRIC};
use crate::NodeResult;

// ── Configuration ─────────────────────────────────────────────────────────────

/// Everything the analyst configures for one node evaluation report.
///
/// Every field has a default, so a config file only needs to name what
/// differs from the AM peak report of the base model.
#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(default)]
pub struct NodeEvalConfig {
    pub columns:              NodeColumns,
    /// Further numeric columns (normalized names) to carry into the report.
    pub extra_columns:        Vec<String>,
    pub keep_runs:            Vec<String>,
    pub keep_levels:          Vec<i64>,
    pub keep_missing_level:   bool,
    pub intervals:            IntervalOrder,
    pub directions:           Vec<String>,
    pub metrics:              Vec<String>,
    pub strictness:           Strictness,
    /// Apply the de-duplication sheet.  When off, the sheet is not read.
    pub remove_duplicate_dir: bool,
}

impl Default for NodeEvalConfig {
    fn default() -> Self {
        let columns = NodeColumns::default();
        let metrics = vec![
            columns.queue_len.clone(),
            columns.queue_len_max.clone(),
            columns.vehicle_count.clone(),
            columns.vehicle_delay.clone(),
            LOS_METRIC.to_owned(),
        ];
        Self {
            columns,
            extra_columns: Vec::new(),
            keep_runs: vec!["AVG".to_owned()],
            keep_levels: vec![1],
            keep_missing_level: true,
            intervals: IntervalOrder::new(vec![
                IntervalSpec::new("2700-6300", "6:00-7:00 am"),
                IntervalSpec::new("6300-9900", "7:00-8:00 am"),
                IntervalSpec::new("9900-13500", "8:00-9:00 am"),
                IntervalSpec::new("13500-14400", "9:00-9:15 am"),
            ]),
            directions: DEFAULT_DIRECTION_ORDER.iter().map(|s| (*s).to_owned()).collect(),
            metrics,
            strictness: Strictness::default(),
            remove_duplicate_dir: true,
        }
    }
}

/// Report direction order used when none is configured.
pub const DEFAULT_DIRECTION_ORDER: &[&str] = &[
    "NBR", "NBT", "NBL", "NB",
    "NER", "NET", "NEL", "NE",
    "EBR", "EBT", "EBL", "EB",
    "SER", "SET", "SEL", "SE",
    "SBR", "SBT", "SBL", "SB",
    "SWR", "SWT", "SWL", "SW",
    "WBR", "WBT", "WBL", "WB",
    "NWR", "NWT", "NWL", "NW",
    "Intersection",
];

impl NodeEvalConfig {
    pub fn filter(&self) -> RecordFilter {
        RecordFilter {
            keep_runs:          self.keep_runs.clone(),
            keep_levels:        self.keep_levels.clone(),
            keep_missing_level: self.keep_missing_level,
        }
    }

    pub fn report_order(&self) -> ReportOrder {
        ReportOrder {
            intervals:  self.intervals.clone(),
            directions: self.directions.clone(),
            metrics:    self.metrics.clone(),
        }
    }

    /// Columns retained from the raw export.
    pub fn keep_columns(&self) -> Vec<&str> {
        let mut keep: Vec<&str> = self.columns.names().to_vec();
        keep.extend(self.extra_columns.iter().map(String::as_str));
        keep
    }
}

// ── Output ────────────────────────────────────────────────────────────────────

/// Data-quality findings that did not stop the run.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Diagnostics {
    /// De-duplication rules that match nothing in the data.
    pub unmatched_rules:     Vec<DeduplicationRule>,
    /// `(node, direction_unique)` pairs missing from the crosswalk.
    pub unmapped_directions: Vec<(NodeNo, String)>,
}

impl Diagnostics {
    pub fn is_clean(&self) -> bool {
        self.unmatched_rules.is_empty() && self.unmapped_directions.is_empty()
    }
}

#[derive(Clone, Debug)]
pub struct NodeEvalOutput {
    pub wide:        WideTable,
    pub long_rows:   Vec<ReportRow>,
    pub diagnostics: Diagnostics,
}

// ── Pipeline ──────────────────────────────────────────────────────────────────

pub struct NodeEvalPipeline {
    config:    NodeEvalConfig,
    crosswalk: DirectionCrosswalk,
    rules:     DeduplicationTable,
}

impl NodeEvalPipeline {
    pub fn new(config: NodeEvalConfig, crosswalk: DirectionCrosswalk, rules: DeduplicationTable) -> Self {
        Self { config, crosswalk, rules }
    }

    /// Read the crosswalk and (if enabled) the de-duplication rules from
    /// `workbook`.
    pub fn from_workbook(config: NodeEvalConfig, workbook: &MappingWorkbook) -> NodeResult<Self> {
        let crosswalk = DirectionCrosswalk::new(workbook.sheet::<CrosswalkRow>(CROSSWALK_SHEET)?);
        let rules = if config.remove_duplicate_dir {
            DeduplicationTable::new(workbook.sheet::<DeduplicationRule>(DEDUP_SHEET)?)
        } else {
            DeduplicationTable::default()
        };
        Ok(Self::new(config, crosswalk, rules))
    }

    pub fn config(&self) -> &NodeEvalConfig {
        &self.config
    }

    /// Load a node results `.att` file and run it.
    pub fn run_path(&self, path: &Path) -> NodeResult<NodeEvalOutput> {
        let table = load_att_path(path, self.config.strictness)?;
        self.run(&table)
    }

    pub fn run(&self, table: &Table) -> NodeResult<NodeEvalOutput> {
        let cfg = &self.config;

        let records = filter_records(table, cfg)?;
        let unmatched_rules = verify_rules_cover_data(&records, &self.rules)
            .into_iter()
            .cloned()
            .collect();

        let unique = deduplicate(records, &self.rules);
        verify_unique_directions(&unique)?;
        log::info!("no duplicate direction within any node");

        let mapped = map_directions(unique, &self.crosswalk, cfg.strictness)?;

        let mut aggregates = intersection_delay(&mapped.movements, cfg.strictness)?;
        aggregates.extend(approach_delay(&mapped.movements, cfg.strictness)?);

        let long_rows = assemble_report_rows(
            &mapped.movements,
            &aggregates,
            &self.crosswalk,
            &cfg.columns,
            cfg.strictness,
        )?;
        let wide = format_report(&long_rows, &cfg.report_order())?;
        log::info!("node report: {} rows x {} columns", wide.rows.len(), wide.groups.len() * wide.metrics.len());

        Ok(NodeEvalOutput {
            wide,
            long_rows,
            diagnostics: Diagnostics { unmatched_rules, unmapped_directions: mapped.unmapped },
        })
    }
}

/// Retain the configured columns and rows and type them.
pub fn filter_records(table: &Table, cfg: &NodeEvalConfig) -> NodeResult<Vec<MovementRecord>> {
    let kept = table.select(&cfg.keep_columns());
    records_from_table(&kept, &cfg.columns, &cfg.filter())
}
