//! Vehicle network performance summary.

use serde::Deserialize;

use vp_core::{IntervalOrder, IntervalSpec, Table, Value};

use crate::cells::{require, run_matches};
use crate::{SegmentError, SegmentResult};

#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(default)]
pub struct NetworkEvalConfig {
    pub run_column:      String,
    pub interval_column: String,
    pub keep_runs:       Vec<String>,
    /// Normalized column names retained, in output order.
    pub keep_columns:    Vec<String>,
    pub intervals:       IntervalOrder,
}

impl Default for NetworkEvalConfig {
    fn default() -> Self {
        let run_column = "vehiclenetworkperformancemeasurementevaluation_simrun".to_owned();
        let interval_column = "timeint".to_owned();
        let keep_columns = [
            run_column.as_str(),
            interval_column.as_str(),
            "delayavg_all",
            "vehact_all",
            "veharr_all",
            "delaylatent",
            "demandlatent",
        ]
        .iter()
        .map(|s| (*s).to_owned())
        .collect();
        Self {
            run_column,
            interval_column,
            keep_runs: vec!["AVG".to_owned()],
            keep_columns,
            intervals: IntervalOrder::new(vec![
                IntervalSpec::new("2700-6300", "6:00-7:00"),
                IntervalSpec::new("6300-9900", "7:00-8:00"),
                IntervalSpec::new("9900-13500", "8:00-9:00"),
                IntervalSpec::new("13500-14400", "9:00-9:15"),
            ]),
        }
    }
}

/// Keep the configured runs and columns and replace each interval id with
/// its label.  Intervals outside the configured order are blanked; an
/// empty order leaves the ids as they are.
pub fn network_performance(table: &Table, cfg: &NetworkEvalConfig) -> SegmentResult<Table> {
    let run_col = require(table, &cfg.run_column)?;
    if !table.rows().iter().any(|r| run_matches(&r[run_col], &cfg.keep_runs)) {
        return Err(SegmentError::RunNotFound(cfg.keep_runs.clone()));
    }

    let mut out = table
        .filter_rows(|r| run_matches(&r[run_col], &cfg.keep_runs))
        .select(&cfg.keep_columns);
    if !cfg.intervals.is_empty() {
        out.map_column(&cfg.interval_column, |v| {
            v.as_key()
                .and_then(|id| cfg.intervals.label(&id).map(Value::from))
                .unwrap_or_default()
        });
    }
    log::info!("network performance: {} rows", out.len());
    Ok(out)
}
