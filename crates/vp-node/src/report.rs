//! Long-form report rows and the pivoted report table.

use std::collections::BTreeSet;

use vp_core::{ControlType, IntervalOrder, NodeNo, PivotBuilder, Strictness, Value, WideTable};

use crate::aggregate::AggregatedDelay;
use crate::crosswalk::{DirectionCrosswalk, MappedMovement};
use crate::record::NodeColumns;
use crate::{NodeError, NodeResult};

/// Metric name of the LOS grade.
pub const LOS_METRIC: &str = "los";

/// Row-index level names of the pivoted report.
pub const INDEX_NAMES: [&str; 6] = ["run", "node", "approach", "direction", "from_link", "to_link"];

/// One `(row, interval, metric)` value.
#[derive(Clone, Debug, PartialEq)]
pub struct ReportRow {
    pub run_id:           String,
    pub node:             NodeNo,
    pub approach:         Option<String>,
    pub report_direction: Option<String>,
    pub from_link:        String,
    pub to_link:          String,
    pub time_interval:    String,
    pub metric:           String,
    pub value:            Value,
}

/// Resolves the LOS grade of a delay at a node, applying the strictness
/// policy to nodes without a usable control type.
struct Grader<'a> {
    crosswalk:  &'a DirectionCrosswalk,
    strictness: Strictness,
    warned:     BTreeSet<NodeNo>,
}

impl Grader<'_> {
    fn grade(&mut self, node: NodeNo, delay: f64) -> NodeResult<Value> {
        let node_type = self.crosswalk.node_type(node).unwrap_or("");
        match node_type.parse::<ControlType>() {
            Ok(control) => Ok(control.classify(delay).map_or(Value::Empty, |g| g.as_str().into())),
            Err(_) if self.strictness.is_strict() => Err(NodeError::UnknownControlType {
                node,
                node_type: node_type.to_owned(),
            }),
            Err(_) => {
                if self.warned.insert(node) {
                    log::warn!("node {node}: unknown control type {node_type:?}, LOS left blank");
                }
                Ok(Value::Empty)
            }
        }
    }
}

/// Union per-movement rows with the intersection and approach aggregates
/// and grade every delay.
///
/// Movement rows carry the queue, volume and delay metrics plus any extra
/// numeric columns.  Aggregate rows carry delay only.  Every row gets a
/// `los` entry.
pub fn assemble_report_rows(
    movements: &[MappedMovement],
    aggregates: &[AggregatedDelay],
    crosswalk: &DirectionCrosswalk,
    columns: &NodeColumns,
    strictness: Strictness,
) -> NodeResult<Vec<ReportRow>> {
    let mut grader = Grader { crosswalk, strictness, warned: BTreeSet::new() };
    let mut rows = Vec::new();

    for m in movements {
        let r = &m.movement.record;
        let mut push = |metric: &str, value: Value| {
            rows.push(ReportRow {
                run_id:           r.run_id.clone(),
                node:             r.node,
                approach:         m.approach.clone(),
                report_direction: m.report_direction.clone(),
                from_link:        r.from_link.clone(),
                to_link:          r.to_link.clone(),
                time_interval:    r.time_interval.clone(),
                metric:           metric.to_owned(),
                value,
            });
        };
        push(&columns.queue_len, r.queue_len.into());
        push(&columns.queue_len_max, r.queue_len_max.into());
        push(&columns.vehicle_count, r.vehicle_count.into());
        push(&columns.vehicle_delay, r.vehicle_delay.into());
        for (name, value) in &r.extra {
            push(name, (*value).into());
        }
        // unmapped movements never reach the report, so they are not graded
        let grade = if m.report_direction.is_some() {
            grader.grade(r.node, r.vehicle_delay)?
        } else {
            Value::Empty
        };
        push(LOS_METRIC, grade);
    }

    for a in aggregates {
        let base = ReportRow {
            run_id:           a.run_id.clone(),
            node:             a.node,
            approach:         a.approach.clone(),
            report_direction: Some(a.report_direction.clone()),
            from_link:        String::new(),
            to_link:          String::new(),
            time_interval:    a.time_interval.clone(),
            metric:           columns.vehicle_delay.clone(),
            value:            a.delay.into(),
        };
        let grade = grader.grade(a.node, a.delay)?;
        rows.push(ReportRow { metric: LOS_METRIC.to_owned(), value: grade, ..base.clone() });
        rows.push(base);
    }

    Ok(rows)
}

// ── Pivot ─────────────────────────────────────────────────────────────────────

/// Analyst-specified report layout.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ReportOrder {
    pub intervals:  IntervalOrder,
    /// Report directions in display order.  Directions not listed sort
    /// after all listed ones.
    pub directions: Vec<String>,
    /// Metric columns shown per interval.
    pub metrics:    Vec<String>,
}

impl ReportOrder {
    fn direction_rank(&self, direction: &str) -> usize {
        self.directions
            .iter()
            .position(|d| d == direction)
            .unwrap_or(self.directions.len())
    }
}

#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord)]
struct RowKey {
    run:       String,
    node:      NodeNo,
    // (is_missing, code): missing approaches sort last
    approach:  (bool, String),
    direction: (usize, String),
    from_link: String,
    to_link:   String,
}

/// Pivot long rows into the report table.
///
/// Rows without a non-blank report direction and rows whose interval is not
/// part of `order` are left out.  Columns are every interval label × every metric,
/// whether populated or not.
pub fn format_report(rows: &[ReportRow], order: &ReportOrder) -> NodeResult<WideTable> {
    let mut pivot: PivotBuilder<RowKey> = PivotBuilder::new(order.intervals.labels(), order.metrics.clone());
    let mut skipped_intervals = BTreeSet::new();

    for row in rows {
        let Some(direction) = row.report_direction.as_deref().map(str::trim).filter(|d| !d.is_empty())
        else {
            continue;
        };
        let Some(label) = order.intervals.label(&row.time_interval) else {
            skipped_intervals.insert(row.time_interval.as_str());
            continue;
        };
        let key = RowKey {
            run:       row.run_id.clone(),
            node:      row.node,
            approach:  (row.approach.is_none(), row.approach.clone().unwrap_or_default()),
            direction: (order.direction_rank(direction), direction.to_owned()),
            from_link: row.from_link.clone(),
            to_link:   row.to_link.clone(),
        };
        pivot.insert(key, label, &row.metric, row.value.clone())?;
    }

    for interval in skipped_intervals {
        log::debug!("interval {interval:?} is not in the report order, rows skipped");
    }

    let index_names = INDEX_NAMES.iter().map(|s| (*s).to_owned()).collect();
    Ok(pivot.finish(index_names, |k| {
        vec![
            k.run.clone(),
            k.node.to_string(),
            k.approach.1.clone(),
            k.direction.1.clone(),
            k.from_link.clone(),
            k.to_link.clone(),
        ]
    }))
}
