//! Vehicle-weighted delay per node and per approach.

use std::collections::BTreeMap;

use vp_core::{NodeNo, Strictness};

use crate::crosswalk::MappedMovement;
use crate::{NodeError, NodeResult};

/// Report direction of node-level aggregates.
pub const INTERSECTION: &str = "Intersection";

/// A weighted mean delay for one group.
#[derive(Clone, Debug, PartialEq)]
pub struct AggregatedDelay {
    pub run_id:           String,
    pub time_interval:    String,
    pub node:             NodeNo,
    /// `None` for the intersection aggregate.
    pub approach:         Option<String>,
    /// `"Intersection"` or the approach code.
    pub report_direction: String,
    /// `NaN` when the group carried no vehicles.
    pub delay:            f64,
    pub vehicle_count:    f64,
}

type GroupKey = (String, String, NodeNo, Option<String>);

#[derive(Default)]
struct Weighted {
    weighted_sum: f64,
    count:        f64,
}

impl Weighted {
    fn add(&mut self, count: f64, delay: f64) {
        if count.is_nan() || delay.is_nan() {
            return;
        }
        self.weighted_sum += count * delay;
        self.count += count;
    }
}

fn aggregate<'a, I>(groups: I, strictness: Strictness) -> NodeResult<Vec<AggregatedDelay>>
where
    I: Iterator<Item = (GroupKey, &'a MappedMovement)>,
{
    let mut acc: BTreeMap<GroupKey, Weighted> = BTreeMap::new();
    for (key, m) in groups {
        let r = &m.movement.record;
        acc.entry(key).or_default().add(r.vehicle_count, r.vehicle_delay);
    }

    let mut out = Vec::with_capacity(acc.len());
    for ((run_id, time_interval, node, approach), w) in acc {
        let delay = if w.count == 0.0 {
            if strictness.is_strict() {
                return Err(NodeError::ZeroVolume { run: run_id, interval: time_interval, node, approach });
            }
            log::warn!(
                "zero vehicles at node {node} (run {run_id}, interval {time_interval}{}); delay left undefined",
                approach.as_deref().map(|a| format!(", approach {a}")).unwrap_or_default(),
            );
            f64::NAN
        } else {
            w.weighted_sum / w.count
        };
        let report_direction = approach.clone().unwrap_or_else(|| INTERSECTION.to_owned());
        out.push(AggregatedDelay {
            run_id,
            time_interval,
            node,
            approach,
            report_direction,
            delay,
            vehicle_count: w.count,
        });
    }
    Ok(out)
}

/// Weighted delay per `(run, interval, node)` over every movement, mapped
/// or not.
pub fn intersection_delay(
    movements: &[MappedMovement],
    strictness: Strictness,
) -> NodeResult<Vec<AggregatedDelay>> {
    let groups = movements.iter().map(|m| {
        let r = &m.movement.record;
        ((r.run_id.clone(), r.time_interval.clone(), r.node, None), m)
    });
    aggregate(groups, strictness)
}

/// Weighted delay per `(run, interval, node, approach)` over mapped
/// movements.
pub fn approach_delay(
    movements: &[MappedMovement],
    strictness: Strictness,
) -> NodeResult<Vec<AggregatedDelay>> {
    let groups = movements.iter().filter_map(|m| {
        let approach = m.approach.clone()?;
        let r = &m.movement.record;
        Some(((r.run_id.clone(), r.time_interval.clone(), r.node, Some(approach)), m))
    });
    aggregate(groups, strictness)
}
