//! Bus headway statistics.
//!
//! Headway is the gap in completion `time` between successive vehicles of
//! the same class on the same segment within one run.  Gaps are pooled
//! over runs and summarized per report interval of the later vehicle.

use std::collections::BTreeMap;

use vp_core::{Table, Value};

use crate::stats::{max, mean, min, quantile, std_dev};
use crate::travel_time::{SegmentLayout, TravelTimeConfig, TravelTimeRecord};
use crate::SegmentResult;

/// Sheet holding the bus headway segment mapper.
pub const HEADWAY_MAPPER_SHEET: &str = "bus_headway_mapping";

#[derive(Clone, Debug, PartialEq)]
pub struct HeadwayStats {
    pub direction:    String,
    pub segment_name: String,
    pub class:        String,
    pub interval:     String,
    pub samples:      usize,
    pub avg:          f64,
    pub min:          f64,
    pub q50:          f64,
    pub q95:          f64,
    pub max:          f64,
    pub std_dev:      f64,
    /// `std_dev / avg`.
    pub coeff_var:    f64,
}

/// Headway statistics per `(direction, segment, class, interval)`.
///
/// Groups with fewer than two headways have no standard deviation and are
/// left out.
pub fn headway_stats(
    records: &[TravelTimeRecord],
    layout: &SegmentLayout,
    cfg: &TravelTimeConfig,
) -> Vec<HeadwayStats> {
    // (run, direction rank, name rank, class) → (time, interval) in arrival order
    type Stream = (u32, usize, usize, usize);
    let mut streams: BTreeMap<Stream, Vec<(f64, Option<usize>)>> = BTreeMap::new();
    let mut names: BTreeMap<(usize, usize), (String, String)> = BTreeMap::new();

    for r in records {
        if r.time.is_nan() {
            continue;
        }
        for m in layout.rows_of(r.segment) {
            let d = layout.direction_rank(&m.direction);
            let n = layout.name_rank(&m.tt_seg_name);
            names.entry((d, n)).or_insert_with(|| (m.direction.clone(), m.tt_seg_name.clone()));
            for class in cfg.classes_of(r.vehicle_type) {
                streams.entry((r.run_no, d, n, class)).or_default().push((r.time, r.interval));
            }
        }
    }

    let mut pooled: BTreeMap<(usize, usize, usize, usize), Vec<f64>> = BTreeMap::new();
    for ((_, d, n, class), mut stream) in streams {
        stream.sort_by(|a, b| a.0.total_cmp(&b.0));
        for pair in stream.windows(2) {
            let (prev, (time, interval)) = (pair[0].0, pair[1]);
            let Some(interval) = interval else { continue };
            pooled.entry((d, n, class, interval)).or_default().push(time - prev);
        }
    }

    let specs = cfg.intervals.specs();
    let stats: Vec<HeadwayStats> = pooled
        .into_iter()
        .filter_map(|((d, n, class, interval), gaps)| {
            let avg = mean(&gaps);
            let sd = std_dev(&gaps);
            let cv = sd / avg;
            if sd.is_nan() || cv.is_nan() {
                return None;
            }
            let (direction, segment_name) = names.get(&(d, n))?.clone();
            Some(HeadwayStats {
                direction,
                segment_name,
                class: cfg.classes[class].name.clone(),
                interval: specs.get(interval).map(|s| s.label().to_owned()).unwrap_or_default(),
                samples: gaps.len(),
                avg,
                min: min(&gaps),
                q50: quantile(&gaps, 0.5),
                q95: quantile(&gaps, 0.95),
                max: max(&gaps),
                std_dev: sd,
                coeff_var: cv,
            })
        })
        .collect();
    log::info!("bus headway: {} groups", stats.len());
    stats
}

/// Flatten headway statistics into a table for output.
pub fn headway_table(stats: &[HeadwayStats]) -> SegmentResult<Table> {
    let columns = [
        "direction", "tt_seg_name", "veh_cls_res", "timeint", "samples", "avg_headway", "min_headway",
        "q50_headway", "q95_headway", "max_headway", "std_dev_headway", "coeff_var_headway",
    ];
    let mut table = Table::new(columns.iter().map(|c| (*c).to_owned()).collect());
    for s in stats {
        table.push_row(vec![
            Value::from(s.direction.as_str()),
            Value::from(s.segment_name.as_str()),
            Value::from(s.class.as_str()),
            Value::from(s.interval.as_str()),
            Value::Number(s.samples as f64),
            Value::Number(s.avg),
            Value::Number(s.min),
            Value::Number(s.q50),
            Value::Number(s.q95),
            Value::Number(s.max),
            Value::Number(s.std_dev),
            Value::Number(s.coeff_var),
        ])?;
    }
    Ok(table)
}
