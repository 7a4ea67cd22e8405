//! Link segment evaluation binned along each corridor.
//!
//! VISSIM names a link evaluation segment `"<link>-<start>-<end>"`, with
//! positions in feet from the start of the link.  The analyst's link
//! mapper places links on corridors (`direction`) in driving `order`.
//! Segments are then grouped into right-closed bins of their end position,
//! `(0, 1000]`, `(1000, 2000]`, …, per corridor link.

use std::collections::{BTreeMap, HashMap};
use std::str::FromStr;

use serde::Deserialize;

use vp_core::{IntervalOrder, LinkNo, Table, Value};

use crate::cells::{number, require, run_matches};
use crate::stats::mean;
use crate::{SegmentError, SegmentResult};

/// Sheet holding the link mapper.
pub const LINK_MAPPER_SHEET: &str = "link_seg_mapping";

/// A parsed segment label.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct SegmentLabel {
    pub link:  LinkNo,
    pub start: u32,
    pub end:   u32,
}

impl SegmentLabel {
    pub fn len(&self) -> u32 {
        self.end.saturating_sub(self.start)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl FromStr for SegmentLabel {
    type Err = SegmentError;

    fn from_str(s: &str) -> SegmentResult<Self> {
        let bad = || SegmentError::MalformedSegment(s.to_owned());
        let parts: Vec<&str> = s.trim().split('-').collect();
        let [link, start, end] = parts.as_slice() else { return Err(bad()) };
        Ok(SegmentLabel {
            link:  link.parse().map_err(|_| bad())?,
            start: start.trim().parse().map_err(|_| bad())?,
            end:   end.trim().parse().map_err(|_| bad())?,
        })
    }
}

/// One row of the link mapper sheet.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
pub struct LinkMapping {
    pub link:      LinkNo,
    pub direction: String,
    pub order:     i64,
}

#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(default)]
pub struct LinkSegmentConfig {
    pub run_column:      String,
    pub interval_column: String,
    pub segment_column:  String,
    pub speed_column:    String,
    pub density_column:  String,
    pub keep_runs:       Vec<String>,
    /// When empty every interval is kept under its bucket id.
    pub intervals:       IntervalOrder,
    pub bin_width_ft:    u32,
}

impl Default for LinkSegmentConfig {
    fn default() -> Self {
        Self {
            run_column:      "linkevalsegmentevaluation_simrun".into(),
            interval_column: "timeint".into(),
            segment_column:  "linkevalsegment".into(),
            speed_column:    "speed_1020".into(),
            density_column:  "density_1020".into(),
            keep_runs:       vec!["1".into()],
            intervals:       IntervalOrder::default(),
            bin_width_ft:    1000,
        }
    }
}

/// Index of the right-closed bin `(k·w, (k+1)·w]` holding `end`.  A
/// segment ending at 0 is in no bin.
pub fn bin_of(end: u32, width: u32) -> Option<u32> {
    if end == 0 || width == 0 {
        return None;
    }
    Some((end - 1) / width)
}

/// Aggregated segments of one corridor link within one distance bin.
#[derive(Clone, Debug, PartialEq)]
pub struct LinkSegmentBin {
    pub run_id:      String,
    pub interval:    String,
    pub direction:   String,
    pub order:       i64,
    /// `(bin_start, bin_end]` in feet.
    pub bin_start:   u32,
    pub bin_end:     u32,
    /// Link of the first segment in the bin.
    pub link:        LinkNo,
    pub subseg_len:  u32,
    pub avg_speed:   f64,
    pub avg_density: f64,
}

#[derive(Default)]
struct BinAcc {
    first:     Option<(u32, LinkNo)>,
    len:       u32,
    speeds:    Vec<f64>,
    densities: Vec<f64>,
}

/// Bin the link segment results of the mapped links.
pub fn link_segment_bins(
    table: &Table,
    mapping: &[LinkMapping],
    cfg: &LinkSegmentConfig,
) -> SegmentResult<Vec<LinkSegmentBin>> {
    let run_col = require(table, &cfg.run_column)?;
    let int_col = require(table, &cfg.interval_column)?;
    let seg_col = require(table, &cfg.segment_column)?;
    let speed_col = require(table, &cfg.speed_column)?;
    let density_col = require(table, &cfg.density_column)?;

    let mut corridors: HashMap<LinkNo, Vec<&LinkMapping>> = HashMap::new();
    for m in mapping {
        corridors.entry(m.link).or_default().push(m);
    }

    type Key = (String, usize, String, String, i64, u32);
    let mut groups: BTreeMap<Key, BinAcc> = BTreeMap::new();
    let mut seen_run = false;

    for (i, row) in table.rows().iter().enumerate() {
        if !run_matches(&row[run_col], &cfg.keep_runs) {
            continue;
        }
        seen_run = true;

        let raw_label = row[seg_col].as_key().unwrap_or_default();
        let label: SegmentLabel = raw_label.parse()?;
        let Some(targets) = corridors.get(&label.link) else { continue };

        let interval_id = row[int_col].as_key().unwrap_or_default();
        let (rank, interval) = if cfg.intervals.is_empty() {
            (0, interval_id)
        } else {
            match (cfg.intervals.rank(&interval_id), cfg.intervals.label(&interval_id)) {
                (Some(r), Some(l)) => (r, l.to_owned()),
                _ => continue,
            }
        };
        let Some(bin) = bin_of(label.end, cfg.bin_width_ft) else { continue };
        let run_id = row[run_col].as_key().unwrap_or_default();
        let speed = number(&row[speed_col], i, &cfg.speed_column)?;
        let density = number(&row[density_col], i, &cfg.density_column)?;

        for target in targets {
            let key = (run_id.clone(), rank, interval.clone(), target.direction.clone(), target.order, bin);
            let acc = groups.entry(key).or_default();
            if acc.first.is_none_or(|(start, _)| label.start < start) {
                acc.first = Some((label.start, label.link));
            }
            acc.len += label.len();
            acc.speeds.push(speed);
            acc.densities.push(density);
        }
    }

    if !seen_run {
        return Err(SegmentError::RunNotFound(cfg.keep_runs.clone()));
    }

    let width = cfg.bin_width_ft;
    let bins: Vec<LinkSegmentBin> = groups
        .into_iter()
        .filter_map(|((run_id, _, interval, direction, order, bin), acc)| {
            let (_, link) = acc.first?;
            let avg_speed = mean(&acc.speeds);
            let avg_density = mean(&acc.densities);
            if avg_speed.is_nan() || avg_density.is_nan() {
                return None;
            }
            Some(LinkSegmentBin {
                run_id,
                interval,
                direction,
                order,
                bin_start: bin * width,
                bin_end: (bin + 1) * width,
                link,
                subseg_len: acc.len,
                avg_speed,
                avg_density,
            })
        })
        .collect();
    log::info!("link segments: {} bins", bins.len());
    Ok(bins)
}

/// Flatten bins into a table for output.
pub fn link_segment_table(bins: &[LinkSegmentBin]) -> SegmentResult<Table> {
    let columns = [
        "run", "timeint", "direction", "order", "bin_ft", "link", "subseg_len", "avg_speed", "avg_density",
    ];
    let mut table = Table::new(columns.iter().map(|c| (*c).to_owned()).collect());
    for b in bins {
        let row = vec![
            Value::from(b.run_id.as_str()),
            Value::from(b.interval.as_str()),
            Value::from(b.direction.as_str()),
            Value::Number(b.order as f64),
            Value::Text(format!("({}, {}]", b.bin_start, b.bin_end)),
            Value::Number(f64::from(b.link.0)),
            Value::Number(f64::from(b.subseg_len)),
            Value::Number(b.avg_speed),
            Value::Number(b.avg_density),
        ];
        table.push_row(row)?;
    }
    Ok(table)
}
