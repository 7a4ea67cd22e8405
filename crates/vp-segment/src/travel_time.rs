//! Vehicle travel-time segments from raw `.rsr` records.
//!
//! Each run writes one `.rsr` file with a record per vehicle that
//! completed a travel-time segment.  Records are bucketed into report
//! intervals by completion `time`, summarized per run, then averaged over
//! runs for the scenario table:
//!
//! ```text
//! .rsr (run 1..n) ─ records ─ summarize_runs ─ aggregate_scenario ─ travel_time_report
//!                      │
//! .mer (run 1..n) ─ assign_persons      (only with an occupancy config)
//! ```
//!
//! With occupancy configured every record carries a person count, and the
//! summaries gain total persons, total person delay and average person
//! delay.

use std::collections::{BTreeMap, HashMap};
use std::path::{Path, PathBuf};

use serde::Deserialize;

use vp_att::{load_rsr_path, MappingWorkbook};
use vp_core::{IntervalOrder, IntervalSpec, PivotBuilder, SegmentNo, Table, TimeInterval, Value, WideTable};

use crate::cells::{number, require};
use crate::occupancy::{assign_persons, load_transit_occupancy, OccupancyConfig};
use crate::stats::{mean, quantile, round_to};
use crate::{SegmentError, SegmentResult};

/// Sheet holding the travel-time segment mapper.
pub const TT_MAPPER_SHEET: &str = "tt_seg_mapping";

pub const FEET_PER_METRE: f64 = 3.28084;
/// Feet per second in one mile per hour, as used in the reports.
pub const FPS_PER_MPH: f64 = 1.47;

// ── Inputs ────────────────────────────────────────────────────────────────────

/// One row of the travel-time mapper sheet.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
pub struct TravelTimeMapping {
    pub tt_seg_no:   SegmentNo,
    pub tt_seg_name: String,
    pub direction:   String,
    pub sort_order:  i64,
}

/// A report vehicle class and the VISSIM vehicle types it covers.  A type
/// may belong to several classes.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
pub struct VehicleClass {
    pub name:  String,
    pub types: Vec<u32>,
}

impl VehicleClass {
    pub fn new(name: &str, types: &[u32]) -> Self {
        Self { name: name.to_owned(), types: types.to_vec() }
    }
}

#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(default)]
pub struct TravelTimeConfig {
    /// Segments to report.  Empty keeps every segment.
    pub keep_segments: Vec<SegmentNo>,
    pub intervals:     IntervalOrder,
    pub classes:       Vec<VehicleClass>,
    /// Metric columns of the report, per vehicle class.
    pub results:       Vec<String>,
    /// Person delay inputs.  `None` reports vehicle metrics only.
    pub occupancy:     Option<OccupancyConfig>,
}

impl Default for TravelTimeConfig {
    fn default() -> Self {
        let ids = [
            "2700-3600", "3600-4500", "4500-5400", "5400-6300", "6300-7200", "7200-8100", "8100-9000",
            "9000-9900", "9900-10800", "10800-11700", "11700-12600", "12600-13500", "13500-14400",
        ];
        let labels = [
            "6:00-6:15", "6:15-6:30", "6:30-6:45", "6:45-7:00", "7:00-7:15", "7:15-7:30", "7:30-7:45",
            "7:45-8:00", "8:00-8:15", "8:15-8:30", "8:30-8:45", "8:45-9:00", "9:00-9:15",
        ];
        Self {
            keep_segments: [1, 23, 4, 20, 24, 21, 11, 12, 13, 25].into_iter().map(SegmentNo).collect(),
            intervals:     IntervalOrder::new(
                ids.iter().zip(labels).map(|(id, label)| IntervalSpec::new(id, label)).collect(),
            ),
            classes:       vec![
                VehicleClass::new("car_hgv_bus", &[100, 200, 300, 301, 302, 303, 304, 305]),
                VehicleClass::new("car_hgv", &[100, 200]),
                VehicleClass::new("bus", &[300, 301, 302, 303, 304, 305]),
            ],
            results:       ["avg_trav", "avg_speed", "q95_trav", "avg_veh_delay", "tot_veh", "avg_dist_ft"]
                .iter()
                .map(|s| (*s).to_owned())
                .collect(),
            occupancy:     None,
        }
    }
}

impl TravelTimeConfig {
    /// Indices into `classes` of every class covering `vehicle_type`.
    pub fn classes_of(&self, vehicle_type: u32) -> impl Iterator<Item = usize> + '_ {
        self.classes
            .iter()
            .enumerate()
            .filter(move |(_, c)| c.types.contains(&vehicle_type))
            .map(|(i, _)| i)
    }
}

// ── Records ───────────────────────────────────────────────────────────────────

/// One vehicle crossing one travel-time segment.
#[derive(Clone, Debug, PartialEq)]
pub struct TravelTimeRecord {
    pub run_no:       u32,
    /// Completion time, simulation seconds.
    pub time:         f64,
    pub segment:      SegmentNo,
    pub vehicle:      u64,
    pub vehicle_type: u32,
    pub travel_time:  f64,
    pub delay:        f64,
    pub dist_ft:      f64,
    /// Index into the configured interval order; `None` outside all of them.
    pub interval:     Option<usize>,
    /// Vehicle occupancy, once assigned.
    pub persons:      Option<f64>,
}

/// Run number encoded as the trailing `_<n>` of an `.rsr` file stem.
pub fn run_number(path: &Path) -> SegmentResult<u32> {
    let bad = || SegmentError::RunNumber(path.to_path_buf());
    let stem = path.file_stem().and_then(|s| s.to_str()).ok_or_else(bad)?;
    let (_, n) = stem.rsplit_once('_').ok_or_else(bad)?;
    n.trim().parse().map_err(|_| bad())
}

fn whole(value: &Value, row: usize, column: &str) -> SegmentResult<u64> {
    let n = number(value, row, column)?;
    if !n.is_finite() || n < 0.0 {
        return Err(SegmentError::NotNumeric { row, column: column.to_owned(), value: value.to_string() });
    }
    Ok(n as u64)
}

/// Type the rows of one `.rsr` table.
pub fn records_from_rsr(
    table: &Table,
    run_no: u32,
    bounds: &[TimeInterval],
    cfg: &TravelTimeConfig,
) -> SegmentResult<Vec<TravelTimeRecord>> {
    let [time, no, veh, veh_type, trav, delay, dist] =
        ["time", "no", "veh", "veh_type", "trav", "delay", "dist"];
    let c_time = require(table, time)?;
    let c_no = require(table, no)?;
    let c_veh = require(table, veh)?;
    let c_type = require(table, veh_type)?;
    let c_trav = require(table, trav)?;
    let c_delay = require(table, delay)?;
    let c_dist = require(table, dist)?;

    let mut out = Vec::with_capacity(table.len());
    for (i, row) in table.rows().iter().enumerate() {
        let segment = SegmentNo(whole(&row[c_no], i, no)? as u32);
        if !cfg.keep_segments.is_empty() && !cfg.keep_segments.contains(&segment) {
            continue;
        }
        let t = number(&row[c_time], i, time)?;
        out.push(TravelTimeRecord {
            run_no,
            time: t,
            segment,
            vehicle: whole(&row[c_veh], i, veh)?,
            vehicle_type: whole(&row[c_type], i, veh_type)? as u32,
            travel_time: number(&row[c_trav], i, trav)?,
            delay: number(&row[c_delay], i, delay)?,
            dist_ft: number(&row[c_dist], i, dist)? * FEET_PER_METRE,
            interval: IntervalOrder::bucket_of(bounds, t),
            persons: None,
        });
    }
    Ok(out)
}

/// Load and type every run file.  Files are read one after another.
pub fn load_runs(paths: &[PathBuf], cfg: &TravelTimeConfig) -> SegmentResult<Vec<TravelTimeRecord>> {
    let bounds = cfg.intervals.bounds()?;
    let mut records = Vec::new();
    for path in paths {
        let run_no = run_number(path)?;
        let table = load_rsr_path(path)?;
        let run = records_from_rsr(&table, run_no, &bounds, cfg)?;
        log::debug!("run {run_no}: {} records on reported segments", run.len());
        records.extend(run);
    }
    log::info!("travel time: {} records from {} runs", records.len(), paths.len());
    Ok(records)
}

// ── Per-run summary ───────────────────────────────────────────────────────────

/// Person metrics of a group of records.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PersonDelay {
    pub tot_pers:       f64,
    pub tot_pers_delay: f64,
    /// `tot_pers_delay / tot_pers`.
    pub avg_pers_delay: f64,
}

impl PersonDelay {
    /// `None` unless every record has a person count.
    fn of(records: &[&TravelTimeRecord]) -> Option<Self> {
        let persons: Vec<f64> = records.iter().map(|r| r.persons).collect::<Option<_>>()?;
        let tot_pers: f64 = persons.iter().sum();
        let tot_pers_delay: f64 = records.iter().zip(&persons).map(|(r, p)| p * r.delay).sum();
        Some(Self { tot_pers, tot_pers_delay, avg_pers_delay: tot_pers_delay / tot_pers })
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct RunSummary {
    pub run_no:        u32,
    pub interval:      usize,
    pub segment:       SegmentNo,
    /// Index into the configured classes.
    pub class:         usize,
    pub avg_veh_delay: f64,
    pub avg_trav:      f64,
    pub q95_trav:      f64,
    pub avg_dist_ft:   f64,
    pub tot_veh:       f64,
    pub persons:       Option<PersonDelay>,
}

/// Summarize each `(run, interval, segment, class)`.  Records outside every
/// interval, or of a type in no class, are not counted.
pub fn summarize_runs(records: &[TravelTimeRecord], cfg: &TravelTimeConfig) -> Vec<RunSummary> {
    let mut groups: BTreeMap<(u32, usize, SegmentNo, usize), Vec<&TravelTimeRecord>> = BTreeMap::new();
    for r in records {
        let Some(interval) = r.interval else { continue };
        for class in cfg.classes_of(r.vehicle_type) {
            groups.entry((r.run_no, interval, r.segment, class)).or_default().push(r);
        }
    }

    groups
        .into_iter()
        .map(|((run_no, interval, segment, class), rs)| {
            let trav: Vec<f64> = rs.iter().map(|r| r.travel_time).collect();
            let delay: Vec<f64> = rs.iter().map(|r| r.delay).collect();
            let dist: Vec<f64> = rs.iter().map(|r| r.dist_ft).collect();
            RunSummary {
                run_no,
                interval,
                segment,
                class,
                avg_veh_delay: mean(&delay),
                avg_trav: mean(&trav),
                q95_trav: quantile(&trav, 0.95),
                avg_dist_ft: mean(&dist),
                tot_veh: rs.len() as f64,
                persons: PersonDelay::of(&rs),
            }
        })
        .collect()
}

// ── Scenario aggregate ────────────────────────────────────────────────────────

/// Segment mapper sorted by `(direction, sort_order)`, with direction and
/// segment-name ranks for report ordering.
#[derive(Clone, Debug)]
pub struct SegmentLayout {
    rows:       Vec<TravelTimeMapping>,
    by_segment: HashMap<SegmentNo, Vec<usize>>,
    directions: Vec<String>,
}

impl SegmentLayout {
    pub fn new(mut rows: Vec<TravelTimeMapping>) -> Self {
        rows.sort_by(|a, b| (&a.direction, a.sort_order).cmp(&(&b.direction, b.sort_order)));
        let mut by_segment: HashMap<SegmentNo, Vec<usize>> = HashMap::new();
        let mut directions: Vec<String> = Vec::new();
        for (i, r) in rows.iter().enumerate() {
            by_segment.entry(r.tt_seg_no).or_default().push(i);
            if !directions.contains(&r.direction) {
                directions.push(r.direction.clone());
            }
        }
        Self { rows, by_segment, directions }
    }

    pub fn rows(&self) -> &[TravelTimeMapping] {
        &self.rows
    }

    /// Mapper rows for `segment`.
    pub fn rows_of(&self, segment: SegmentNo) -> impl Iterator<Item = &TravelTimeMapping> {
        self.by_segment
            .get(&segment)
            .into_iter()
            .flatten()
            .map(|&i| &self.rows[i])
    }

    pub fn direction_rank(&self, direction: &str) -> usize {
        self.directions.iter().position(|d| d == direction).unwrap_or(self.directions.len())
    }

    pub fn name_rank(&self, name: &str) -> usize {
        self.rows.iter().position(|r| r.tt_seg_name == name).unwrap_or(self.rows.len())
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct ScenarioSummary {
    pub interval:      usize,
    pub direction:     String,
    pub segment_name:  String,
    pub class:         usize,
    pub avg_veh_delay: f64,
    pub avg_trav:      f64,
    pub q95_trav:      f64,
    pub avg_dist_ft:   f64,
    pub tot_veh:       f64,
    /// Miles per hour, rounded to 2 decimals.
    pub avg_speed:     f64,
    /// Run means of the person metrics, when every run has them.
    pub persons:       Option<PersonDelay>,
}

impl ScenarioSummary {
    /// Metric by report column name.  Person metrics are `None` without
    /// occupancy data.
    pub fn metric(&self, name: &str) -> Option<f64> {
        match name {
            "avg_veh_delay"                       => Some(self.avg_veh_delay),
            "avg_trav"                            => Some(self.avg_trav),
            "q95_trav"                            => Some(self.q95_trav),
            "avg_dist_ft"                         => Some(self.avg_dist_ft),
            "tot_veh"                             => Some(self.tot_veh),
            "avg_speed"                           => Some(self.avg_speed),
            "tot_pers" | "tot_people"             => self.persons.map(|p| p.tot_pers),
            "tot_pers_delay"                      => self.persons.map(|p| p.tot_pers_delay),
            "avg_pers_delay" | "avg_person_delay" => self.persons.map(|p| p.avg_pers_delay),
            _ => None,
        }
    }
}

/// Average per-run summaries over runs, per `(interval, segment name,
/// class)`.  Segments missing from the mapper are dropped.
pub fn aggregate_scenario(summaries: &[RunSummary], layout: &SegmentLayout) -> Vec<ScenarioSummary> {
    type Key = (usize, usize, usize, String, usize);
    let mut groups: BTreeMap<Key, (String, Vec<&RunSummary>)> = BTreeMap::new();
    for s in summaries {
        for m in layout.rows_of(s.segment) {
            let key = (
                s.interval,
                layout.direction_rank(&m.direction),
                layout.name_rank(&m.tt_seg_name),
                m.tt_seg_name.clone(),
                s.class,
            );
            groups.entry(key).or_insert_with(|| (m.direction.clone(), Vec::new())).1.push(s);
        }
    }

    groups
        .into_iter()
        .map(|((interval, _, _, segment_name, class), (direction, ss))| {
            let over = |f: fn(&RunSummary) -> f64| mean(&ss.iter().map(|s| f(s)).collect::<Vec<_>>());
            let avg_trav = over(|s| s.avg_trav);
            let avg_dist_ft = over(|s| s.avg_dist_ft);
            let persons = ss.iter().map(|s| s.persons).collect::<Option<Vec<_>>>().map(|ps| {
                let over = |f: fn(&PersonDelay) -> f64| mean(&ps.iter().map(f).collect::<Vec<_>>());
                PersonDelay {
                    tot_pers:       over(|p| p.tot_pers),
                    tot_pers_delay: over(|p| p.tot_pers_delay),
                    avg_pers_delay: over(|p| p.avg_pers_delay),
                }
            });
            ScenarioSummary {
                interval,
                direction,
                segment_name,
                class,
                avg_veh_delay: over(|s| s.avg_veh_delay),
                avg_trav,
                q95_trav: over(|s| s.q95_trav),
                avg_dist_ft,
                tot_veh: over(|s| s.tot_veh),
                avg_speed: round_to(avg_dist_ft / avg_trav / FPS_PER_MPH, 2),
                persons,
            }
        })
        .collect()
}

/// Pivot the scenario summary: rows `(interval label, direction, segment
/// name)`, column groups the vehicle classes, metrics `cfg.results`.
/// Values are rounded to 2 decimals.
pub fn travel_time_report(
    scenario: &[ScenarioSummary],
    layout: &SegmentLayout,
    cfg: &TravelTimeConfig,
) -> SegmentResult<WideTable> {
    let classes: Vec<String> = cfg.classes.iter().map(|c| c.name.clone()).collect();
    let mut pivot: PivotBuilder<(usize, usize, usize, String, String)> =
        PivotBuilder::new(classes, cfg.results.clone());

    for s in scenario {
        let key = (
            s.interval,
            layout.direction_rank(&s.direction),
            layout.name_rank(&s.segment_name),
            s.direction.clone(),
            s.segment_name.clone(),
        );
        let class = &cfg.classes[s.class].name;
        for metric in &cfg.results {
            if let Some(v) = s.metric(metric) {
                pivot.insert(key.clone(), class, metric, Value::Number(round_to(v, 2)))?;
            }
        }
    }

    let specs = cfg.intervals.specs();
    let index_names = ["timeint", "direction", "tt_seg_name"].iter().map(|s| (*s).to_owned()).collect();
    Ok(pivot.finish(index_names, |(interval, _, _, direction, name)| {
        vec![
            specs.get(*interval).map(|s| s.label().to_owned()).unwrap_or_default(),
            direction.clone(),
            name.clone(),
        ]
    }))
}

// ── Evaluation ────────────────────────────────────────────────────────────────

/// Everything produced for one scenario.
#[derive(Clone, Debug)]
pub struct TravelTimeOutput {
    pub records:  Vec<TravelTimeRecord>,
    pub per_run:  Vec<RunSummary>,
    pub scenario: Vec<ScenarioSummary>,
    pub wide:     WideTable,
}

pub struct TravelTimeEval {
    config: TravelTimeConfig,
    layout: SegmentLayout,
}

impl TravelTimeEval {
    pub fn new(config: TravelTimeConfig, mapping: Vec<TravelTimeMapping>) -> Self {
        Self { config, layout: SegmentLayout::new(mapping) }
    }

    /// Read the segment mapper from sheet `sheet` of `workbook`.
    pub fn from_workbook(config: TravelTimeConfig, workbook: &MappingWorkbook, sheet: &str) -> SegmentResult<Self> {
        Ok(Self::new(config, workbook.sheet(sheet)?))
    }

    pub fn config(&self) -> &TravelTimeConfig {
        &self.config
    }

    pub fn layout(&self) -> &SegmentLayout {
        &self.layout
    }

    pub fn run_paths(&self, paths: &[PathBuf]) -> SegmentResult<TravelTimeOutput> {
        self.run_paths_with_occupancy(paths, &[])
    }

    /// Like [`run_paths`](Self::run_paths), reading transit occupancy from
    /// the `.mer` files in `mer_paths` when occupancy is configured.
    pub fn run_paths_with_occupancy(
        &self,
        paths: &[PathBuf],
        mer_paths: &[PathBuf],
    ) -> SegmentResult<TravelTimeOutput> {
        let mut records = load_runs(paths, &self.config)?;
        match &self.config.occupancy {
            Some(occupancy_cfg) => {
                let occupancy = load_transit_occupancy(mer_paths, occupancy_cfg)?;
                log::info!("transit occupancy for runs {:?}", occupancy.runs().collect::<Vec<_>>());
                assign_persons(&mut records, &occupancy, occupancy_cfg)?;
            }
            None if !mer_paths.is_empty() => {
                log::warn!("{} occupancy files ignored: no occupancy configured", mer_paths.len());
            }
            None => {}
        }
        self.run(records)
    }

    pub fn run(&self, records: Vec<TravelTimeRecord>) -> SegmentResult<TravelTimeOutput> {
        let per_run = summarize_runs(&records, &self.config);
        let scenario = aggregate_scenario(&per_run, &self.layout);
        let wide = travel_time_report(&scenario, &self.layout, &self.config)?;
        Ok(TravelTimeOutput { records, per_run, scenario, wide })
    }
}
