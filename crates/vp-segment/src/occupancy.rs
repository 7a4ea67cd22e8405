//! Vehicle occupancy for person delay.
//!
//! Cars and HGVs carry a fixed occupancy.  Transit vehicles carry the
//! passenger count measured at data collection points, read from the
//! run's `.mer` file: the earliest entry of each vehicle at one of the
//! configured points wins.

use std::collections::{BTreeMap, HashMap};
use std::path::PathBuf;

use serde::Deserialize;

use vp_att::load_mer_path;
use vp_core::Table;

use crate::cells::{number, require};
use crate::travel_time::{run_number, TravelTimeRecord};
use crate::{SegmentError, SegmentResult};

#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(default)]
pub struct OccupancyConfig {
    /// Persons per car or HGV.
    pub car_hgv_veh_occupancy: f64,
    /// Vehicle types from this number up are transit.
    pub transit_min_type:      u32,
    /// Data collection points measuring transit occupancy.  Empty uses all.
    pub measurements:          Vec<u32>,
}

impl Default for OccupancyConfig {
    fn default() -> Self {
        Self { car_hgv_veh_occupancy: 1.3, transit_min_type: 300, measurements: Vec::new() }
    }
}

impl OccupancyConfig {
    pub fn is_transit(&self, vehicle_type: u32) -> bool {
        vehicle_type >= self.transit_min_type
    }
}

/// Measured persons per transit vehicle, keyed by run then vehicle number.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct TransitOccupancy {
    runs: BTreeMap<u32, HashMap<u64, f64>>,
}

impl TransitOccupancy {
    pub fn insert_run(&mut self, run_no: u32, persons: HashMap<u64, f64>) {
        self.runs.insert(run_no, persons);
    }

    pub fn persons(&self, run_no: u32, vehicle: u64) -> Option<f64> {
        self.runs.get(&run_no)?.get(&vehicle).copied()
    }

    pub fn runs(&self) -> impl Iterator<Item = u32> + '_ {
        self.runs.keys().copied()
    }
}

/// Transit passengers per vehicle from one `.mer` table.  Rows without a
/// positive entry time (exit-only records are written with `-1`) are
/// ignored.
pub fn transit_persons(table: &Table, cfg: &OccupancyConfig) -> SegmentResult<HashMap<u64, f64>> {
    let c_point = require(table, "measurem")?;
    let c_entry = require(table, "t_entry")?;
    let c_veh = require(table, "veh_no")?;
    let type_name = ["vehicle type", "vehicle_type", "veh_type"]
        .into_iter()
        .find(|name| table.has_column(name))
        .ok_or_else(|| SegmentError::MissingColumn("vehicle type".to_owned()))?;
    let c_type = require(table, type_name)?;
    let c_pers = require(table, "pers")?;

    let mut entries: Vec<(f64, u64, f64)> = Vec::new();
    for (i, row) in table.rows().iter().enumerate() {
        let point = number(&row[c_point], i, "measurem")?;
        if !cfg.measurements.is_empty() && !cfg.measurements.iter().any(|&p| f64::from(p) == point) {
            continue;
        }
        let t_entry = number(&row[c_entry], i, "t_entry")?;
        if t_entry.is_nan() || t_entry <= 0.0 {
            continue;
        }
        let vehicle_type = number(&row[c_type], i, type_name)?;
        if vehicle_type.is_nan() || vehicle_type < f64::from(cfg.transit_min_type) {
            continue;
        }
        let vehicle = number(&row[c_veh], i, "veh_no")?;
        entries.push((t_entry, vehicle as u64, number(&row[c_pers], i, "pers")?));
    }

    entries.sort_by(|a, b| a.0.total_cmp(&b.0));
    let mut persons = HashMap::new();
    for (_, vehicle, pers) in entries {
        persons.entry(vehicle).or_insert(pers);
    }
    Ok(persons)
}

/// Read every `.mer` file; the run number comes from the file name as for
/// `.rsr` files.
pub fn load_transit_occupancy(paths: &[PathBuf], cfg: &OccupancyConfig) -> SegmentResult<TransitOccupancy> {
    let mut occupancy = TransitOccupancy::default();
    for path in paths {
        let run_no = run_number(path)?;
        let persons = transit_persons(&load_mer_path(path)?, cfg)?;
        log::debug!("run {run_no}: occupancy of {} transit vehicles", persons.len());
        occupancy.insert_run(run_no, persons);
    }
    Ok(occupancy)
}

/// Set `persons` on every record.  A transit vehicle with no measured
/// occupancy in its run is an error.
pub fn assign_persons(
    records: &mut [TravelTimeRecord],
    occupancy: &TransitOccupancy,
    cfg: &OccupancyConfig,
) -> SegmentResult<()> {
    for r in records.iter_mut() {
        let persons = if cfg.is_transit(r.vehicle_type) {
            occupancy
                .persons(r.run_no, r.vehicle)
                .ok_or(SegmentError::MissingOccupancy { run: r.run_no, vehicle: r.vehicle })?
        } else {
            cfg.car_hgv_veh_occupancy
        };
        r.persons = Some(persons);
    }
    Ok(())
}
