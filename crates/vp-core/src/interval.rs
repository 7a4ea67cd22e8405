//! Simulation time intervals.
//!
//! VISSIM reports aggregated results per evaluation interval, identified by
//! a `"<start>-<end>"` string of simulation seconds (e.g. `"2700-6300"`).
//! Reports present those intervals in an analyst-chosen order under
//! human-readable labels (`"6:00-7:00 am"`).  [`IntervalOrder`] holds that
//! order; it is an explicit total order, never alphabetical.

use std::fmt;
use std::str::FromStr;

use serde::Deserialize;

use crate::{VpError, VpResult};

// ── TimeInterval ──────────────────────────────────────────────────────────────

/// A half-open `[start, end)` range of simulation seconds.
#[derive(Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Debug)]
pub struct TimeInterval {
    pub start: u32,
    pub end:   u32,
}

impl TimeInterval {
    /// `true` if `secs` falls in `[start, end)`.
    #[inline]
    pub fn contains(&self, secs: f64) -> bool {
        secs >= self.start as f64 && secs < self.end as f64
    }
}

impl FromStr for TimeInterval {
    type Err = VpError;

    fn from_str(s: &str) -> VpResult<Self> {
        let bad = || VpError::Parse(format!("invalid time interval {s:?}: expected \"<start>-<end>\""));
        let (start, end) = s.trim().split_once('-').ok_or_else(bad)?;
        let start = start.trim().parse::<u32>().map_err(|_| bad())?;
        let end = end.trim().parse::<u32>().map_err(|_| bad())?;
        if end <= start {
            return Err(bad());
        }
        Ok(TimeInterval { start, end })
    }
}

impl fmt::Display for TimeInterval {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}", self.start, self.end)
    }
}

// ── IntervalOrder ─────────────────────────────────────────────────────────────

/// One configured interval: simulator bucket id plus optional report label.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
pub struct IntervalSpec {
    pub id:    String,
    #[serde(default)]
    pub label: Option<String>,
}

impl IntervalSpec {
    pub fn new(id: &str, label: &str) -> Self {
        Self { id: id.to_owned(), label: Some(label.to_owned()) }
    }

    /// The report label, falling back to the bucket id.
    pub fn label(&self) -> &str {
        self.label.as_deref().unwrap_or(&self.id)
    }
}

/// Ordered list of the time intervals that appear in a report.
#[derive(Clone, Debug, Default, PartialEq, Eq, Deserialize)]
#[serde(transparent)]
pub struct IntervalOrder {
    specs: Vec<IntervalSpec>,
}

impl IntervalOrder {
    pub fn new(specs: Vec<IntervalSpec>) -> Self {
        Self { specs }
    }

    /// Build an order whose labels are the bucket ids themselves.
    pub fn from_ids<S: AsRef<str>>(ids: &[S]) -> Self {
        Self {
            specs: ids
                .iter()
                .map(|id| IntervalSpec { id: id.as_ref().to_owned(), label: None })
                .collect(),
        }
    }

    pub fn specs(&self) -> &[IntervalSpec] {
        &self.specs
    }

    pub fn len(&self) -> usize {
        self.specs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.specs.is_empty()
    }

    /// Position of bucket `id` in the order.
    pub fn rank(&self, id: &str) -> Option<usize> {
        let id = id.trim();
        self.specs.iter().position(|s| s.id == id)
    }

    /// Report label of bucket `id`.
    pub fn label(&self, id: &str) -> Option<&str> {
        self.rank(id).map(|i| self.specs[i].label())
    }

    /// All labels, in order.
    pub fn labels(&self) -> Vec<String> {
        self.specs.iter().map(|s| s.label().to_owned()).collect()
    }

    /// Parse every bucket id into a [`TimeInterval`].
    pub fn bounds(&self) -> VpResult<Vec<TimeInterval>> {
        self.specs.iter().map(|s| s.id.parse()).collect()
    }

    /// Index of the first interval containing `secs`, for raw per-vehicle
    /// records that carry a timestamp instead of a bucket id.
    pub fn bucket_of(bounds: &[TimeInterval], secs: f64) -> Option<usize> {
        bounds.iter().position(|b| b.contains(secs))
    }
}
