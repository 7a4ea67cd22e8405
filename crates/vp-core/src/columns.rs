//! Simulator header normalization.
//!
//! VISSIM attribute headers look like `$MOVEMENTEVALUATION:SIMRUN`,
//! `MOVEMENT\FROMLINK\LEVEL` or `VEHS(ALL)`.  They are turned into
//! lower-case snake_case identifiers:
//!
//! ```text
//! $MOVEMENTEVALUATION:SIMRUN  →  movementevaluation_simrun
//! MOVEMENT\FROMLINK\LEVEL     →  movement_fromlink_level
//! VEHS(ALL)                   →  vehs_all
//! VehType                     →  veh_type
//! ```
//!
//! The mapping is 1:1 and order preserving.  Collisions are *not* resolved
//! here; see [`find_collisions`].

use std::collections::BTreeSet;
use std::sync::LazyLock;

use regex::Regex;

static ACRONYM_BOUNDARY: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"([A-Z]+)([A-Z][a-z])").expect("static pattern")
});

static CAMEL_BOUNDARY: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"([a-z\d])([A-Z])").expect("static pattern")
});

/// Normalize one raw header.
pub fn normalize_column(raw: &str) -> String {
    let split = ACRONYM_BOUNDARY.replace_all(raw, "${1}_${2}");
    let split = CAMEL_BOUNDARY.replace_all(&split, "${1}_${2}");
    split
        .replace('-', "_")
        .to_lowercase()
        .replace('$', "")
        .replace(':', "_")
        .replace('\\', "_")
        .replace('(', "_")
        .replace(')', "")
        .replace('.', "")
        .trim()
        .to_owned()
}

/// Normalize a header row, preserving length and order.
pub fn normalize_columns<S: AsRef<str>>(raw: &[S]) -> Vec<String> {
    raw.iter().map(|c| normalize_column(c.as_ref())).collect()
}

/// Names that occur more than once in `columns`, sorted.
pub fn find_collisions(columns: &[String]) -> Vec<String> {
    let mut seen = BTreeSet::new();
    let mut dupes = BTreeSet::new();
    for c in columns {
        if !seen.insert(c.as_str()) {
            dupes.insert(c.clone());
        }
    }
    dupes.into_iter().collect()
}
