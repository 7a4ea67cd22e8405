//! Disambiguation of direction tokens.
//!
//! At some nodes VISSIM emits the same direction token (`"N-S"`) for two
//! physically distinct movements.  The analyst resolves these with rules
//! keyed on the links each movement connects.  Movements without a rule
//! keep their own token.

use std::collections::{BTreeMap, BTreeSet, HashMap};

use serde::Deserialize;

use vp_core::NodeNo;

use crate::record::MovementRecord;
use crate::{NodeError, NodeResult};

/// Sheet holding the de-duplication rules.
pub const DEDUP_SHEET: &str = "deduplicate_movements";

/// One row of the de-duplication sheet.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
pub struct DeduplicationRule {
    #[serde(alias = "node_id")]
    pub node_no:                   NodeNo,
    pub movement_direction:        String,
    #[serde(default)]
    pub from_link:                 String,
    #[serde(default)]
    pub to_link:                   String,
    pub movement_direction_unique: String,
}

/// Lookup key shared by rules and records.  All text parts are trimmed and
/// lowercased, so `" n-s"` in the sheet matches `"N-S"` in the export.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct RuleKey {
    pub node:      NodeNo,
    pub direction: String,
    pub from_link: String,
    pub to_link:   String,
}

impl RuleKey {
    pub fn new(node: NodeNo, direction: &str, from_link: &str, to_link: &str) -> Self {
        Self {
            node,
            direction: fold(direction),
            from_link: fold(from_link),
            to_link:   fold(to_link),
        }
    }

    fn of_record(r: &MovementRecord) -> Self {
        Self::new(r.node, &r.movement_direction, &r.from_link, &r.to_link)
    }

    fn of_rule(r: &DeduplicationRule) -> Self {
        Self::new(r.node_no, &r.movement_direction, &r.from_link, &r.to_link)
    }
}

fn fold(part: &str) -> String {
    part.trim().to_lowercase()
}

/// Rules indexed by [`RuleKey`].
#[derive(Clone, Debug, Default)]
pub struct DeduplicationTable {
    rules: Vec<DeduplicationRule>,
    index: HashMap<RuleKey, String>,
}

impl DeduplicationTable {
    pub fn new(rules: Vec<DeduplicationRule>) -> Self {
        let mut index = HashMap::with_capacity(rules.len());
        for rule in &rules {
            let key = RuleKey::of_rule(rule);
            let target = rule.movement_direction_unique.trim().to_owned();
            if let Some(prev) = index.insert(key.clone(), target) {
                log::warn!("de-duplication rule for {key:?} declared twice; {prev:?} replaced");
            }
        }
        Self { rules, index }
    }

    pub fn rules(&self) -> &[DeduplicationRule] {
        &self.rules
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    /// Target direction for `key`, if a rule exists.
    pub fn lookup(&self, key: &RuleKey) -> Option<&str> {
        self.index.get(key).map(String::as_str)
    }
}

/// A movement record with its disambiguated direction.
#[derive(Clone, Debug, PartialEq)]
pub struct UniqueMovement {
    pub record:           MovementRecord,
    pub direction_unique: String,
}

/// Attach `direction_unique` to every record.
pub fn deduplicate(records: Vec<MovementRecord>, table: &DeduplicationTable) -> Vec<UniqueMovement> {
    records
        .into_iter()
        .map(|record| {
            let direction_unique = table
                .lookup(&RuleKey::of_record(&record))
                .map_or_else(|| record.movement_direction.trim().to_owned(), str::to_owned);
            UniqueMovement { record, direction_unique }
        })
        .collect()
}

/// Rules that match no `(node, direction, from_link, to_link)` tuple in
/// the data.  These are usually typos in the sheet; each one is logged and
/// returned, the pipeline is not stopped.
pub fn verify_rules_cover_data<'a>(
    records: &[MovementRecord],
    table: &'a DeduplicationTable,
) -> Vec<&'a DeduplicationRule> {
    let present: BTreeSet<RuleKey> = records.iter().map(RuleKey::of_record).collect();
    let unmatched: Vec<&DeduplicationRule> = table
        .rules()
        .iter()
        .filter(|rule| !present.contains(&RuleKey::of_rule(rule)))
        .collect();
    for rule in &unmatched {
        log::warn!(
            "de-duplication rule matches no data: node {} {:?} from {:?} to {:?} -> {:?}",
            rule.node_no,
            rule.movement_direction,
            rule.from_link,
            rule.to_link,
            rule.movement_direction_unique,
        );
    }
    unmatched
}

/// Fail if two movements of one `(run, interval, node)` group share a
/// disambiguated direction.
pub fn verify_unique_directions(movements: &[UniqueMovement]) -> NodeResult<()> {
    let mut seen: BTreeMap<(&str, &str, NodeNo), BTreeSet<&str>> = BTreeMap::new();
    for m in movements {
        let r = &m.record;
        let group = seen.entry((r.run_id.as_str(), r.time_interval.as_str(), r.node)).or_default();
        if !group.insert(&m.direction_unique) {
            return Err(NodeError::DuplicateDirection {
                run:       r.run_id.clone(),
                interval:  r.time_interval.clone(),
                node:      r.node,
                direction: m.direction_unique.clone(),
            });
        }
    }
    Ok(())
}
