//! In-memory tables.
//!
//! [`Table`] is the long form every loader produces: named columns and rows
//! of [`Value`]s.  [`WideTable`] is the report form: a multi-level row
//! index and a two-level column header (`group`, `metric`), built with a
//! [`PivotBuilder`].
//!
//! Column lookup by name resolves to the *last* column with that name, so
//! a later header silently shadows an earlier one that normalized to the
//! same identifier.

use std::collections::BTreeMap;
use std::fmt::Debug;

use crate::{Value, VpError, VpResult};

// ── Table ─────────────────────────────────────────────────────────────────────

#[derive(Clone, Debug, Default, PartialEq)]
pub struct Table {
    columns: Vec<String>,
    rows:    Vec<Vec<Value>>,
}

impl Table {
    pub fn new(columns: Vec<String>) -> Self {
        Self { columns, rows: Vec::new() }
    }

    /// Append a row.  Its width must match the header.
    pub fn push_row(&mut self, row: Vec<Value>) -> VpResult<()> {
        if row.len() != self.columns.len() {
            return Err(VpError::RowWidth { expected: self.columns.len(), got: row.len() });
        }
        self.rows.push(row);
        Ok(())
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn rows(&self) -> &[Vec<Value>] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Index of column `name`; the last one wins on duplicates.
    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns.iter().rposition(|c| c == name)
    }

    pub fn has_column(&self, name: &str) -> bool {
        self.column_index(name).is_some()
    }

    /// Cell at (`row`, `name`), or `None` if the column does not exist.
    pub fn get(&self, row: usize, name: &str) -> Option<&Value> {
        let col = self.column_index(name)?;
        self.rows.get(row).map(|r| &r[col])
    }

    /// Keep only the named columns, in the order given.  Names that are not
    /// present are skipped.
    pub fn select<S: AsRef<str>>(&self, names: &[S]) -> Table {
        let mut picked: Vec<(String, usize)> = Vec::with_capacity(names.len());
        for name in names {
            let name = name.as_ref();
            match self.column_index(name) {
                Some(i) => picked.push((name.to_owned(), i)),
                None => log::debug!("select: column {name:?} not present, skipped"),
            }
        }
        Table {
            columns: picked.iter().map(|(n, _)| n.clone()).collect(),
            rows: self
                .rows
                .iter()
                .map(|r| picked.iter().map(|&(_, i)| r[i].clone()).collect())
                .collect(),
        }
    }

    /// Keep only the rows for which `keep` returns `true`.
    pub fn filter_rows<F>(&self, mut keep: F) -> Table
    where
        F: FnMut(&[Value]) -> bool,
    {
        Table {
            columns: self.columns.clone(),
            rows:    self.rows.iter().filter(|r| keep(r)).cloned().collect(),
        }
    }

    /// Replace every cell of column `name` with `f(cell)`.  No-op if the
    /// column does not exist.
    pub fn map_column<F>(&mut self, name: &str, mut f: F)
    where
        F: FnMut(&Value) -> Value,
    {
        if let Some(col) = self.column_index(name) {
            for row in &mut self.rows {
                row[col] = f(&row[col]);
            }
        }
    }
}

// ── WideTable ─────────────────────────────────────────────────────────────────

/// One row of a [`WideTable`].
#[derive(Clone, Debug, PartialEq)]
pub struct WideRow {
    /// One entry per `WideTable::index_names`.
    pub index: Vec<String>,
    /// `groups.len() * metrics.len()` cells, group-major.
    pub cells: Vec<Value>,
}

/// A pivoted report table.
///
/// The column header is the full cartesian product `groups × metrics`, so
/// combinations with no data show up as empty cells instead of vanishing.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct WideTable {
    pub index_names: Vec<String>,
    pub groups:      Vec<String>,
    pub metrics:     Vec<String>,
    pub rows:        Vec<WideRow>,
}

impl WideTable {
    /// All `(group, metric)` column pairs, in header order.
    pub fn column_pairs(&self) -> impl Iterator<Item = (&str, &str)> {
        self.groups
            .iter()
            .flat_map(move |g| self.metrics.iter().map(move |m| (g.as_str(), m.as_str())))
    }

    fn column_of(&self, group: &str, metric: &str) -> Option<usize> {
        let g = self.groups.iter().position(|x| x == group)?;
        let m = self.metrics.iter().position(|x| x == metric)?;
        Some(g * self.metrics.len() + m)
    }

    /// Find the row whose index equals `index`.
    pub fn row<S: AsRef<str>>(&self, index: &[S]) -> Option<&WideRow> {
        self.rows.iter().find(|r| {
            r.index.len() == index.len()
                && r.index.iter().zip(index).all(|(a, b)| a == b.as_ref())
        })
    }

    /// Cell lookup by row index and column pair.
    pub fn cell<S: AsRef<str>>(&self, index: &[S], group: &str, metric: &str) -> Option<&Value> {
        let col = self.column_of(group, metric)?;
        self.row(index).map(|r| &r.cells[col])
    }
}

// ── PivotBuilder ──────────────────────────────────────────────────────────────

/// Accumulates long-form `(key, group, metric, value)` entries into a
/// [`WideTable`] whose rows are ordered by `K`.
///
/// Entries whose group or metric is not in the configured lists are
/// ignored.  Two non-missing entries for the same cell are an error.
pub struct PivotBuilder<K: Ord + Debug> {
    groups:  Vec<String>,
    metrics: Vec<String>,
    rows:    BTreeMap<K, Vec<Value>>,
}

impl<K: Ord + Debug> PivotBuilder<K> {
    pub fn new(groups: Vec<String>, metrics: Vec<String>) -> Self {
        Self { groups, metrics, rows: BTreeMap::new() }
    }

    /// Insert one entry.  Returns `Ok(false)` if the column is not part of
    /// the report template.
    pub fn insert(&mut self, key: K, group: &str, metric: &str, value: Value) -> VpResult<bool> {
        let (Some(g), Some(m)) = (
            self.groups.iter().position(|x| x == group),
            self.metrics.iter().position(|x| x == metric),
        ) else {
            return Ok(false);
        };
        let width = self.groups.len() * self.metrics.len();
        let col = g * self.metrics.len() + m;

        if let Some(cells) = self.rows.get(&key) {
            if !cells[col].is_missing() && !value.is_missing() {
                return Err(VpError::DuplicateCell {
                    key:    format!("{key:?}"),
                    group:  group.to_owned(),
                    metric: metric.to_owned(),
                });
            }
        }
        let cells = self.rows.entry(key).or_insert_with(|| vec![Value::Empty; width]);
        if !value.is_missing() || cells[col].is_missing() {
            cells[col] = value;
        }
        Ok(true)
    }

    /// Finish the table.  `index_of` renders each key into index strings.
    pub fn finish<F>(self, index_names: Vec<String>, mut index_of: F) -> WideTable
    where
        F: FnMut(&K) -> Vec<String>,
    {
        let rows = self
            .rows
            .into_iter()
            .map(|(k, cells)| WideRow { index: index_of(&k), cells })
            .collect();
        WideTable {
            index_names,
            groups: self.groups,
            metrics: self.metrics,
            rows,
        }
    }
}
