//! SQLite output backend (feature `sqlite`).
//!
//! Creates a single `output.db` file in the configured output directory
//! with one database table per report table.  Writing a name again
//! replaces that table.
//!
//! - Flat tables are stored column for column.  A column whose non-empty
//!   cells are all numbers is `REAL`, anything else `TEXT`.
//! - Wide tables are stored in long form: the index columns, then
//!   `col_group`, `metric` and `value`.  Empty cells are not stored.

use std::path::Path;

use rusqlite::types::Value as SqlValue;
use rusqlite::{params_from_iter, Connection};

use vp_core::{Table, Value, WideTable};

use crate::writer::{check_name, ReportWriter};
use crate::{OutputError, OutputResult};

/// Writes report tables to an SQLite database.
pub struct SqliteWriter {
    conn:     Connection,
    finished: bool,
}

fn quote(ident: &str) -> String {
    format!("\"{}\"", ident.replace('"', "\"\""))
}

fn sql_value(v: &Value) -> SqlValue {
    match v {
        Value::Number(n) if !n.is_nan() => SqlValue::Real(*n),
        Value::Text(s) => SqlValue::Text(s.clone()),
        _ => SqlValue::Null,
    }
}

impl SqliteWriter {
    /// Open (or create) `output.db` in `dir`.
    pub fn new(dir: &Path) -> OutputResult<Self> {
        std::fs::create_dir_all(dir)?;
        let conn = Connection::open(dir.join("output.db"))?;
        conn.execute_batch(
            "PRAGMA journal_mode = WAL;
             PRAGMA synchronous  = NORMAL;",
        )?;
        Ok(Self { conn, finished: false })
    }

    fn replace_table(&self, name: &str, columns: &[(String, &str)]) -> OutputResult<()> {
        let defs: Vec<String> = columns.iter().map(|(c, ty)| format!("{} {ty}", quote(c))).collect();
        self.conn.execute_batch(&format!(
            "DROP TABLE IF EXISTS {table};
             CREATE TABLE {table} ({defs});",
            table = quote(name),
            defs = defs.join(", "),
        ))?;
        Ok(())
    }

    fn insert_all<I>(&self, name: &str, width: usize, rows: I) -> OutputResult<()>
    where
        I: IntoIterator<Item = Vec<SqlValue>>,
    {
        let placeholders: Vec<String> = (1..=width).map(|i| format!("?{i}")).collect();
        let sql = format!("INSERT INTO {} VALUES ({})", quote(name), placeholders.join(", "));
        let tx = self.conn.unchecked_transaction()?;
        {
            let mut stmt = tx.prepare_cached(&sql)?;
            for row in rows {
                stmt.execute(params_from_iter(row))?;
            }
        }
        tx.commit()?;
        Ok(())
    }

    fn check(&self, name: &str) -> OutputResult<()> {
        if self.finished {
            return Err(OutputError::Finished(name.to_owned()));
        }
        check_name(name)
    }
}

impl ReportWriter for SqliteWriter {
    fn write_wide(&mut self, name: &str, table: &WideTable) -> OutputResult<()> {
        self.check(name)?;
        let mut columns: Vec<(String, &str)> =
            table.index_names.iter().map(|n| (n.clone(), "TEXT")).collect();
        columns.extend([
            ("col_group".to_owned(), "TEXT"),
            ("metric".to_owned(), "TEXT"),
            ("value".to_owned(), ""),
        ]);
        self.replace_table(name, &columns)?;

        let pairs: Vec<(&str, &str)> = table.column_pairs().collect();
        let rows = table.rows.iter().flat_map(|row| {
            row.cells
                .iter()
                .zip(&pairs)
                .filter(|(cell, _)| !cell.is_missing())
                .map(move |(cell, (group, metric))| {
                    let mut values: Vec<SqlValue> =
                        row.index.iter().map(|i| SqlValue::Text(i.clone())).collect();
                    values.push(SqlValue::Text((*group).to_owned()));
                    values.push(SqlValue::Text((*metric).to_owned()));
                    values.push(sql_value(cell));
                    values
                })
        });
        self.insert_all(name, columns.len(), rows)?;
        log::info!("stored {name:?} in output.db ({} rows)", table.rows.len());
        Ok(())
    }

    fn write_table(&mut self, name: &str, table: &Table) -> OutputResult<()> {
        self.check(name)?;
        let columns: Vec<(String, &str)> = table
            .columns()
            .iter()
            .enumerate()
            .map(|(i, c)| {
                let numeric = table
                    .rows()
                    .iter()
                    .all(|r| matches!(r[i], Value::Number(_) | Value::Empty));
                (c.clone(), if numeric { "REAL" } else { "TEXT" })
            })
            .collect();
        self.replace_table(name, &columns)?;
        let rows = table.rows().iter().map(|r| r.iter().map(sql_value).collect());
        self.insert_all(name, columns.len(), rows)?;
        log::info!("stored {name:?} in output.db ({} rows)", table.len());
        Ok(())
    }

    fn finish(&mut self) -> OutputResult<()> {
        if self.finished {
            return Ok(());
        }
        self.finished = true;
        self.conn.execute_batch("PRAGMA wal_checkpoint(TRUNCATE);")?;
        Ok(())
    }
}
