//! CSV output backend.
//!
//! One `<name>.csv` file per table in the configured output directory.
//! Wide tables carry a two-row header:
//!
//! ```text
//! run,node,approach,direction,from_link,to_link,6:00-7:00 am,6:00-7:00 am,…
//! ,,,,,,qlen,qlenmax,…
//! AVG,7,NB,NBR,10,20,3.5,20.1,…
//! ```
//!
//! Missing values are written as empty cells.

use std::collections::BTreeMap;
use std::fs::File;
use std::path::{Path, PathBuf};

use csv::Writer;

use vp_core::{Table, WideTable};

use crate::writer::{check_name, ReportWriter};
use crate::{OutputError, OutputResult};

/// Writes report tables to CSV files.
pub struct CsvWriter {
    dir:      PathBuf,
    open:     BTreeMap<String, Writer<File>>,
    finished: bool,
}

impl CsvWriter {
    /// Write into `dir`, creating it if needed.
    pub fn new(dir: &Path) -> OutputResult<Self> {
        std::fs::create_dir_all(dir)?;
        Ok(Self { dir: dir.to_path_buf(), open: BTreeMap::new(), finished: false })
    }

    pub fn path_of(&self, name: &str) -> PathBuf {
        self.dir.join(format!("{name}.csv"))
    }

    fn create(&mut self, name: &str) -> OutputResult<&mut Writer<File>> {
        if self.finished {
            return Err(OutputError::Finished(name.to_owned()));
        }
        check_name(name)?;
        if let Some(mut earlier) = self.open.remove(name) {
            earlier.flush()?;
            log::warn!("table {name:?} written twice; earlier file replaced");
        }
        let writer = Writer::from_path(self.path_of(name))?;
        Ok(self.open.entry(name.to_owned()).or_insert(writer))
    }
}

impl ReportWriter for CsvWriter {
    fn write_wide(&mut self, name: &str, table: &WideTable) -> OutputResult<()> {
        let w = self.create(name)?;

        let mut top: Vec<&str> = table.index_names.iter().map(String::as_str).collect();
        let mut bottom: Vec<&str> = vec![""; table.index_names.len()];
        for (group, metric) in table.column_pairs() {
            top.push(group);
            bottom.push(metric);
        }
        w.write_record(&top)?;
        w.write_record(&bottom)?;

        for row in &table.rows {
            let record = row
                .index
                .iter()
                .cloned()
                .chain(row.cells.iter().map(ToString::to_string));
            w.write_record(record)?;
        }
        log::info!("wrote {} ({} rows)", self.path_of(name).display(), table.rows.len());
        Ok(())
    }

    fn write_table(&mut self, name: &str, table: &Table) -> OutputResult<()> {
        let w = self.create(name)?;
        w.write_record(table.columns())?;
        for row in table.rows() {
            w.write_record(row.iter().map(ToString::to_string))?;
        }
        log::info!("wrote {} ({} rows)", self.path_of(name).display(), table.len());
        Ok(())
    }

    fn finish(&mut self) -> OutputResult<()> {
        if self.finished {
            return Ok(());
        }
        self.finished = true;
        for w in self.open.values_mut() {
            w.flush()?;
        }
        Ok(())
    }
}
