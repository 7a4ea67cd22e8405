//! Analyst mapping workbook.
//!
//! The hand-maintained mapping spreadsheet is read straight from the
//! workbook file (`.xlsx`, `.xlsm`, `.xls`, `.xlsb` or `.ods`), one named
//! sheet per mapping.  A directory holding one CSV file per sheet is
//! accepted too:
//!
//! ```text
//! mappers/node_evaluation_vissim_report_mapping.xlsx
//!     [vissim_report_convertion]   node_no | movement_direction_unique | direction_results | node_type
//!     [deduplicate_movements]      node_no | movement_direction | from_link | to_link | movement_direction_unique
//!
//! mappers/node_evaluation/
//!     vissim_report_convertion.csv
//!     deduplicate_movements.csv
//! ```
//!
//! Both backends feed the same serde row types.  Cells are rendered to text
//! and trimmed before deserialization, so stray spaces typed into the
//! spreadsheet do not break joins and a numeric cell such as `7.0` reads as
//! `"7"`.

use std::io::Read;
use std::path::{Path, PathBuf};

use calamine::{open_workbook_auto, Data, Range, Reader};
use csv::StringRecord;
use serde::de::DeserializeOwned;

use crate::{LoadError, LoadResult};

#[derive(Clone, Debug)]
enum Backend {
    /// `<dir>/<sheet>.csv`
    CsvDir,
    /// Spreadsheet file; sheet names as listed at open time.
    Spreadsheet { sheets: Vec<String> },
}

/// A set of named mapping sheets.
#[derive(Clone, Debug)]
pub struct MappingWorkbook {
    path:    PathBuf,
    backend: Backend,
}

impl MappingWorkbook {
    /// Open a workbook file or a directory of CSV sheets.
    pub fn open(path: &Path) -> LoadResult<Self> {
        if path.is_dir() {
            return Ok(Self { path: path.to_path_buf(), backend: Backend::CsvDir });
        }
        if !path.is_file() {
            return Err(LoadError::NotFound(path.to_path_buf()));
        }
        let workbook = open_workbook_auto(path)
            .map_err(|source| LoadError::Workbook { path: path.to_path_buf(), source })?;
        let sheets = workbook.sheet_names();
        log::debug!("workbook {}: sheets {sheets:?}", path.display());
        Ok(Self { path: path.to_path_buf(), backend: Backend::Spreadsheet { sheets } })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn csv_sheet(&self, name: &str) -> PathBuf {
        self.path.join(format!("{name}.csv"))
    }

    pub fn has_sheet(&self, name: &str) -> bool {
        match &self.backend {
            Backend::CsvDir => self.csv_sheet(name).is_file(),
            Backend::Spreadsheet { sheets } => sheets.iter().any(|s| s == name),
        }
    }

    /// Deserialize every row of sheet `name`.
    pub fn sheet<T: DeserializeOwned>(&self, name: &str) -> LoadResult<Vec<T>> {
        if !self.has_sheet(name) {
            return Err(LoadError::MissingSheet(name.to_owned()));
        }
        let rows: Vec<T> = match self.backend {
            Backend::CsvDir => {
                let path = self.csv_sheet(name);
                let file = std::fs::File::open(&path)
                    .map_err(|source| LoadError::Io { path: path.clone(), source })?;
                read_sheet(file, name)?
            }
            Backend::Spreadsheet { .. } => {
                let workbook_err = |source| LoadError::Workbook { path: self.path.clone(), source };
                // reopened per sheet: calamine readers need `&mut`
                let mut workbook = open_workbook_auto(&self.path).map_err(workbook_err)?;
                let range = workbook.worksheet_range(name).map_err(workbook_err)?;
                read_range(&range, name)?
            }
        };
        log::info!("mapping sheet {name:?}: {} rows", rows.len());
        Ok(rows)
    }
}

/// Deserialize a CSV sheet from any `Read` source.
pub fn read_sheet<T: DeserializeOwned, R: Read>(reader: R, name: &str) -> LoadResult<Vec<T>> {
    let mut csv_reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_reader(reader);
    csv_reader
        .deserialize::<T>()
        .map(|row| row.map_err(|e| sheet_error(name, e)))
        .collect()
}

/// Deserialize a spreadsheet range whose first row is the header.
/// Rows with no populated cell are skipped.
pub fn read_range<T: DeserializeOwned>(range: &Range<Data>, name: &str) -> LoadResult<Vec<T>> {
    let mut rows = range.rows();
    let Some(header) = rows.next() else {
        return Ok(Vec::new());
    };
    let headers = text_record(header);
    rows.filter(|cells| cells.iter().any(|c| *c != Data::Empty))
        .map(|cells| text_record(cells).deserialize(Some(&headers)).map_err(|e| sheet_error(name, e)))
        .collect()
}

fn text_record(cells: &[Data]) -> StringRecord {
    let mut record: StringRecord = cells.iter().map(ToString::to_string).collect();
    record.trim();
    record
}

fn sheet_error(name: &str, e: csv::Error) -> LoadError {
    LoadError::Sheet { sheet: name.to_owned(), message: e.to_string() }
}
