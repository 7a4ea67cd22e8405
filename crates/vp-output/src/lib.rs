//! `vp-output` — writers for report tables.
//!
//! Two backends are provided, the second behind a Cargo feature:
//!
//! | Feature   | Backend | Files created                          |
//! |-----------|---------|----------------------------------------|
//! | *(none)*  | CSV     | `<name>.csv` per table                 |
//! | `sqlite`  | SQLite  | `output.db`, one database table per name |
//!
//! Both implement [`ReportWriter`].
//!
//! # Usage
//!
//! ```rust,ignore
//! use vp_output::{CsvWriter, ReportWriter};
//!
//! let mut writer = CsvWriter::new(Path::new("./output"))?;
//! writer.write_wide("process_node_eval", &out.wide)?;
//! writer.finish()?;
//! ```

pub mod csv;
pub mod error;
pub mod writer;

#[cfg(feature = "sqlite")]
pub mod sqlite;


pub use csv::CsvWriter;
pub use error::{OutputError, OutputResult};
pub use writer::ReportWriter;

#[cfg(feature = "sqlite")]
pub use sqlite::SqliteWriter;
