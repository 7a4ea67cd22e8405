//! Data-collection raw output (`.mer`) loader.
//!
//! One file per simulation run.  A free-form preamble of varying length
//! (file name, comment, one line per data collection point) precedes the
//! header, which is the first line with more than five `;`-separated
//! fields:
//!
//! ```text
//! Data Collection (Raw Data)
//! ...
//! Data Collection Point 3: Link 10 Lane 1 at 25.000 m, Length 0.000 m.
//!
//! Measurem.;  t(Entry);   t(Exit);  VehNo; Vehicle type; Line; v[m/s]; Pers
//!         3;   2755.21;     -1.00;   1204;          300;  111;   8.42;   37
//! ```

use std::io::Read;
use std::path::Path;

use vp_core::{Strictness, Table};

use crate::delimited::{parse_table, read_all, Layout};
use crate::{LoadError, LoadResult};

/// A header has more fields than any preamble line.
const MIN_HEADER_FIELDS: usize = 6;

/// Load one `.mer` file.
pub fn load_mer_path(path: &Path) -> LoadResult<Table> {
    if !path.exists() {
        return Err(LoadError::NotFound(path.to_path_buf()));
    }
    let text = std::fs::read_to_string(path)
        .map_err(|source| LoadError::Io { path: path.to_path_buf(), source })?;
    let table = parse_mer(&text, &path.display().to_string())?;
    log::info!("loaded {} data-collection records from {}", table.len(), path.display());
    Ok(table)
}

/// Like [`load_mer_path`] but accepts any `Read` source.
pub fn load_mer_reader<R: Read>(reader: R) -> LoadResult<Table> {
    let text = read_all(reader, "<reader>")?;
    parse_mer(&text, "<reader>")
}

fn parse_mer(text: &str, source_name: &str) -> LoadResult<Table> {
    let skip_lines = text
        .lines()
        .position(|line| line.split(';').count() >= MIN_HEADER_FIELDS)
        .ok_or_else(|| LoadError::MissingHeader { source_name: source_name.to_owned() })?;
    log::debug!("{source_name}: header after {skip_lines} preamble lines");
    parse_table(text, source_name, Layout { skip_lines, comments: false }, Strictness::Lenient)
}
