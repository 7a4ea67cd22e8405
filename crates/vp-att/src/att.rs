//! VISSIM attribute-file (`.att`) loader.
//!
//! Used for every aggregated evaluation export: node results, link segment
//! results, vehicle network performance.  See the crate docs for the
//! layout.

use std::io::Read;
use std::path::Path;

use vp_core::{Strictness, Table};

use crate::delimited::{parse_table, read_all, Layout};
use crate::{LoadError, LoadResult};

const ATT_LAYOUT: Layout = Layout { skip_lines: 1, comments: true };

/// Load an `.att` export from disk.
///
/// Fails with [`LoadError::NotFound`] if `path` does not exist and with
/// [`LoadError::Empty`] if the header is followed by no data rows.
pub fn load_att_path(path: &Path, strictness: Strictness) -> LoadResult<Table> {
    if !path.exists() {
        return Err(LoadError::NotFound(path.to_path_buf()));
    }
    let text = std::fs::read_to_string(path)
        .map_err(|source| LoadError::Io { path: path.to_path_buf(), source })?;
    let table = parse_table(&text, &path.display().to_string(), ATT_LAYOUT, strictness)?;
    log::info!("loaded {} rows from {}", table.len(), path.display());
    Ok(table)
}

/// Like [`load_att_path`] but accepts any `Read` source.
pub fn load_att_reader<R: Read>(reader: R, strictness: Strictness) -> LoadResult<Table> {
    let text = read_all(reader, "<reader>")?;
    parse_table(&text, "<reader>", ATT_LAYOUT, strictness)
}
