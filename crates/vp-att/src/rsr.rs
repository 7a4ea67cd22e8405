//! Raw vehicle travel-time (`.rsr`) loader.
//!
//! One file per simulation run.  The first eight lines are a free-form
//! preamble (file name, comment, measurement definitions); the ninth line
//! is the header:
//!
//! ```text
//!  Time;  No.;  Veh;VehType;   Trav;  Delay;   Dist
//!  2712.4;  101;  17;    100;   95.1;   12.3;  812.4
//! ```

use std::io::Read;
use std::path::Path;

use vp_core::{Strictness, Table};

use crate::delimited::{parse_table, read_all, Layout};
use crate::{LoadError, LoadResult};

const RSR_LAYOUT: Layout = Layout { skip_lines: 8, comments: false };

/// Load one `.rsr` file.
pub fn load_rsr_path(path: &Path) -> LoadResult<Table> {
    if !path.exists() {
        return Err(LoadError::NotFound(path.to_path_buf()));
    }
    let text = std::fs::read_to_string(path)
        .map_err(|source| LoadError::Io { path: path.to_path_buf(), source })?;
    let table = parse_table(&text, &path.display().to_string(), RSR_LAYOUT, Strictness::Lenient)?;
    log::info!("loaded {} travel-time records from {}", table.len(), path.display());
    Ok(table)
}

/// Like [`load_rsr_path`] but accepts any `Read` source.
pub fn load_rsr_reader<R: Read>(reader: R) -> LoadResult<Table> {
    let text = read_all(reader, "<reader>")?;
    parse_table(&text, "<reader>", RSR_LAYOUT, Strictness::Lenient)
}
