//! Shared semicolon-delimited parser behind the `.att` and `.rsr` loaders.

use std::io::Read;

use vp_core::{find_collisions, normalize_columns, Strictness, Table, Value};

use crate::{LoadError, LoadResult};

/// How many leading lines to drop and whether `*` lines are comments.
pub(crate) struct Layout {
    pub skip_lines: usize,
    pub comments:   bool,
}

pub(crate) fn parse_table(
    text: &str,
    source_name: &str,
    layout: Layout,
    strictness: Strictness,
) -> LoadResult<Table> {
    let body = skip_lines(text, layout.skip_lines);

    let mut reader = csv::ReaderBuilder::new()
        .delimiter(b';')
        .comment(layout.comments.then_some(b'*'))
        .flexible(true)
        .has_headers(true)
        .from_reader(body.as_bytes());

    let mut raw_headers: Vec<String> = reader.headers()?.iter().map(str::to_owned).collect();
    // A trailing ';' produces one empty header.
    while raw_headers.last().is_some_and(|h| h.trim().is_empty()) {
        raw_headers.pop();
    }
    if raw_headers.is_empty() {
        return Err(LoadError::MissingHeader { source_name: source_name.to_owned() });
    }

    let columns = normalize_columns(&raw_headers);
    let collisions = find_collisions(&columns);
    if !collisions.is_empty() {
        if strictness.is_strict() {
            return Err(LoadError::DuplicateColumn(collisions));
        }
        log::warn!(
            "{source_name}: headers normalize to duplicate names {collisions:?}; later columns take precedence"
        );
    }

    let width = columns.len();
    let mut table = Table::new(columns);
    for record in reader.records() {
        let record = record?;
        let mut row: Vec<Value> = record.iter().take(width).map(Value::parse).collect();
        row.resize(width, Value::Empty);
        table.push_row(row)?;
    }

    if table.is_empty() {
        return Err(LoadError::Empty(source_name.to_owned()));
    }
    log::debug!("{source_name}: {} rows × {} columns", table.len(), width);
    Ok(table)
}

pub(crate) fn read_all<R: Read>(mut reader: R, source_name: &str) -> LoadResult<String> {
    let mut text = String::new();
    reader
        .read_to_string(&mut text)
        .map_err(|source| LoadError::Io { path: source_name.into(), source })?;
    Ok(text)
}

fn skip_lines(text: &str, n: usize) -> &str {
    let mut rest = text;
    for _ in 0..n {
        match rest.split_once('\n') {
            Some((_, tail)) => rest = tail,
            None => return "",
        }
    }
    rest
}
