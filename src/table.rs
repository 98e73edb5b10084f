//! Reading previously exported credential tables.
//!
//! A table must expose every column in [`COLUMNS`]; extra columns are
//! ignored. Any decode failure makes the whole table unusable.
use std::fs::File;
use std::io::Read;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result, bail};
use glob::MatchOptions;

use crate::record::{COLUMNS, Record};

#[derive(Debug, thiserror::Error)]
pub enum TableError {
    #[error("cannot open: {0}")]
    Io(#[from] std::io::Error),
    #[error("malformed csv: {0}")]
    Csv(#[from] csv::Error),
    #[error("missing required columns: {}", .0.join(", "))]
    MissingColumns(Vec<String>),
}

/// Decode all rows of one table, validating the header first.
pub fn read_table<R: Read>(reader: R) -> Result<Vec<Record>, TableError> {
    let mut rdr = csv::Reader::from_reader(reader);
    let headers = rdr.headers()?.clone();
    let missing: Vec<String> = COLUMNS
        .iter()
        .filter(|col| !headers.iter().any(|h| h == **col))
        .map(|col| col.to_string())
        .collect();
    if !missing.is_empty() {
        return Err(TableError::MissingColumns(missing));
    }
    let mut records = Vec::new();
    for row in rdr.deserialize::<Record>() {
        records.push(row?);
    }
    Ok(records)
}

pub fn read_table_path<P: AsRef<Path>>(path: P) -> Result<Vec<Record>, TableError> {
    let file = File::open(path)?;
    read_table(file)
}

const LIST_OPTIONS: MatchOptions = MatchOptions {
    case_sensitive: true,
    require_literal_separator: false,
    require_literal_leading_dot: true,
};

/// List visible files in `dir` with the given extension, sorted by path.
/// Dot-files are not matched.
pub fn list_files_with_extension<P: AsRef<Path>>(dir: P, extension: &str) -> Result<Vec<PathBuf>> {
    let dir = dir.as_ref();
    let Some(dir_str) = dir.to_str() else {
        bail!("directory path is not valid UTF-8: {}", dir.display());
    };
    let escaped = glob::Pattern::escape(dir_str);
    let pattern = format!("{}/*.{}", escaped.trim_end_matches('/'), extension);
    let mut paths = Vec::new();
    for entry in glob::glob_with(&pattern, LIST_OPTIONS)
        .with_context(|| format!("bad pattern {pattern}"))?
    {
        let path = entry.with_context(|| format!("list {}", dir.display()))?;
        if path.is_file() {
            paths.push(path);
        }
    }
    paths.sort();
    Ok(paths)
}

/// File name used as the `source_file` column and in diagnostics.
pub fn display_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}
