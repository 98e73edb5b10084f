//! Writing credential tables.
//!
//! Column order is fixed by the field order of [`Record`]:
//! `source_file,timestamp,ip,username,password`. An empty record set never
//! produces a file.
use std::io::Write;
use std::path::Path;

use anyhow::{Context, Result};
use csv::Writer;
use log::warn;

use crate::record::{COLUMNS, Record};

/// Serialize records with a header row. Returns the number of rows written.
pub fn write_records<W: Write>(records: &[Record], writer: W) -> Result<usize> {
    let mut wtr = Writer::from_writer(writer);
    wtr.write_record(COLUMNS)?;
    for r in records {
        wtr.write_record([
            r.source_file.as_str(),
            r.timestamp.as_str(),
            r.ip.as_str(),
            r.username.as_str(),
            r.password.as_str(),
        ])?;
    }
    wtr.flush()?;
    Ok(records.len())
}

/// Write `records` to `path`. Returns `Ok(None)` without touching the
/// filesystem when there is nothing to write.
pub fn save_records_csv<P: AsRef<Path>>(records: &[Record], path: P) -> Result<Option<usize>> {
    let path = path.as_ref();
    if records.is_empty() {
        warn!("no records to export; {} not written", path.display());
        return Ok(None);
    }
    let file =
        std::fs::File::create(path).with_context(|| format!("create {}", path.display()))?;
    let n = write_records(records, file).with_context(|| format!("write {}", path.display()))?;
    Ok(Some(n))
}
