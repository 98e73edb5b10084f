//! Extraction pipeline: log files -> records -> first-seen deduplication.
//!
//! [`Extractor`] owns everything one run accumulates: the record sequence
//! and the run statistics. Files are consumed one at a
//! time in the order given; a file that cannot be read is reported and
//! skipped without affecting the others.
//!
//! ```no_run
//! use logcred::extract::Extractor;
//! use logcred::io::DEFAULT_MMAP_THRESHOLD_BYTES;
//! # fn main() -> anyhow::Result<()> {
//! let mut ex = Extractor::new();
//! ex.load_from_dir(".", DEFAULT_MMAP_THRESHOLD_BYTES)?;
//! ex.deduplicate();
//! logcred::export::save_records_csv(&ex.records, "out.csv")?;
//! # Ok(())
//! # }
//! ```
use std::path::Path;

use anyhow::Result;
use log::{error, info};

use crate::dedup::{Deduplicate, FirstSeen};
use crate::io::{DEFAULT_MMAP_THRESHOLD_BYTES, iter_lines_auto};
use crate::logline::{parse_log_contents, parse_log_line};
use crate::record::Record;
use crate::stats::RunStats;
use crate::table::{display_name, list_files_with_extension};

pub const LOG_EXTENSION: &str = "log";

#[derive(Debug, thiserror::Error)]
pub enum LogFileError {
    #[error("{0:#}")]
    Open(anyhow::Error),
    #[error("read failed at line {line}: {source}")]
    Read { line: usize, source: std::io::Error },
}

/// Parse every matching line of one file. Any read error discards the file.
pub fn scan_log_file<P: AsRef<Path>>(
    path: P,
    mmap_threshold_bytes: u64,
) -> Result<Vec<Record>, LogFileError> {
    let path = path.as_ref();
    let name = display_name(path);
    let lines = iter_lines_auto(path, mmap_threshold_bytes).map_err(LogFileError::Open)?;
    let mut records = Vec::new();
    for (idx, line) in lines.enumerate() {
        let line = line.map_err(|source| LogFileError::Read {
            line: idx + 1,
            source,
        })?;
        if let Some(r) = parse_log_line(&name, &line) {
            records.push(r);
        }
    }
    Ok(records)
}

#[derive(Debug, Default)]
pub struct Extractor {
    pub records: Vec<Record>,
    pub stats: RunStats,
}

impl Extractor {
    pub fn new() -> Self {
        Self::default()
    }

    /// Ingest in-memory log contents as if read from `source_file`.
    pub fn load_from_strings(&mut self, inputs: &[(&str, &str)]) {
        for (source_file, contents) in inputs {
            let records = parse_log_contents(source_file, contents);
            self.accept(source_file, records);
        }
    }

    /// Read each path in order. Unreadable files are logged and recorded as
    /// skipped.
    pub fn load_from_file_paths_with_threshold<P: AsRef<Path>>(
        &mut self,
        paths: &[P],
        mmap_threshold_bytes: u64,
    ) {
        for p in paths {
            let name = display_name(p.as_ref());
            info!("processing {}", name);
            match scan_log_file(p, mmap_threshold_bytes) {
                Ok(records) => self.accept(&name, records),
                Err(e) => {
                    error!("failed to process {}: {}", p.as_ref().display(), e);
                    self.stats.record_skip(name, e);
                }
            }
        }
    }

    pub fn load_from_file_paths<P: AsRef<Path>>(&mut self, paths: &[P]) {
        self.load_from_file_paths_with_threshold(paths, DEFAULT_MMAP_THRESHOLD_BYTES)
    }

    /// Load every `*.log` file in `dir`, in sorted path order. Returns the
    /// number of files found.
    pub fn load_from_dir<P: AsRef<Path>>(&mut self, dir: P, mmap_threshold_bytes: u64) -> Result<usize> {
        let paths = list_files_with_extension(dir, LOG_EXTENSION)?;
        self.load_from_file_paths_with_threshold(&paths, mmap_threshold_bytes);
        Ok(paths.len())
    }

    fn accept(&mut self, name: &str, records: Vec<Record>) {
        info!("extracted {} records from {}", records.len(), name);
        self.stats.record_file(name, records.len());
        self.stats.before_dedup += records.len();
        self.records.extend(records);
    }

    /// Apply first-seen deduplication to everything loaded so far. Kept
    /// records stay ahead of anything loaded after a previous call, so
    /// calling this again only drops newly loaded duplicates.
    pub fn deduplicate(&mut self) -> &[Record] {
        let all = std::mem::take(&mut self.records);
        self.records = FirstSeen::new().deduplicate(all);
        self.stats.after_dedup = self.records.len();
        info!(
            "deduplicated {} records down to {}",
            self.stats.before_dedup, self.stats.after_dedup
        );
        &self.records
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;

    #[test]
    fn same_pair_from_different_ip_and_time_collapses() {
        let mut ex = Extractor::new();
        ex.load_from_strings(&[(
            "auth.log",
            "[Mon Jan 02 15:04:05 2024] 10.0.0.1 alice secret\n[Mon Jan 02 15:04:06 2024] 10.0.0.2 alice secret\n",
        )]);
        let out = ex.deduplicate();
        assert_eq!(out.len(), 1);
        assert_eq!(out[0].ip, "10.0.0.1");
        assert_eq!(out[0].timestamp, "2024-01-02 15:04:05");
        assert_eq!(ex.stats.before_dedup, 2);
        assert_eq!(ex.stats.after_dedup, 1);
    }

    #[test]
    fn traversal_order_decides_not_timestamp() {
        let mut ex = Extractor::new();
        ex.load_from_strings(&[
            ("a.log", "[Mon Jan 02 15:04:05 2024] 10.0.0.1 alice secret"),
            ("b.log", "[Mon Jan 01 00:00:00 2024] 10.0.0.9 alice secret"),
        ]);
        let out = ex.deduplicate();
        assert_eq!(out.len(), 1);
        assert_eq!(out[0].source_file, "a.log");
    }

    #[test]
    fn unreadable_file_is_skipped_and_others_processed() {
        let dir = tempdir().unwrap();
        let good = dir.path().join("good.log");
        fs::write(&good, "[Mon Jan 02 15:04:05 2024] 10.0.0.1 bob pw\n").unwrap();
        let missing = dir.path().join("gone.log");

        let mut ex = Extractor::new();
        ex.load_from_file_paths(&[missing, good]);
        assert_eq!(ex.records.len(), 1);
        assert_eq!(ex.records[0].source_file, "good.log");
        assert_eq!(ex.stats.skipped.len(), 1);
        assert_eq!(ex.stats.skipped[0].name, "gone.log");
        assert_eq!(ex.stats.files.len(), 1);
    }

    #[test]
    fn repeated_deduplicate_keeps_survivors() {
        let mut ex = Extractor::new();
        ex.load_from_strings(&[("a.log", "[Mon Jan 02 15:04:05 2024] 10.0.0.1 alice secret")]);
        assert_eq!(ex.deduplicate().len(), 1);
        assert_eq!(ex.deduplicate().len(), 1);
        assert_eq!(ex.records[0].username, "alice");
        assert_eq!(ex.stats.after_dedup, 1);
    }

    #[test]
    fn load_between_deduplicate_calls_extends_result() {
        let mut ex = Extractor::new();
        ex.load_from_strings(&[("a.log", "[Mon Jan 02 15:04:05 2024] 10.0.0.1 alice secret")]);
        ex.deduplicate();
        ex.load_from_strings(&[(
            "b.log",
            "[Mon Jan 02 15:05:00 2024] 10.0.0.2 bob pw\n[Mon Jan 02 15:06:00 2024] 10.0.0.3 alice secret\n",
        )]);
        let names: Vec<&str> = ex.deduplicate().iter().map(|r| r.username.as_str()).collect();
        assert_eq!(names, vec!["alice", "bob"]);
        assert_eq!(ex.records[0].source_file, "a.log");
        assert_eq!(ex.stats.before_dedup, 3);
        assert_eq!(ex.stats.after_dedup, 2);
    }

    #[test]
    fn read_failure_mid_file_skips_that_file() {
        let dir = tempdir().unwrap();
        // Opening a directory succeeds on unix; the first read fails.
        let not_a_file = dir.path().join("dir.log");
        fs::create_dir(&not_a_file).unwrap();
        let good = dir.path().join("good.log");
        fs::write(&good, "[Mon Jan 02 15:04:05 2024] 10.0.0.1 bob pw\n").unwrap();

        match scan_log_file(&not_a_file, u64::MAX) {
            Err(LogFileError::Read { line, .. }) => assert_eq!(line, 1),
            other => panic!("unexpected: {other:?}"),
        }

        let mut ex = Extractor::new();
        ex.load_from_file_paths_with_threshold(&[not_a_file, good], u64::MAX);
        assert_eq!(ex.records.len(), 1);
        assert_eq!(ex.stats.skipped[0].name, "dir.log");
        assert!(ex.stats.skipped[0].reason.starts_with("read failed at line 1"));
    }

    #[test]
    fn load_from_dir_reads_logs_in_name_order() {
        let dir = tempdir().unwrap();
        fs::write(
            dir.path().join("b.log"),
            "[Mon Jan 02 15:04:05 2024] 10.0.0.2 alice secret\n",
        )
        .unwrap();
        fs::write(
            dir.path().join("a.log"),
            "noise\n[Mon Jan 02 15:04:09 2024] 10.0.0.1 alice secret\n",
        )
        .unwrap();
        fs::write(dir.path().join("ignored.txt"), "[x] 1.1.1.1 eve pw\n").unwrap();

        let mut ex = Extractor::new();
        assert_eq!(ex.load_from_dir(dir.path(), 0).unwrap(), 2);
        let out = ex.deduplicate();
        assert_eq!(out.len(), 1);
        assert_eq!(out[0].source_file, "a.log");
        assert_eq!(ex.stats.files[0].name, "a.log");
        assert_eq!(ex.stats.files[1].name, "b.log");
    }
}
