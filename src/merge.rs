//! Merge pipeline: exported tables -> union -> earliest-timestamp
//! deduplication.
use std::path::Path;

use anyhow::Result;
use log::{info, warn};

use crate::dedup::{Deduplicate, EarliestTimestamp};
use crate::record::Record;
use crate::stats::RunStats;
use crate::table::{TableError, display_name, list_files_with_extension, read_table, read_table_path};

pub const TABLE_EXTENSION: &str = "csv";
pub const DEFAULT_OUTPUT_NAME: &str = "deduplicated_data.csv";

/// Accumulates rows from many tables for one merge run.
#[derive(Debug, Default)]
pub struct Merger {
    pub records: Vec<Record>,
    pub stats: RunStats,
}

impl Merger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Ingest in-memory tables keyed by a display name.
    pub fn load_from_strings(&mut self, tables: &[(&str, &str)]) {
        for (name, contents) in tables {
            let res = read_table(contents.as_bytes());
            self.accept(name, res);
        }
    }

    pub fn load_from_file_paths<P: AsRef<Path>>(&mut self, paths: &[P]) {
        for p in paths {
            let name = display_name(p.as_ref());
            info!("reading {}", name);
            self.accept(&name, read_table_path(p));
        }
    }

    /// Load every `*.csv` file in `dir`, in sorted path order. Returns the
    /// number of files found.
    pub fn load_from_dir<P: AsRef<Path>>(&mut self, dir: P) -> Result<usize> {
        let paths = list_files_with_extension(dir, TABLE_EXTENSION)?;
        self.load_from_file_paths(&paths);
        Ok(paths.len())
    }

    fn accept(&mut self, name: &str, res: Result<Vec<Record>, TableError>) {
        match res {
            Ok(records) => {
                info!("read {} rows from {}", records.len(), name);
                self.stats.record_file(name, records.len());
                self.stats.before_dedup += records.len();
                self.records.extend(records);
            }
            Err(e) => {
                warn!("skipping {}: {}", name, e);
                self.stats.record_skip(name, e);
            }
        }
    }

    /// Keep the earliest record per credential pair across all loaded tables.
    pub fn deduplicate(&mut self) -> &[Record] {
        let mut policy = EarliestTimestamp::new();
        let all = std::mem::take(&mut self.records);
        self.records = policy.deduplicate(all);
        self.stats.unparsed_timestamps += policy.unparsed;
        self.stats.after_dedup = self.records.len();
        if policy.unparsed > 0 {
            warn!(
                "{} timestamps could not be converted; those rows were ordered last",
                policy.unparsed
            );
        }
        info!(
            "merged {} rows down to {}",
            self.stats.before_dedup, self.stats.after_dedup
        );
        &self.records
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::export::save_records_csv;
    use std::fs;
    use tempfile::tempdir;

    const HEADER: &str = "source_file,timestamp,ip,username,password\n";

    #[test]
    fn earliest_occurrence_across_tables_wins() {
        let a = format!("{HEADER}a.log,2024-01-02 15:04:05,10.0.0.1,alice,secret\n");
        let b = format!("{HEADER}b.log,2024-01-02 15:04:00,10.0.0.2,alice,secret\n");
        let mut m = Merger::new();
        m.load_from_strings(&[("a.csv", a.as_str()), ("b.csv", b.as_str())]);
        let out = m.deduplicate();
        assert_eq!(out.len(), 1);
        assert_eq!(out[0].timestamp, "2024-01-02 15:04:00");
        assert_eq!(out[0].ip, "10.0.0.2");
        assert_eq!(m.stats.before_dedup, 2);
        assert_eq!(m.stats.after_dedup, 1);
    }

    #[test]
    fn table_missing_columns_is_excluded_but_sibling_is_used() {
        let bad = "source_file,timestamp,ip,username\nx.log,2020-01-01 00:00:00,1.1.1.1,mallory\n";
        let good = format!("{HEADER}a.log,2024-01-02 15:04:05,10.0.0.1,alice,secret\n");
        let mut m = Merger::new();
        m.load_from_strings(&[("bad.csv", bad), ("good.csv", good.as_str())]);
        let out = m.deduplicate();
        assert_eq!(out.len(), 1);
        assert_eq!(out[0].username, "alice");
        assert_eq!(m.stats.skipped.len(), 1);
        assert_eq!(m.stats.skipped[0].name, "bad.csv");
        assert!(m.stats.skipped[0].reason.contains("password"));
    }

    #[test]
    fn unreadable_table_is_skipped_among_readable_ones() {
        let dir = tempdir().unwrap();
        let a = dir.path().join("a.csv");
        let b = dir.path().join("b.csv");
        fs::write(&a, format!("{HEADER}a.log,2024-01-02 15:04:05,10.0.0.1,alice,secret\n")).unwrap();
        fs::write(&b, format!("{HEADER}b.log,2024-01-02 15:04:00,10.0.0.2,bob,pw\n")).unwrap();
        let gone = dir.path().join("gone.csv");

        let mut m = Merger::new();
        m.load_from_file_paths(&[a, gone, b]);
        assert_eq!(m.records.len(), 2);
        assert_eq!(m.stats.files.len(), 2);
        assert_eq!(m.stats.skipped.len(), 1);
        assert_eq!(m.stats.skipped[0].name, "gone.csv");
        assert!(m.stats.skipped[0].reason.starts_with("cannot open"));
        assert!(matches!(read_table_path(dir.path().join("gone.csv")), Err(TableError::Io(_))));
    }

    #[test]
    fn unparsed_timestamps_are_counted() {
        let t = format!("{HEADER}a.log,someday,10.0.0.1,alice,secret\n");
        let mut m = Merger::new();
        m.load_from_strings(&[("t.csv", t.as_str())]);
        m.deduplicate();
        assert_eq!(m.stats.unparsed_timestamps, 1);
        assert_eq!(m.records[0].timestamp, "someday");
    }

    #[test]
    fn merging_own_output_is_stable() {
        let dir = tempdir().unwrap();
        fs::write(
            dir.path().join("1.csv"),
            format!("{HEADER}a.log,2024-01-02 15:04:05,10.0.0.1,alice,secret\na.log,Tue Jan 02 09:00:00 2024,10.0.0.1,bob,pw\n"),
        )
        .unwrap();
        fs::write(
            dir.path().join("2.csv"),
            format!("{HEADER}b.log,2024-01-02 15:04:00,10.0.0.2,alice,secret\nb.log,junk,10.0.0.3,carol,pw\n"),
        )
        .unwrap();

        let mut first = Merger::new();
        assert_eq!(first.load_from_dir(dir.path()).unwrap(), 2);
        first.deduplicate();
        let out = dir.path().join(DEFAULT_OUTPUT_NAME);
        save_records_csv(&first.records, &out).unwrap();

        let mut second = Merger::new();
        second.load_from_file_paths(&[&out]);
        second.deduplicate();
        assert_eq!(first.records, second.records);
        assert_eq!(
            first
                .records
                .iter()
                .map(|r| r.username.as_str())
                .collect::<Vec<_>>(),
            vec!["bob", "alice", "carol"]
        );
    }
}
