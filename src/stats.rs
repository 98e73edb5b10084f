//! Per-run counters collected by both pipelines and rendered by `report`.

/// Records contributed by one input file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileCount {
    pub name: String,
    pub records: usize,
}

/// An input file that contributed nothing because it could not be used.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SkippedFile {
    pub name: String,
    pub reason: String,
}

#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct RunStats {
    pub files: Vec<FileCount>,
    pub skipped: Vec<SkippedFile>,
    pub before_dedup: usize,
    pub after_dedup: usize,
    pub unparsed_timestamps: usize,
}

impl RunStats {
    pub fn record_file(&mut self, name: impl Into<String>, records: usize) {
        self.files.push(FileCount {
            name: name.into(),
            records,
        });
    }

    pub fn record_skip(&mut self, name: impl Into<String>, reason: impl ToString) {
        self.skipped.push(SkippedFile {
            name: name.into(),
            reason: reason.to_string(),
        });
    }

    pub fn duplicates_removed(&self) -> usize {
        self.before_dedup.saturating_sub(self.after_dedup)
    }
}
