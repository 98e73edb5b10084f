//! Human-readable run summaries for terminal output.
//!
//! Lists per-file record counts (and skip reasons), then before/after
//! deduplication totals.
use std::path::Path;

use colored::*;

use crate::stats::RunStats;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Pipeline {
    Extract,
    Merge,
}

impl Pipeline {
    fn title(self) -> &'static str {
        match self {
            Pipeline::Extract => "LogCred: Credential Extraction Results",
            Pipeline::Merge => "LogCred: Table Merge Results",
        }
    }
}

/// Printable width of `s`, skipping SGR escapes such as `\x1b[1;36m`.
fn visible_len(s: &str) -> usize {
    let mut width = 0;
    let mut in_escape = false;
    for ch in s.chars() {
        match (in_escape, ch) {
            (false, '\u{1b}') => in_escape = true,
            (false, _) => width += 1,
            (true, 'm') => in_escape = false,
            (true, _) => {}
        }
    }
    width
}

/// Blank line, title, an underline as wide as the visible title, blank line.
fn section_header(title: &str) -> String {
    let rule = "─".repeat(visible_len(title));
    format!("\n{title}\n{rule}\n\n")
}

fn push_section(out: &mut String, title: ColoredString, lines: Vec<String>) {
    out.push_str(&section_header(&title.to_string()));
    for line in lines {
        out.push_str(&line);
        out.push('\n');
    }
}

pub fn render_summary(pipeline: Pipeline, stats: &RunStats) -> String {
    let mut out = String::new();
    out.push_str(&format!("{}\n", pipeline.title().bold().cyan()));

    let mut file_lines: Vec<String> = Vec::new();
    for f in &stats.files {
        let unit = if f.records == 1 { "record" } else { "records" };
        file_lines.push(format!("  {}: {} {}", f.name, f.records, unit));
    }
    for s in &stats.skipped {
        file_lines.push(format!(
            "  {}: {} ({})",
            s.name,
            "skipped".red(),
            s.reason
        ));
    }
    if file_lines.is_empty() {
        file_lines.push("(No input files)".to_string());
    }
    push_section(&mut out, "Input Files".bold().cyan(), file_lines);

    let mut dedup_lines = vec![
        format!("  Before: {}", stats.before_dedup),
        format!("  After: {}", stats.after_dedup),
        format!("  Removed: {}", stats.duplicates_removed()),
    ];
    if pipeline == Pipeline::Merge {
        let n = stats.unparsed_timestamps;
        let value = if n > 0 {
            n.to_string().yellow().to_string()
        } else {
            n.to_string()
        };
        dedup_lines.push(format!("  Unconvertible Timestamps: {}", value));
    }
    push_section(&mut out, "Deduplication".bold().cyan(), dedup_lines);

    out
}

/// One-line outcome of the export step.
pub fn render_export(path: &Path, written: Option<usize>) -> String {
    match written {
        Some(n) => format!(
            "{} {} records to {}",
            "Exported".bold().green(),
            n,
            path.display()
        ),
        None => format!(
            "{} no records survived; {} was not written",
            "Nothing to export:".bold().yellow(),
            path.display()
        ),
    }
}
