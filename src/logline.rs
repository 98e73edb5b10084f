//! Fixed-pattern matcher for authentication log lines.
//!
//! Expected shape: `[<timestamp>] <ipv4> <username> <password...>`. Lines
//! that do not match are not errors; most lines in a log are expected to
//! fall through.
use std::sync::LazyLock;

use regex::Regex;

use crate::record::Record;
use crate::timestamp::normalize_log_timestamp;

static LINE_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^\[(.*?)\] (\d+\.\d+\.\d+\.\d+) (\w+) (.+)").expect("line pattern compiles")
});

/// Match a single line; returns a record tagged with `source_file` on success.
pub fn parse_log_line(source_file: &str, line: &str) -> Option<Record> {
    let caps = LINE_PATTERN.captures(line)?;
    Some(Record::new(
        source_file,
        normalize_log_timestamp(&caps[1]),
        &caps[2],
        &caps[3],
        &caps[4],
    ))
}

pub fn parse_log_contents(source_file: &str, contents: &str) -> Vec<Record> {
    contents
        .lines()
        .filter_map(|line| parse_log_line(source_file, line))
        .collect()
}
