//! Deduplication policies over [`Record`] sequences.
//!
//! Both policies key on the credential pair. [`FirstSeen`] is order-based:
//! the first record in traversal order wins. [`EarliestTimestamp`] is
//! value-based: the record with the smallest timestamp wins regardless of
//! which file it came from, ties going to the earlier input position.
use std::collections::HashSet;

use chrono::NaiveDateTime;
use log::warn;

use crate::record::{CredentialKey, Record};
use crate::timestamp::{format_instant, parse_instant};

pub trait Deduplicate {
    /// Reduce `records` to one per credential pair, preserving the order of
    /// kept records as defined by the policy.
    fn deduplicate(&mut self, records: Vec<Record>) -> Vec<Record>;
}

/// Keep the first record per key in input order.
///
/// The seen-key set lives on the value, so successive calls within one run
/// keep dropping pairs already emitted earlier.
#[derive(Debug, Default)]
pub struct FirstSeen {
    seen: HashSet<CredentialKey>,
}

impl FirstSeen {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns true the first time a key is offered.
    pub fn admit(&mut self, record: &Record) -> bool {
        self.seen.insert(record.key())
    }

    pub fn seen_count(&self) -> usize {
        self.seen.len()
    }
}

impl Deduplicate for FirstSeen {
    fn deduplicate(&mut self, records: Vec<Record>) -> Vec<Record> {
        records.into_iter().filter(|r| self.admit(r)).collect()
    }
}

/// Keep the chronologically earliest record per key.
///
/// Timestamps that parse are rewritten into the normalized form. Records
/// whose timestamp does not parse sort after every parsed record, in their
/// original relative order, and are counted in `unparsed`.
#[derive(Debug, Default)]
pub struct EarliestTimestamp {
    pub unparsed: usize,
}

impl EarliestTimestamp {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Deduplicate for EarliestTimestamp {
    fn deduplicate(&mut self, records: Vec<Record>) -> Vec<Record> {
        let mut keyed: Vec<(Option<NaiveDateTime>, Record)> = records
            .into_iter()
            .map(|mut r| {
                let instant = parse_instant(&r.timestamp);
                match instant {
                    Some(dt) => r.timestamp = format_instant(&dt),
                    None => {
                        self.unparsed += 1;
                        warn!(
                            "{}: cannot convert timestamp {:?} for {}; ordering it last",
                            r.source_file, r.timestamp, r.username
                        );
                    }
                }
                (instant, r)
            })
            .collect();

        // Stable: equal instants keep input order.
        keyed.sort_by_key(|(instant, _)| (instant.is_none(), *instant));

        let mut first = FirstSeen::new();
        keyed
            .into_iter()
            .map(|(_, r)| r)
            .filter(|r| first.admit(r))
            .collect()
    }
}
