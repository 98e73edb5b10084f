//! Record data model shared by the extraction and merge pipelines.
//!
//! A [`Record`] is one credential observation. Its identity for
//! deduplication is the [`CredentialKey`] (`username`, `password`), not the
//! full tuple: the same pair seen from a different IP or at a different time
//! is a duplicate.
use serde::Deserialize;

/// Column order used for every table this crate writes, and the set of
/// columns every table it reads must expose.
pub const COLUMNS: [&str; 5] = ["source_file", "timestamp", "ip", "username", "password"];

/// One extracted credential observation.
///
/// Field names match [`COLUMNS`]; tables are decoded by header name.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Record {
    pub source_file: String,
    pub timestamp: String,
    pub ip: String,
    pub username: String,
    pub password: String,
}

/// Deduplication key: the (username, password) pair.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CredentialKey {
    pub username: String,
    pub password: String,
}

impl Record {
    pub fn new(
        source_file: impl Into<String>,
        timestamp: impl Into<String>,
        ip: impl Into<String>,
        username: impl Into<String>,
        password: impl Into<String>,
    ) -> Self {
        Self {
            source_file: source_file.into(),
            timestamp: timestamp.into(),
            ip: ip.into(),
            username: username.into(),
            password: password.into(),
        }
    }

    pub fn key(&self) -> CredentialKey {
        CredentialKey {
            username: self.username.clone(),
            password: self.password.clone(),
        }
    }
}
