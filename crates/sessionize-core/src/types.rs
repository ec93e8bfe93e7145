use chrono::{DateTime, FixedOffset};
use serde::Serialize;
use std::path::PathBuf;

/// One parsed access-log line.
///
/// `index` is the position of the row among the rows kept by the loader and
/// is what restores input order after segmentation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogRecord {
    pub index: usize,
    pub ip: Option<String>,
    pub time: DateTime<FixedOffset>,
    pub request: String,
    pub status: i64,
    pub size: i64,
    pub referer: String,
    pub user_agent: String,
}

impl LogRecord {
    /// True when both records come from the same client (ip + user agent).
    pub fn same_identity(&self, other: &LogRecord) -> bool {
        self.ip == other.ip && self.user_agent == other.user_agent
    }
}

/// A record with its session id and its 1-based position in that session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EnrichedRecord {
    pub record: LogRecord,
    pub session: usize,
    pub visit: usize,
}

impl EnrichedRecord {
    pub fn starts_session(&self) -> bool {
        self.visit == 1
    }
}

/// Counters collected while loading the input.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct LoadReport {
    /// Non-blank lines seen
    pub lines_read: usize,
    /// Rows turned into records
    pub records: usize,
    /// Rows rejected by tokenization or width check
    pub dropped: usize,
    /// Token count a row needed to be kept (None if no row tokenized)
    pub expected_columns: Option<usize>,
}

/// Records loaded from one input, in input order.
#[derive(Debug, Clone, Default)]
pub struct LoadedLog {
    pub records: Vec<LogRecord>,
    pub report: LoadReport,
}

/// What a completed run did.
#[derive(Debug, Clone, Serialize)]
pub struct RunSummary {
    pub input: PathBuf,
    pub output: PathBuf,
    pub rows_written: usize,
    pub lines_dropped: usize,
    pub sessions: usize,
    pub timeout_minutes: i64,
    pub duration_secs: f64,
}
