//! Session segmentation.
//!
//! Records are sorted by identity (ip, user agent) and time, walked once to
//! assign session ids and visit numbers, then put back in input order using
//! the index each record carries.

use std::cmp::Ordering;

use chrono::Duration;
use tracing::debug;

use crate::types::{EnrichedRecord, LogRecord};

/// Missing ips sort after every present one.
fn cmp_ip(a: &Option<String>, b: &Option<String>) -> Ordering {
    match (a, b) {
        (Some(a), Some(b)) => a.cmp(b),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}

fn cmp_identity_time(a: &LogRecord, b: &LogRecord) -> Ordering {
    cmp_ip(&a.ip, &b.ip)
        .then_with(|| a.user_agent.cmp(&b.user_agent))
        .then_with(|| a.time.cmp(&b.time))
}

/// Splits per-client activity into sessions separated by an inactivity timeout.
#[derive(Debug, Clone, Copy)]
pub struct Segmenter {
    timeout: Duration,
}

impl Segmenter {
    pub fn new(timeout: Duration) -> Self {
        Self { timeout }
    }

    pub fn from_minutes(minutes: i64) -> Self {
        Self::new(Duration::minutes(minutes))
    }

    /// True if `current` cannot continue the session `previous` belongs to.
    /// `previous` is the record right before `current` in sorted order.
    fn starts_session(&self, previous: Option<&LogRecord>, current: &LogRecord) -> bool {
        match previous {
            None => true,
            Some(previous) => {
                !previous.same_identity(current)
                    || current.time.signed_duration_since(previous.time) > self.timeout
            }
        }
    }

    /// Assign session and visit to every record.
    ///
    /// The result is ordered by `LogRecord::index`, which for loader output is
    /// the input order. Equal (ip, user agent, time) keys keep their input
    /// order, so the earlier row gets the lower visit number.
    pub fn segment(&self, mut records: Vec<LogRecord>) -> Vec<EnrichedRecord> {
        // sort_by is stable; index breaks ties for callers passing shuffled input
        records.sort_by(|a, b| cmp_identity_time(a, b).then_with(|| a.index.cmp(&b.index)));

        let mut enriched: Vec<EnrichedRecord> = Vec::with_capacity(records.len());
        let mut session = 0usize;
        let mut visit = 0usize;

        for record in records {
            let previous = enriched.last().map(|e| &e.record);
            if self.starts_session(previous, &record) {
                session += 1;
                visit = 0;
            }
            visit += 1;
            enriched.push(EnrichedRecord {
                record,
                session,
                visit,
            });
        }

        enriched.sort_by_key(|e| e.record.index);
        debug!(records = enriched.len(), sessions = session, "Assigned sessions");
        enriched
    }
}

/// Number of distinct sessions in segmenter output.
pub fn session_count(enriched: &[EnrichedRecord]) -> usize {
    enriched.iter().map(|e| e.session).max().unwrap_or(0)
}
