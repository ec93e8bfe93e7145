//! Field conversion for access-log rows.
//!
//! Every conversion here is total: a malformed field yields that field's
//! default and never fails the row.

use chrono::{DateTime, FixedOffset, Utc};

use crate::types::LogRecord;

/// Token that stands for a missing value in any column.
pub const NULL_MARKER: &str = "-";

/// Column positions (0-based) of the fields a record is built from.
pub mod columns {
    pub const IP: usize = 0;
    pub const TIME: usize = 3;
    pub const REQUEST: usize = 4;
    pub const STATUS: usize = 5;
    pub const SIZE: usize = 6;
    pub const REFERER: usize = 7;
    pub const USER_AGENT: usize = 8;

    /// Fewest fields a row may have: the common log format, through `SIZE`.
    pub const MIN_FIELDS: usize = SIZE + 1;
}

/// Layout of the timestamp once its brackets are stripped.
const TIME_FORMAT: &str = "%d/%b/%Y:%H:%M:%S %z";

/// Seconds from the Unix epoch to 0001-01-01T00:00:00Z.
const SENTINEL_EPOCH_SECS: i64 = -62_135_596_800;

/// Timestamp given to rows whose time cannot be parsed. Sorts before any real time.
pub fn sentinel_time() -> DateTime<FixedOffset> {
    DateTime::<Utc>::from_timestamp(SENTINEL_EPOCH_SECS, 0)
        .unwrap_or(DateTime::<Utc>::MIN_UTC)
        .fixed_offset()
}

/// Strip the first and last character. None when there are fewer than two.
fn strip_delimiters(field: &str) -> Option<&str> {
    let mut chars = field.chars();
    let first = chars.next()?;
    let last = chars.next_back()?;
    Some(&field[first.len_utf8()..field.len() - last.len_utf8()])
}

/// Parse `[13/Nov/2015:11:45:42 +0000]`, keeping the offset as written.
pub fn parse_time(field: Option<&str>) -> DateTime<FixedOffset> {
    field
        .and_then(strip_delimiters)
        .and_then(|inner| DateTime::<FixedOffset>::parse_from_str(inner, TIME_FORMAT).ok())
        .unwrap_or_else(sentinel_time)
}

/// Strip the quotes/brackets around a text field, empty on anything shorter.
pub fn parse_text(field: Option<&str>) -> String {
    field
        .and_then(strip_delimiters)
        .map(str::to_string)
        .unwrap_or_default()
}

pub fn parse_int(field: Option<&str>) -> i64 {
    field
        .and_then(|value| value.trim().parse::<i64>().ok())
        .unwrap_or(0)
}

/// Look up a column, treating out-of-range positions and `-` as missing.
fn field<'a>(tokens: &[&'a str], position: usize) -> Option<&'a str> {
    tokens
        .get(position)
        .copied()
        .filter(|token| *token != NULL_MARKER)
}

/// Build a record from a tokenized row.
pub fn parse_record(index: usize, tokens: &[&str]) -> LogRecord {
    LogRecord {
        index,
        ip: field(tokens, columns::IP).map(str::to_string),
        time: parse_time(field(tokens, columns::TIME)),
        request: parse_text(field(tokens, columns::REQUEST)),
        status: parse_int(field(tokens, columns::STATUS)),
        size: parse_int(field(tokens, columns::SIZE)),
        referer: parse_text(field(tokens, columns::REFERER)),
        user_agent: parse_text(field(tokens, columns::USER_AGENT)),
    }
}
