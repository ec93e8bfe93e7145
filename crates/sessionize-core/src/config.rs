use chrono::Duration;
use std::path::PathBuf;

use crate::error::{Result, SessionizeError};
use crate::parser::columns::MIN_FIELDS;

pub const DEFAULT_INPUT: &str = "in.txt";
pub const DEFAULT_OUTPUT: &str = "out.txt";
pub const DEFAULT_TIMEOUT_MINUTES: i64 = 30;
pub const DEFAULT_DELIMITER: char = ',';

/// Resolved settings for one run. Built once at startup and never mutated.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub input: PathBuf,
    pub output: PathBuf,
    /// Inactivity gap (minutes) after which the same client starts a new session
    pub timeout_minutes: i64,
    /// Output field delimiter
    pub delimiter: char,
    /// Most tokens a line may have to be kept; inferred from the first kept line when None
    pub columns: Option<usize>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            input: PathBuf::from(DEFAULT_INPUT),
            output: PathBuf::from(DEFAULT_OUTPUT),
            timeout_minutes: DEFAULT_TIMEOUT_MINUTES,
            delimiter: DEFAULT_DELIMITER,
            columns: None,
        }
    }
}

impl Config {
    pub fn new(input: impl Into<PathBuf>, output: impl Into<PathBuf>) -> Self {
        Self {
            input: input.into(),
            output: output.into(),
            ..Self::default()
        }
    }

    pub fn with_timeout_minutes(mut self, minutes: i64) -> Self {
        self.timeout_minutes = minutes;
        self
    }

    pub fn with_delimiter(mut self, delimiter: char) -> Self {
        self.delimiter = delimiter;
        self
    }

    pub fn with_columns(mut self, columns: usize) -> Self {
        self.columns = Some(columns);
        self
    }

    pub fn timeout(&self) -> Duration {
        Duration::minutes(self.timeout_minutes)
    }

    /// Reject settings the pipeline cannot honour.
    pub fn validate(&self) -> Result<()> {
        if self.timeout_minutes <= 0 || Duration::try_minutes(self.timeout_minutes).is_none() {
            return Err(SessionizeError::InvalidConfig(format!(
                "timeout must be a positive number of minutes, got {}",
                self.timeout_minutes
            )));
        }
        if !self.delimiter.is_ascii() || matches!(self.delimiter, '"' | '\r' | '\n') {
            return Err(SessionizeError::InvalidConfig(format!(
                "delimiter must be a single ASCII character other than a quote or newline, got {:?}",
                self.delimiter
            )));
        }
        if let Some(columns) = self.columns.filter(|c| *c < MIN_FIELDS) {
            return Err(SessionizeError::InvalidConfig(format!(
                "columns must be at least {}, got {}",
                MIN_FIELDS, columns
            )));
        }
        if self.input == self.output {
            return Err(SessionizeError::InvalidConfig(format!(
                "input and output must differ: {:?}",
                self.input
            )));
        }
        Ok(())
    }
}
