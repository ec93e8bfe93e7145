//! # sessionize-core
//!
//! Adds `session` and `visit` columns to a web-server access log.
//!
//! Rows are grouped by client identity (ip + user agent); a client's rows
//! belong to one session until two consecutive requests are further apart
//! than the inactivity timeout. `visit` numbers the rows of a session in
//! time order. Output rows keep the input order.
//!
//! ## Key Types
//!
//! - [`Config`] - Resolved run settings
//! - [`LogRecord`] / [`EnrichedRecord`] - Parsed and enriched rows
//! - [`Segmenter`] - Session and visit assignment
//! - [`TableWriter`] - Delimited output with atomic replace
//!
//! ## Usage
//!
//! ```rust,ignore
//! use sessionize_core::{run, Config};
//! use sessionize_logging::{LogFormat, Logger};
//!
//! let config = Config::new("access.log", "sessions.csv").with_timeout_minutes(30);
//! let summary = run(&config, &Logger::new(LogFormat::Compact))?;
//! println!("{} sessions", summary.sessions);
//! ```

mod config;
mod error;
mod loader;
pub mod parser;
mod pipeline;
mod segmenter;
pub mod tokenizer;
mod types;
mod writer;

pub use config::{
    Config, DEFAULT_DELIMITER, DEFAULT_INPUT, DEFAULT_OUTPUT, DEFAULT_TIMEOUT_MINUTES,
};
pub use error::{Result, SessionizeError};
pub use loader::read_records;
pub use parser::{parse_record, sentinel_time};
pub use pipeline::{load_input, run};
pub use segmenter::{session_count, Segmenter};
pub use tokenizer::{tokenize, TokenizeError};
pub use types::{EnrichedRecord, LoadReport, LoadedLog, LogRecord, RunSummary};
pub use writer::{TableWriter, HEADER, TIME_OUTPUT_FORMAT};
