use std::fs::File;
use std::io::BufReader;
use std::path::Path;
use std::time::Instant;

use sessionize_logging::{LogEvent, Logger};
use tracing::{info, warn};

use crate::config::Config;
use crate::error::{Result, SessionizeError};
use crate::loader::read_records;
use crate::segmenter::{session_count, Segmenter};
use crate::types::{LoadedLog, RunSummary};
use crate::writer::TableWriter;

/// Open `path` and load every row from it.
pub fn load_input(path: &Path, columns: Option<usize>) -> Result<LoadedLog> {
    let read_err = |source: std::io::Error| SessionizeError::ReadInput {
        path: path.to_path_buf(),
        source,
    };

    let file = File::open(path).map_err(read_err)?;
    read_records(BufReader::new(file), columns).map_err(read_err)
}

/// Load, segment and write one access log.
///
/// The input is fully read before anything is written, and the output is
/// only replaced once the whole table has been written.
pub fn run(config: &Config, logger: &Logger) -> Result<RunSummary> {
    config.validate()?;
    let started = Instant::now();

    logger.log(&LogEvent::RunStarted {
        input: config.input.clone(),
        output: config.output.clone(),
        timeout_minutes: config.timeout_minutes,
    });
    info!(
        input = %config.input.display(),
        output = %config.output.display(),
        timeout_minutes = config.timeout_minutes,
        "Starting run"
    );

    let loaded = load_input(&config.input, config.columns)?;
    let report = loaded.report;
    logger.log(&LogEvent::InputLoaded {
        lines_read: report.lines_read,
        records: report.records,
        dropped: report.dropped,
    });
    if report.dropped > 0 {
        warn!(dropped = report.dropped, "Dropped malformed lines");
    }

    let enriched = Segmenter::new(config.timeout()).segment(loaded.records);
    let sessions = session_count(&enriched);
    logger.log(&LogEvent::SessionsAssigned {
        records: enriched.len(),
        sessions,
    });

    TableWriter::new(config.delimiter).write_file(&config.output, &enriched)?;
    logger.log(&LogEvent::OutputWritten {
        path: config.output.clone(),
        rows: enriched.len(),
    });

    let duration_secs = started.elapsed().as_secs_f64();
    logger.log(&LogEvent::RunCompleted {
        rows: enriched.len(),
        sessions,
        duration_secs,
    });
    info!(rows = enriched.len(), sessions, "Run completed");

    Ok(RunSummary {
        input: config.input.clone(),
        output: config.output.clone(),
        rows_written: enriched.len(),
        lines_dropped: report.dropped,
        sessions,
        timeout_minutes: config.timeout_minutes,
        duration_secs,
    })
}
