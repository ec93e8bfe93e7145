use colored::Colorize;
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

/// Run-level events emitted while enriching one access log
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum LogEvent {
    RunStarted {
        input: PathBuf,
        output: PathBuf,
        timeout_minutes: i64,
    },
    InputLoaded {
        lines_read: usize,
        records: usize,
        dropped: usize,
    },
    SessionsAssigned {
        records: usize,
        sessions: usize,
    },
    OutputWritten {
        path: PathBuf,
        rows: usize,
    },
    RunCompleted {
        rows: usize,
        sessions: usize,
        duration_secs: f64,
    },
    RunFailed {
        error: String,
    },
}

impl LogEvent {
    /// Add a timestamp to serialize with the event
    fn with_timestamp(&self) -> serde_json::Value {
        let mut value = serde_json::to_value(self).unwrap_or_default();
        if let Some(obj) = value.as_object_mut() {
            obj.insert(
                "timestamp".to_string(),
                serde_json::Value::String(chrono::Utc::now().to_rfc3339()),
            );
        }
        value
    }
}

/// Log output format
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum LogFormat {
    /// Human-readable format with colors
    #[default]
    Pretty,
    /// JSON lines format for machine consumption
    Json,
    /// Compact single-line format
    Compact,
}

impl std::str::FromStr for LogFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "pretty" => Ok(LogFormat::Pretty),
            "json" => Ok(LogFormat::Json),
            "compact" => Ok(LogFormat::Compact),
            _ => Err(format!("Unknown log format: {}", s)),
        }
    }
}

/// Logger for sessionize events - console output plus an optional JSON lines file
pub struct Logger {
    format: LogFormat,
    file_writer: Option<Mutex<File>>,
}

impl Logger {
    pub fn new(format: LogFormat) -> Self {
        Self {
            format,
            file_writer: None,
        }
    }

    /// Create a logger that also appends every event to `log_path`
    pub fn with_file(format: LogFormat, log_path: &Path) -> std::io::Result<Self> {
        if let Some(parent) = log_path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let file = std::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(log_path)?;

        Ok(Self {
            format,
            file_writer: Some(Mutex::new(file)),
        })
    }

    pub fn log(&self, event: &LogEvent) {
        // File output is always JSON
        if let Some(ref writer) = self.file_writer {
            if let Ok(mut file) = writer.lock() {
                let json = event.with_timestamp();
                let _ = writeln!(file, "{}", json);
            }
        }

        let mut stderr = std::io::stderr();
        let _ = match self.format {
            LogFormat::Json => Self::write_json(&mut stderr, event),
            LogFormat::Pretty => Self::write_pretty(&mut stderr, event),
            LogFormat::Compact => Self::write_compact(&mut stderr, event),
        };
    }

    fn write_json<W: Write>(out: &mut W, event: &LogEvent) -> std::io::Result<()> {
        match serde_json::to_string(event) {
            Ok(json) => writeln!(out, "{}", json),
            Err(_) => Ok(()),
        }
    }

    fn write_pretty<W: Write>(out: &mut W, event: &LogEvent) -> std::io::Result<()> {
        match event {
            LogEvent::RunStarted {
                input,
                output,
                timeout_minutes,
            } => {
                writeln!(out)?;
                writeln!(
                    out,
                    "{} {}",
                    "▶".bright_cyan(),
                    "sessionize".bold().bright_white()
                )?;
                writeln!(out, "  {} {}", "Input:".dimmed(), input.display())?;
                writeln!(out, "  {} {}", "Output:".dimmed(), output.display())?;
                writeln!(
                    out,
                    "  {} {} min",
                    "Timeout:".dimmed(),
                    timeout_minutes
                )?;
                writeln!(out)
            }
            LogEvent::InputLoaded {
                lines_read,
                records,
                dropped,
            } => {
                writeln!(
                    out,
                    "  {} Loaded {} {} from {} {}",
                    "✓".bright_green(),
                    records,
                    if *records == 1 { "record" } else { "records" },
                    lines_read,
                    if *lines_read == 1 { "line" } else { "lines" }
                )?;
                if *dropped > 0 {
                    writeln!(
                        out,
                        "  {} Dropped {} malformed {}",
                        "⚠".bright_yellow(),
                        dropped,
                        if *dropped == 1 { "line" } else { "lines" }
                    )?;
                }
                Ok(())
            }
            LogEvent::SessionsAssigned { sessions, .. } => writeln!(
                out,
                "  {} Found {} {}",
                "✓".bright_green(),
                sessions,
                if *sessions == 1 { "session" } else { "sessions" }
            ),
            LogEvent::OutputWritten { path, rows } => writeln!(
                out,
                "  {} Wrote {} {} to {}",
                "✓".bright_green(),
                rows,
                if *rows == 1 { "row" } else { "rows" },
                path.display()
            ),
            LogEvent::RunCompleted { duration_secs, .. } => {
                writeln!(out)?;
                writeln!(
                    out,
                    "{} {}",
                    "✓".bright_green(),
                    format!("Done ({:.2}s)", duration_secs).bright_green()
                )
            }
            LogEvent::RunFailed { error } => {
                writeln!(out)?;
                writeln!(out, "{} {}", "✗".bright_red(), error.bright_red())
            }
        }
    }

    fn write_compact<W: Write>(out: &mut W, event: &LogEvent) -> std::io::Result<()> {
        let timestamp = chrono::Utc::now().format("%H:%M:%S");
        let msg = match event {
            LogEvent::RunStarted {
                input,
                timeout_minutes,
                ..
            } => format!(
                "[{}] run:start {} timeout={}m",
                timestamp,
                input.display(),
                timeout_minutes
            ),
            LogEvent::InputLoaded {
                records, dropped, ..
            } => format!(
                "[{}] load:done records={} dropped={}",
                timestamp, records, dropped
            ),
            LogEvent::SessionsAssigned { records, sessions } => format!(
                "[{}] segment:done records={} sessions={}",
                timestamp, records, sessions
            ),
            LogEvent::OutputWritten { path, rows } => {
                format!("[{}] write:done {} rows={}", timestamp, path.display(), rows)
            }
            LogEvent::RunCompleted { duration_secs, .. } => {
                format!("[{}] run:done {:.2}s", timestamp, duration_secs)
            }
            LogEvent::RunFailed { error } => format!("[{}] run:error {}", timestamp, error),
        };
        writeln!(out, "{}", msg)
    }
}
