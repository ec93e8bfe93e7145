mod config;

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};

use sessionize_core::Config;
use sessionize_logging::{init_tracing, LogEvent, LogFormat, Logger};

use crate::config::{FileConfig, CONFIG_FILE_NAME};

#[derive(Parser, Debug)]
#[command(
    name = "sessionize",
    about = "Add session and visit columns to a web-server access log",
    version,
    author
)]
struct Cli {
    /// Access log to read (default: in.txt)
    #[arg(short, long)]
    input: Option<PathBuf>,

    /// Where to write the enriched table (default: out.txt)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Inactivity timeout in minutes (default: 30)
    #[arg(short, long)]
    timeout: Option<i64>,

    /// Output field delimiter (default: ',')
    #[arg(long)]
    delimiter: Option<char>,

    /// Most fields a line may have to be kept (default: inferred from the first kept line)
    #[arg(long)]
    columns: Option<usize>,

    /// Config file (default: ./sessionize.toml, ignored if absent)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Log output format
    #[arg(long, value_enum, default_value = "pretty")]
    log_format: LogFormatChoice,

    /// Diagnostic log level; RUST_LOG takes precedence
    #[arg(long, default_value = "warn")]
    log_level: String,

    /// Also append run events to this file as JSON lines
    #[arg(long)]
    log_file: Option<PathBuf>,

    /// Print the run summary as JSON on stdout
    #[arg(long)]
    json_output: bool,

    /// Print the resolved configuration without processing anything
    #[arg(long)]
    dry_run: bool,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum LogFormatChoice {
    Pretty,
    Json,
    Compact,
}

impl From<LogFormatChoice> for LogFormat {
    fn from(choice: LogFormatChoice) -> Self {
        match choice {
            LogFormatChoice::Pretty => LogFormat::Pretty,
            LogFormatChoice::Json => LogFormat::Json,
            LogFormatChoice::Compact => LogFormat::Compact,
        }
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let log_format: LogFormat = cli.log_format.into();
    init_tracing(&cli.log_level, log_format);

    let config = resolve_config(&cli)?;

    if cli.dry_run {
        println!("=== Dry Run ===");
        println!("Input: {}", config.input.display());
        println!("Output: {}", config.output.display());
        println!("Timeout: {} min", config.timeout_minutes);
        println!("Delimiter: {:?}", config.delimiter);
        match config.columns {
            Some(columns) => println!("Columns: {}", columns),
            None => println!("Columns: inferred"),
        }
        return Ok(());
    }

    let logger = match cli.log_file {
        Some(ref path) => Logger::with_file(log_format, path)
            .with_context(|| format!("Failed to open log file {}", path.display()))?,
        None => Logger::new(log_format),
    };

    let summary = match sessionize_core::run(&config, &logger) {
        Ok(summary) => summary,
        Err(e) => {
            logger.log(&LogEvent::RunFailed {
                error: e.to_string(),
            });
            return Err(e.into());
        }
    };

    if cli.json_output {
        let json = serde_json::to_string_pretty(&summary)?;
        println!("{}", json);
    }

    Ok(())
}

/// Merge flags over the config file over defaults.
fn resolve_config(cli: &Cli) -> Result<Config> {
    let file_config = match cli.config {
        Some(ref path) => FileConfig::load(path)?
            .with_context(|| format!("Config file not found: {}", path.display()))?,
        None => FileConfig::load(&PathBuf::from(CONFIG_FILE_NAME))?.unwrap_or_default(),
    };

    let overrides = FileConfig {
        input: cli.input.clone(),
        output: cli.output.clone(),
        timeout_minutes: cli.timeout,
        delimiter: cli.delimiter,
        columns: cli.columns,
    };

    let config = file_config.overridden_by(overrides).into_config();
    config.validate()?;
    Ok(config)
}
