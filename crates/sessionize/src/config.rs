//! Configuration file support for sessionize.
//!
//! Loads settings from `sessionize.toml`. Command-line flags take precedence
//! over the file, and the file over built-in defaults.

use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};

use sessionize_core::Config;

/// Settings loaded from `sessionize.toml`. Every key is optional.
#[derive(Debug, Deserialize, Default, Clone, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct FileConfig {
    /// Access log to read
    pub input: Option<PathBuf>,
    /// Where to write the enriched table
    pub output: Option<PathBuf>,
    /// Inactivity timeout in minutes
    pub timeout_minutes: Option<i64>,
    /// Output field delimiter
    pub delimiter: Option<char>,
    /// Token count a line must have to be kept
    pub columns: Option<usize>,
}

/// The config file name
pub const CONFIG_FILE_NAME: &str = "sessionize.toml";

impl FileConfig {
    /// Load configuration from `path`.
    ///
    /// Returns:
    /// - `Ok(Some(config))` if file exists and parses successfully
    /// - `Ok(None)` if file does not exist
    /// - `Err(...)` if file exists but fails to parse (hard error)
    pub fn load(path: &Path) -> Result<Option<Self>> {
        if !path.exists() {
            return Ok(None);
        }

        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read {}", path.display()))?;

        let config: FileConfig = toml::from_str(&content)
            .with_context(|| format!("Failed to parse {}", path.display()))?;

        Ok(Some(config))
    }

    /// Keys set in `overrides` win over the ones set here.
    pub fn overridden_by(self, overrides: FileConfig) -> FileConfig {
        FileConfig {
            input: overrides.input.or(self.input),
            output: overrides.output.or(self.output),
            timeout_minutes: overrides.timeout_minutes.or(self.timeout_minutes),
            delimiter: overrides.delimiter.or(self.delimiter),
            columns: overrides.columns.or(self.columns),
        }
    }

    /// Fill unset keys with defaults.
    pub fn into_config(self) -> Config {
        let defaults = Config::default();
        Config {
            input: self.input.unwrap_or(defaults.input),
            output: self.output.unwrap_or(defaults.output),
            timeout_minutes: self.timeout_minutes.unwrap_or(defaults.timeout_minutes),
            delimiter: self.delimiter.unwrap_or(defaults.delimiter),
            columns: self.columns.or(defaults.columns),
        }
    }
}
