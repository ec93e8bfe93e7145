use std::path::PathBuf;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum SessionizeError {
    #[error("Failed to read input {path:?}: {source}")]
    ReadInput {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to write output {path:?}: {source}")]
    WriteOutput {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Configuration error: {0}")]
    InvalidConfig(String),
}

pub type Result<T> = std::result::Result<T, SessionizeError>;
