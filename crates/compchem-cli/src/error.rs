use crate::utils::parser::ParseError;
use compchem_toolkit::logging::LoggingError;
use compchem_toolkit::release::ReleaseError;
use compchem_toolkit::utils::paths::PathError;
use std::path::PathBuf;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, CliError>;

#[derive(Debug, Error)]
pub enum CliError {
    #[error(transparent)]
    Logging(#[from] LoggingError),

    #[error(transparent)]
    Release(#[from] ReleaseError),

    #[error(transparent)]
    Path(#[from] PathError),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Failed to parse file '{path}': {source}", path = path.display())]
    FileParsing {
        path: PathBuf,
        #[source]
        source: anyhow::Error,
    },

    #[error("git {command} failed: {message}")]
    Git { command: String, message: String },

    #[error("Build command '{command}' failed: {message}")]
    Build { command: String, message: String },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Parse(#[from] ParseError),

    #[error("Invalid argument: {0}")]
    Argument(String),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}
