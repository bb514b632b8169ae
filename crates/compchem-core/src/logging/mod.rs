//! Named, hierarchical loggers for toolkit code.
//!
//! Every [`Logger`] owns an independent `tracing` dispatcher with an optional
//! console sink (stderr, concise format) and an optional file sink (detailed
//! format). Loggers are registered process-wide by name so that repeated
//! creation returns the same instance, and records emitted by a child logger
//! propagate to the sinks of its ancestors.

mod format;
mod logger;
mod named;
mod options;
mod progress_writer;
mod setup;

pub use format::{RecordFormat, RecordStyle};
pub use logger::{
    Logger, ROOT_LOGGER_NAME, close_logger, close_logger_handlers, create_logger,
    create_logger_or_fallback, default_logger, remove_logger_from_root,
};
pub use named::named_logging;
pub use options::{
    DEFAULT_FNAME, DEFAULT_LOGGER_NAME, KNOWN_KEYWORDS, LoggerKeywords, LoggerOptions,
    default_log_dir, parse_level,
};
pub use progress_writer::ProgressLogWriter;
pub use setup::LogPaths;

use crate::utils::paths::PathError;
use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum LoggingError {
    #[error("Unknown keyword for logger initialization: '{0}'")]
    UnknownKeyword(String),

    #[error("Invalid log level '{0}'; expected one of trace, debug, info, warning, error or none")]
    InvalidLevel(String),

    #[error("Invalid value for logger keyword '{key}': {message}")]
    InvalidValue { key: String, message: String },

    #[error("Log file name '{}' does not name a file", .0.display())]
    InvalidFileName(PathBuf),

    #[error("Failed to open log file '{path}': {source}", path = path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error(transparent)]
    Path(#[from] PathError),

    #[error("Logger registry lock was poisoned")]
    Poisoned,
}
