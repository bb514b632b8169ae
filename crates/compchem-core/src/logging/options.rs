use super::LoggingError;
use serde::Deserialize;
use std::path::PathBuf;
use tracing::level_filters::LevelFilter;

pub const DEFAULT_LOGGER_NAME: &str = "CompChemToolkit";
pub const DEFAULT_FNAME: &str = "compchem_toolkit.log";
pub const KNOWN_KEYWORDS: [&str; 6] = ["name", "console", "file", "logdir", "fname", "propagate"];

/// Fully resolved settings for a single logger.
///
/// A sink whose level is [`LevelFilter::OFF`] is not attached at all.
#[derive(Debug, Clone, PartialEq)]
pub struct LoggerOptions {
    pub name: String,
    pub console: LevelFilter,
    pub file: LevelFilter,
    pub logdir: PathBuf,
    pub fname: PathBuf,
    pub propagate: bool,
}

impl Default for LoggerOptions {
    fn default() -> Self {
        Self {
            name: DEFAULT_LOGGER_NAME.to_string(),
            console: LevelFilter::OFF,
            file: LevelFilter::WARN,
            logdir: default_log_dir(),
            fname: PathBuf::from(DEFAULT_FNAME),
            propagate: true,
        }
    }
}

impl LoggerOptions {
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    /// Builds options from a keyword table, starting from the defaults.
    ///
    /// # Errors
    ///
    /// Returns [`LoggingError::UnknownKeyword`] for any key outside
    /// [`KNOWN_KEYWORDS`], and [`LoggingError::InvalidValue`] or
    /// [`LoggingError::InvalidLevel`] for values of the wrong shape.
    pub fn from_keywords(table: &toml::Table) -> Result<Self, LoggingError> {
        LoggerKeywords::from_table(table)?.apply(Self::default())
    }

    pub fn console_enabled(&self) -> bool {
        self.console != LevelFilter::OFF
    }

    pub fn file_enabled(&self) -> bool {
        self.file != LevelFilter::OFF
    }
}

/// A partial set of logger settings, as written in a `[logging]` table.
#[derive(Deserialize, Debug, Default, Clone, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct LoggerKeywords {
    pub name: Option<String>,
    pub console: Option<String>,
    pub file: Option<String>,
    pub logdir: Option<PathBuf>,
    pub fname: Option<PathBuf>,
    pub propagate: Option<bool>,
}

impl LoggerKeywords {
    pub fn from_table(table: &toml::Table) -> Result<Self, LoggingError> {
        validate_keywords(table.keys().map(String::as_str))?;
        toml::Value::Table(table.clone())
            .try_into()
            .map_err(|e: toml::de::Error| LoggingError::InvalidValue {
                key: "logging".to_string(),
                message: e.message().to_string(),
            })
    }

    /// Sets a single keyword from its string form, as given on a command line.
    pub fn set(&mut self, key: &str, value: &str) -> Result<(), LoggingError> {
        validate_keywords([key])?;
        match key {
            "name" => self.name = Some(value.to_string()),
            "console" => self.console = Some(value.to_string()),
            "file" => self.file = Some(value.to_string()),
            "logdir" => self.logdir = Some(PathBuf::from(value)),
            "fname" => self.fname = Some(PathBuf::from(value)),
            "propagate" => {
                self.propagate =
                    Some(value.parse().map_err(|_| LoggingError::InvalidValue {
                        key: key.to_string(),
                        message: format!("expected 'true' or 'false', got '{}'", value),
                    })?)
            }
            _ => unreachable!("keyword validated above"),
        }
        Ok(())
    }

    /// Overlays `other` on these keywords. Keywords set in `other` win.
    pub fn merge(self, other: LoggerKeywords) -> LoggerKeywords {
        LoggerKeywords {
            name: other.name.or(self.name),
            console: other.console.or(self.console),
            file: other.file.or(self.file),
            logdir: other.logdir.or(self.logdir),
            fname: other.fname.or(self.fname),
            propagate: other.propagate.or(self.propagate),
        }
    }

    pub fn apply(self, base: LoggerOptions) -> Result<LoggerOptions, LoggingError> {
        Ok(LoggerOptions {
            name: self.name.unwrap_or(base.name),
            console: match self.console {
                Some(level) => parse_level(&level)?,
                None => base.console,
            },
            file: match self.file {
                Some(level) => parse_level(&level)?,
                None => base.file,
            },
            logdir: self.logdir.unwrap_or(base.logdir),
            fname: self.fname.unwrap_or(base.fname),
            propagate: self.propagate.unwrap_or(base.propagate),
        })
    }
}

fn validate_keywords<'a>(keys: impl IntoIterator<Item = &'a str>) -> Result<(), LoggingError> {
    for key in keys {
        if !KNOWN_KEYWORDS.contains(&key) {
            return Err(LoggingError::UnknownKeyword(key.to_string()));
        }
    }
    Ok(())
}

/// Parses a level name. `none` and `off` disable the sink.
pub fn parse_level(level: &str) -> Result<LevelFilter, LoggingError> {
    match level.trim().to_ascii_lowercase().as_str() {
        "trace" => Ok(LevelFilter::TRACE),
        "debug" => Ok(LevelFilter::DEBUG),
        "info" => Ok(LevelFilter::INFO),
        "warn" | "warning" => Ok(LevelFilter::WARN),
        "error" => Ok(LevelFilter::ERROR),
        "none" | "off" => Ok(LevelFilter::OFF),
        _ => Err(LoggingError::InvalidLevel(level.to_string())),
    }
}

/// The platform's conventional log directory, or the current directory
/// (the empty path) where there is none.
pub fn default_log_dir() -> PathBuf {
    if cfg!(target_os = "macos") {
        PathBuf::from("~/Library/Logs/CompChemToolkit")
    } else if cfg!(target_os = "linux") {
        PathBuf::from("/var/log/CompChemToolkit")
    } else if cfg!(windows) {
        PathBuf::from(r"C:\Windows\System32\winevt\Logs")
    } else {
        PathBuf::new()
    }
}
