use super::LoggingError;
use super::format::RecordFormat;
use super::options::LoggerOptions;
use super::setup::LogPaths;
use std::collections::HashMap;
use std::fmt;
use std::fs::{File, OpenOptions};
use std::io::Write;
use std::panic::Location;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, OnceLock};
use tracing::level_filters::LevelFilter;
use tracing::{Dispatch, Level, debug, warn};
use tracing_subscriber::fmt::MakeWriter;
use tracing_subscriber::prelude::*;

/// Every logger name is rooted here for parent lookup.
pub const ROOT_LOGGER_NAME: &str = "compchem_toolkit";

const RECORD_TARGET: &str = "compchem_toolkit::record";

static REGISTRY: OnceLock<Mutex<HashMap<String, Logger>>> = OnceLock::new();

fn registry() -> &'static Mutex<HashMap<String, Logger>> {
    REGISTRY.get_or_init(Default::default)
}

#[derive(Clone)]
struct SharedFile(Arc<File>);

impl<'a> MakeWriter<'a> for SharedFile {
    type Writer = &'a File;

    fn make_writer(&'a self) -> Self::Writer {
        &self.0
    }
}

struct Sinks {
    dispatch: Dispatch,
    file: Option<Arc<File>>,
}

struct LoggerInner {
    name: String,
    registry_key: Option<String>,
    sinks: Mutex<Option<Sinks>>,
    parent: Option<Logger>,
    propagate: bool,
    logfile: Option<PathBuf>,
}

/// A named logger with its own sinks.
///
/// Cloning is cheap and yields a handle to the same logger.
#[derive(Clone)]
pub struct Logger {
    inner: Arc<LoggerInner>,
}

impl fmt::Debug for Logger {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Logger")
            .field("name", &self.inner.name)
            .field("propagate", &self.inner.propagate)
            .field("logfile", &self.inner.logfile)
            .field("parent", &self.inner.parent.as_ref().map(Logger::name))
            .finish()
    }
}

impl Logger {
    fn with_sinks(
        options: &LoggerOptions,
        name: String,
        parent: Option<Logger>,
        file: Option<(Arc<File>, PathBuf)>,
    ) -> Self {
        let console_layer = options.console_enabled().then(|| {
            tracing_subscriber::fmt::layer()
                .with_writer(std::io::stderr)
                .with_ansi(false)
                .event_format(RecordFormat::concise())
                .with_filter(options.console)
        });
        let file_layer = file.as_ref().map(|(handle, _)| {
            tracing_subscriber::fmt::layer()
                .with_writer(SharedFile(handle.clone()))
                .with_ansi(false)
                .event_format(RecordFormat::detailed())
                .with_filter(options.file)
        });
        let dispatch = Dispatch::new(
            tracing_subscriber::registry()
                .with(console_layer)
                .with(file_layer),
        );

        let (file, logfile) = match file {
            Some((handle, path)) => (Some(handle), Some(path)),
            None => (None, None),
        };

        Self {
            inner: Arc::new(LoggerInner {
                name,
                registry_key: Some(options.name.clone()),
                sinks: Mutex::new(Some(Sinks { dispatch, file })),
                parent,
                propagate: options.propagate,
                logfile,
            }),
        }
    }

    pub fn name(&self) -> &str {
        &self.inner.name
    }

    pub fn parent(&self) -> Option<&Logger> {
        self.inner.parent.as_ref()
    }

    pub fn propagate(&self) -> bool {
        self.inner.propagate
    }

    /// The file this logger's own file sink writes to, if it has one.
    pub fn logfile(&self) -> Option<&Path> {
        self.inner.logfile.as_deref()
    }

    pub fn has_sinks(&self) -> bool {
        self.inner
            .sinks
            .lock()
            .map(|sinks| sinks.is_some())
            .unwrap_or(false)
    }

    pub fn ptr_eq(&self, other: &Logger) -> bool {
        Arc::ptr_eq(&self.inner, &other.inner)
    }

    /// A logger with no sinks and no parent. Records sent to it are dropped.
    pub fn detached(name: impl Into<String>) -> Logger {
        Logger {
            inner: Arc::new(LoggerInner {
                name: name.into(),
                registry_key: None,
                sinks: Mutex::new(None),
                parent: None,
                propagate: false,
                logfile: None,
            }),
        }
    }

    /// Creates a sink-less child logger named `<name>.<suffix>` whose records
    /// are delivered to this logger's sinks.
    pub fn child(&self, suffix: &str) -> Logger {
        Logger {
            inner: Arc::new(LoggerInner {
                name: format!("{}.{}", self.inner.name, suffix),
                registry_key: None,
                sinks: Mutex::new(None),
                parent: Some(self.clone()),
                propagate: true,
                logfile: None,
            }),
        }
    }

    #[track_caller]
    pub fn log(&self, level: Level, message: impl fmt::Display) {
        self.emit(level, Location::caller().line(), &message);
    }

    #[track_caller]
    pub fn trace(&self, message: impl fmt::Display) {
        self.emit(Level::TRACE, Location::caller().line(), &message);
    }

    #[track_caller]
    pub fn debug(&self, message: impl fmt::Display) {
        self.emit(Level::DEBUG, Location::caller().line(), &message);
    }

    #[track_caller]
    pub fn info(&self, message: impl fmt::Display) {
        self.emit(Level::INFO, Location::caller().line(), &message);
    }

    #[track_caller]
    pub fn warn(&self, message: impl fmt::Display) {
        self.emit(Level::WARN, Location::caller().line(), &message);
    }

    #[track_caller]
    pub fn error(&self, message: impl fmt::Display) {
        self.emit(Level::ERROR, Location::caller().line(), &message);
    }

    /// Runs `f`, logging any error it returns (with its source chain) before
    /// handing the error back unchanged.
    #[track_caller]
    pub fn log_errors<T, E, F>(&self, fn_name: &str, f: F) -> Result<T, E>
    where
        F: FnOnce() -> Result<T, E>,
        E: std::error::Error,
    {
        let line = Location::caller().line();
        f().inspect_err(|err| {
            self.emit(
                Level::ERROR,
                line,
                &format_args!("Exception occurred in {}: {}", fn_name, err),
            );
            let mut source = err.source();
            while let Some(cause) = source {
                self.emit(Level::ERROR, line, &format_args!("  caused by: {}", cause));
                source = cause.source();
            }
        })
    }

    pub fn flush(&self) {
        if let Ok(sinks) = self.inner.sinks.lock() {
            if let Some(file) = sinks.as_ref().and_then(|s| s.file.as_ref()) {
                if let Err(e) = (&**file).flush() {
                    warn!("Failed to flush log file for '{}': {}", self.inner.name, e);
                }
            }
        }
    }

    fn dispatch(&self) -> Option<Dispatch> {
        let sinks = self.inner.sinks.lock().ok()?;
        sinks.as_ref().map(|s| s.dispatch.clone())
    }

    fn emit(&self, level: Level, line: u32, message: &dyn fmt::Display) {
        let name = self.inner.name.as_str();
        let mut current = Some(self);
        while let Some(logger) = current {
            if let Some(dispatch) = logger.dispatch() {
                tracing::dispatcher::with_default(&dispatch, || {
                    record(level, name, line, message)
                });
            }
            if !logger.inner.propagate {
                break;
            }
            current = logger.inner.parent.as_ref();
        }
    }
}

fn record(level: Level, logger: &str, line: u32, message: &dyn fmt::Display) {
    match level {
        Level::TRACE => tracing::event!(target: RECORD_TARGET, Level::TRACE, logger, line, "{}", message),
        Level::DEBUG => tracing::event!(target: RECORD_TARGET, Level::DEBUG, logger, line, "{}", message),
        Level::INFO => tracing::event!(target: RECORD_TARGET, Level::INFO, logger, line, "{}", message),
        Level::WARN => tracing::event!(target: RECORD_TARGET, Level::WARN, logger, line, "{}", message),
        _ => tracing::event!(target: RECORD_TARGET, Level::ERROR, logger, line, "{}", message),
    }
}

/// Creates a logger, or returns the registered logger of the same name.
///
/// When a logger named after the dotted parent of `options.name` (rooted at
/// [`ROOT_LOGGER_NAME`]) is registered, the new logger becomes its child and
/// is named accordingly.
///
/// # Errors
///
/// Fails if the log path cannot be resolved or the log file cannot be opened.
pub fn create_logger(options: &LoggerOptions) -> Result<Logger, LoggingError> {
    let mut loggers = registry().lock().map_err(|_| LoggingError::Poisoned)?;
    if let Some(existing) = loggers.get(&options.name) {
        debug!("Using existing logger: '{}'", options.name);
        return Ok(existing.clone());
    }

    let file = if options.file_enabled() {
        let paths = LogPaths::prepare(options)?;
        let handle = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&paths.logfile)
            .map_err(|source| LoggingError::Io {
                path: paths.logfile.clone(),
                source,
            })?;
        debug!(
            "Logger '{}' logging to file {:?}",
            options.name, paths.logfile
        );
        Some((Arc::new(handle), paths.logfile))
    } else {
        None
    };
    if options.console_enabled() {
        debug!("Console logging enabled for '{}'", options.name);
    }

    let parent = find_parent(&loggers, &options.name);
    let name = match (&parent, options.name.rsplit('.').next()) {
        (Some(parent), Some(last)) => format!("{}.{}", parent.name(), last),
        _ => options.name.clone(),
    };

    let logger = Logger::with_sinks(options, name, parent, file);
    loggers.insert(options.name.clone(), logger.clone());
    Ok(logger)
}

/// The logger used when no parent is supplied: console and file at debug,
/// falling back to console only when the file sink cannot be set up.
pub fn default_logger() -> Logger {
    create_logger_or_fallback(&LoggerOptions {
        console: LevelFilter::DEBUG,
        file: LevelFilter::DEBUG,
        ..LoggerOptions::default()
    })
}

/// Like [`create_logger`], but never fails: when the file sink cannot be set
/// up the logger is created with its console sink only.
pub fn create_logger_or_fallback(options: &LoggerOptions) -> Logger {
    match create_logger(options) {
        Ok(logger) => logger,
        Err(e) => {
            warn!(
                "Falling back to a console-only logger for '{}': {}",
                options.name, e
            );
            let console_only = LoggerOptions {
                file: LevelFilter::OFF,
                ..options.clone()
            };
            create_logger(&console_only).unwrap_or_else(|_| {
                Logger::with_sinks(&console_only, console_only.name.clone(), None, None)
            })
        }
    }
}

fn find_parent(loggers: &HashMap<String, Logger>, name: &str) -> Option<Logger> {
    let mut parts: Vec<&str> = name.split('.').collect();
    if parts.first() != Some(&ROOT_LOGGER_NAME) {
        parts.insert(0, ROOT_LOGGER_NAME);
    }
    if parts.len() < 2 {
        return None;
    }
    let parent_name = parts[..parts.len() - 1].join(".");
    loggers.get(&parent_name).cloned()
}

/// Flushes and detaches every sink of `logger`. Returns `false` if the sinks
/// could not be reached.
pub fn close_logger_handlers(logger: &Logger) -> bool {
    let Ok(mut sinks) = logger.inner.sinks.lock() else {
        warn!(
            "Error closing logger handlers for '{}': lock poisoned",
            logger.name()
        );
        return false;
    };
    if let Some(Sinks {
        file: Some(file), ..
    }) = sinks.take()
    {
        if let Err(e) = (&*file).flush() {
            warn!("Error closing logger handlers: {}", e);
            return false;
        }
    }
    true
}

/// Removes the logger registered under `name`, returning whether one was.
pub fn remove_logger_from_root(name: &str) -> bool {
    match registry().lock() {
        Ok(mut loggers) => loggers.remove(name).is_some(),
        Err(_) => false,
    }
}

/// Closes all sinks of `logger` and unregisters it.
pub fn close_logger(logger: &Logger) -> bool {
    if !close_logger_handlers(logger) {
        warn!("Failed to close logger named '{}'", logger.name());
        return false;
    }
    if let Some(key) = &logger.inner.registry_key {
        if !remove_logger_from_root(key) {
            debug!("Logger named '{}' not found in registry.", key);
        }
    }
    true
}
