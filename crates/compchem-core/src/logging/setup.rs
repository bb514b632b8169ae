use super::{LoggerOptions, LoggingError};
use crate::utils::paths::{expand_user, set_pathspec};
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tracing::{debug, error, info, warn};

const ALTERNATE_DIR_PREFIX: &str = "compchem_toolkit-";

/// Where a logger writes its file output.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogPaths {
    pub logdir: PathBuf,
    pub logfile: PathBuf,
}

impl LogPaths {
    /// Resolves the log directory and file without touching the filesystem.
    ///
    /// Only the final component of `fname` is used; any directory part of it
    /// is ignored in favour of `logdir`.
    pub fn resolve(options: &LoggerOptions) -> Result<Self, LoggingError> {
        let logdir = expand_user(&options.logdir)?;
        let file_name = options
            .fname
            .file_name()
            .ok_or_else(|| LoggingError::InvalidFileName(options.fname.clone()))?;
        let logfile = logdir.join(file_name);
        Ok(Self { logdir, logfile })
    }

    /// Resolves the paths and makes sure the log directory exists.
    pub fn prepare(options: &LoggerOptions) -> Result<Self, LoggingError> {
        let mut paths = Self::resolve(options)?;
        paths.ensure_logdir_exists();
        Ok(paths)
    }

    /// Creates the log directory if needed.
    ///
    /// On permission errors the directory is replaced by a fresh one under the
    /// system temp dir (or the working directory if that also fails). Other
    /// errors are logged and leave the directory unchanged.
    pub fn ensure_logdir_exists(&mut self) {
        if self.logdir.is_dir() {
            debug!("The directory {:?} already exists.", self.logdir);
            return;
        }

        match fs::create_dir_all(&self.logdir) {
            Ok(()) => debug!("Created log directory {:?}", self.logdir),
            Err(e) if e.kind() == ErrorKind::PermissionDenied => {
                error!(
                    "Permission denied: Unable to create directory {:?}.",
                    self.logdir
                );
                self.use_alternate_logdir();
            }
            Err(e) => error!(
                "I/O error occurred while creating {:?}: {}",
                self.logdir, e
            ),
        }
    }

    fn use_alternate_logdir(&mut self) {
        let logdir = match create_alternate_logdir() {
            Ok(dir) => {
                info!("Using alternate logging directory: {:?}", dir);
                dir
            }
            Err(e) => {
                error!(
                    "Failed to create an alternate logging directory: {}. Falling back to current working directory.",
                    e
                );
                let cwd = set_pathspec("").unwrap_or_else(|_| PathBuf::from("."));
                info!("Using current working directory for logging: {:?}", cwd);
                cwd
            }
        };
        self.relocate(&logdir);
    }

    fn relocate(&mut self, logdir: &Path) {
        if let Some(name) = self.logfile.file_name() {
            self.logfile = logdir.join(name);
        }
        self.logdir = logdir.to_path_buf();
    }
}

fn create_alternate_logdir() -> Result<PathBuf, LoggingError> {
    let dir = tempfile::Builder::new()
        .prefix(ALTERNATE_DIR_PREFIX)
        .tempdir()
        .map_err(|source| LoggingError::Io {
            path: std::env::temp_dir(),
            source,
        })?
        .keep();
    if !dir.is_dir() {
        warn!("Created path {:?} is not a directory.", dir);
        return Err(LoggingError::Io {
            path: dir,
            source: ErrorKind::NotADirectory.into(),
        });
    }
    Ok(set_pathspec(dir)?)
}
