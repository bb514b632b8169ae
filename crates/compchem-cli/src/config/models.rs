use compchem_toolkit::logging::LoggerOptions;
use std::path::PathBuf;

#[derive(Debug, Clone, PartialEq)]
pub struct AppConfig {
    pub logger: LoggerOptions,
    pub release: ReleaseConfig,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReleaseConfig {
    pub manifest: PathBuf,
    pub build_command: Vec<String>,
    pub notes: Option<PathBuf>,
    pub branches: Vec<String>,
}
