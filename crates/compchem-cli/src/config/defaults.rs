use compchem_toolkit::logging::{LoggerOptions, default_log_dir};
use directories::ProjectDirs;
use std::path::PathBuf;

pub struct DefaultsConfig {
    pub logger: LoggerOptions,
    pub manifest: PathBuf,
    pub build_command: Vec<String>,
    pub notes: Option<PathBuf>,
    pub branches: Vec<String>,
}

impl Default for DefaultsConfig {
    fn default() -> Self {
        Self {
            logger: LoggerOptions {
                logdir: user_log_dir().unwrap_or_else(default_log_dir),
                ..LoggerOptions::default()
            },
            manifest: PathBuf::from("Cargo.toml"),
            build_command: vec![
                "cargo".to_string(),
                "package".to_string(),
                "--allow-dirty".to_string(),
            ],
            notes: None,
            branches: vec!["main".to_string(), "master".to_string()],
        }
    }
}

pub fn project_dirs() -> Option<ProjectDirs> {
    ProjectDirs::from("org", "compchem", "compchem-toolkit")
}

fn user_log_dir() -> Option<PathBuf> {
    project_dirs().map(|dirs| dirs.data_local_dir().join("logs"))
}
