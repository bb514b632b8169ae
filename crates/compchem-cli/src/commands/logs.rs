use crate::cli::{LogsArgs, LogsCommands};
use crate::config::AppConfig;
use crate::error::Result;
use compchem_toolkit::logging::LogPaths;

pub async fn run(args: LogsArgs, config: &AppConfig) -> Result<()> {
    match args.command {
        LogsCommands::Path => {
            let paths = LogPaths::resolve(&config.logger)?;
            println!("{}", paths.logfile.display());
            if !config.logger.file_enabled() {
                eprintln!("Note: file logging is disabled (logging.file = none).");
            }
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::models::ReleaseConfig;
    use compchem_toolkit::logging::LoggerOptions;
    use std::path::PathBuf;

    #[tokio::test]
    async fn path_is_resolved_without_creating_the_directory() {
        let dir = tempfile::tempdir().unwrap();
        let logdir = dir.path().join("not-yet");
        let config = AppConfig {
            logger: LoggerOptions {
                logdir: logdir.clone(),
                fname: PathBuf::from("nested/custom.log"),
                ..LoggerOptions::default()
            },
            release: ReleaseConfig {
                manifest: PathBuf::from("Cargo.toml"),
                build_command: vec!["true".to_string()],
                notes: None,
                branches: vec![],
            },
        };

        let paths = LogPaths::resolve(&config.logger).unwrap();
        assert!(paths.logfile.ends_with("not-yet/custom.log"));

        run(LogsArgs { command: LogsCommands::Path }, &config).await.unwrap();
        assert!(!logdir.exists());
    }
}
