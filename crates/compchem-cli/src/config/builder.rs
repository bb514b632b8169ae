use super::defaults::{DefaultsConfig, project_dirs};
use super::file::FileConfig;
use super::models::{AppConfig, ReleaseConfig};
use crate::error::{CliError, Result};
use crate::utils::parser::{self, ConfigSection, SetValue};
use std::path::{Path, PathBuf};
use tracing::debug;

pub fn default_config_path() -> Option<PathBuf> {
    project_dirs().map(|dirs| dirs.config_dir().join("config.toml"))
}

/// Merges built-in defaults, the configuration file and `-S` overrides, in
/// increasing order of precedence.
pub fn build_config(config_path: Option<&Path>, set_values: &[String]) -> Result<AppConfig> {
    let defaults = DefaultsConfig::default();

    let file_config = match config_path {
        Some(path) => FileConfig::from_file(path)?,
        None => match default_config_path() {
            Some(path) if path.is_file() => FileConfig::from_file(&path)?,
            _ => FileConfig::default(),
        },
    };

    let mut file_config = apply_set_values(file_config, set_values)?;

    let logger = file_config
        .logging
        .take()
        .unwrap_or_default()
        .apply(defaults.logger)?;

    let release_file = file_config.release.take().unwrap_or_default();
    let build_command = release_file
        .build_command
        .unwrap_or(defaults.build_command);
    if build_command.is_empty() {
        return Err(CliError::Config(
            "release.build-command must not be empty".to_string(),
        ));
    }

    Ok(AppConfig {
        logger,
        release: ReleaseConfig {
            manifest: release_file.manifest.unwrap_or(defaults.manifest),
            build_command,
            notes: release_file.notes.or(defaults.notes),
            branches: release_file.branches.unwrap_or(defaults.branches),
        },
    })
}

fn apply_set_values(mut config: FileConfig, set_values: &[String]) -> Result<FileConfig> {
    for raw in set_values {
        let SetValue {
            section,
            key,
            value,
        } = parser::parse_set_value(raw)?;
        debug!("Applying override {:?}.{} = {:?}", section, key, value);

        match section {
            ConfigSection::Logging => config
                .logging
                .get_or_insert_with(Default::default)
                .set(&key, &value)?,
            ConfigSection::Release => {
                let release = config.release.get_or_insert_with(Default::default);
                match key.as_str() {
                    "manifest" => release.manifest = Some(PathBuf::from(value)),
                    "build-command" => release.build_command = Some(split_command(&value)?),
                    "notes" => release.notes = Some(PathBuf::from(value)),
                    "branches" => {
                        release.branches = Some(
                            value
                                .split(',')
                                .map(str::trim)
                                .filter(|b| !b.is_empty())
                                .map(String::from)
                                .collect(),
                        )
                    }
                    other => {
                        return Err(CliError::Config(format!(
                            "Unknown release setting '{}'",
                            other
                        )));
                    }
                }
            }
        }
    }
    Ok(config)
}

/// Splits a command line on whitespace. Quoting is not supported.
pub fn split_command(command: &str) -> Result<Vec<String>> {
    let parts: Vec<String> = command.split_whitespace().map(String::from).collect();
    if parts.is_empty() {
        return Err(CliError::Config("Build command must not be empty".to_string()));
    }
    Ok(parts)
}
