use crate::cli::{VersionArgs, VersionCommands};
use crate::config::AppConfig;
use crate::error::Result;
use compchem_toolkit::release::{Manifest, Version};
use compchem_toolkit::utils::paths::set_pathspec;
use std::path::{Path, PathBuf};
use tracing::info;

pub async fn run(args: VersionArgs, config: &AppConfig) -> Result<()> {
    match args.command {
        VersionCommands::Show { manifest } => {
            let manifest = load_manifest(manifest.as_deref(), config)?;
            println!("{}", manifest.version());
        }
        VersionCommands::Bump {
            manifest,
            dev,
            timestamp,
            dry_run,
        } => {
            let mut manifest = load_manifest(manifest.as_deref(), config)?;
            let timestamp = dev.then(|| timestamp.unwrap_or_else(unix_now));
            let bumped = bump(&mut manifest, timestamp, dry_run)?;
            println!("{}", bumped);
        }
    }
    Ok(())
}

/// Reads the manifest named on the command line, or the configured one.
pub fn load_manifest(path: Option<&Path>, config: &AppConfig) -> Result<Manifest> {
    let path = resolve_manifest_path(path, config)?;
    info!("Reading manifest {:?}", path);
    Ok(Manifest::read(path)?)
}

pub fn resolve_manifest_path(path: Option<&Path>, config: &AppConfig) -> Result<PathBuf> {
    Ok(set_pathspec(path.unwrap_or(config.release.manifest.as_path()))?)
}

/// Bumps the patch version, with a development suffix when `dev_timestamp`
/// is set, and writes the manifest unless `dry_run`.
fn bump(manifest: &mut Manifest, dev_timestamp: Option<u64>, dry_run: bool) -> Result<Version> {
    let current = manifest.version();
    let bumped = match dev_timestamp {
        Some(timestamp) => current.dev_bump(timestamp)?,
        None => current.bump_patch()?,
    };
    info!("Bumping version {} -> {}", current, bumped);

    manifest.set_version(bumped)?;
    if dry_run {
        info!("Dry run: leaving {:?} untouched.", manifest.path());
    } else {
        manifest.write()?;
    }
    Ok(bumped)
}

pub fn unix_now() -> u64 {
    chrono::Utc::now().timestamp().max(0) as u64
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::CliError;
    use compchem_toolkit::release::ReleaseError;
    use std::fs;
    use tempfile::tempdir;

    const CARGO: &str = "[package]\nname = \"demo\"\nversion = \"1.4.2\" # keep\nedition = \"2024\"\n";

    #[test]
    fn patch_bump_rewrites_only_the_version() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("Cargo.toml");
        fs::write(&path, CARGO).unwrap();

        let mut manifest = Manifest::read(&path).unwrap();
        assert_eq!(bump(&mut manifest, None, false).unwrap(), Version::new(1, 4, 3));
        assert_eq!(
            fs::read_to_string(&path).unwrap(),
            CARGO.replace("1.4.2", "1.4.3")
        );
    }

    #[test]
    fn dev_bump_appends_the_timestamp() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("Cargo.toml");
        fs::write(&path, CARGO).unwrap();

        let mut manifest = Manifest::read(&path).unwrap();
        let bumped = bump(&mut manifest, Some(1_700_000_000), false).unwrap();
        assert_eq!(bumped.to_string(), "1.4.3.dev1700000000");
        assert_eq!(
            Manifest::read(&path).unwrap().version().to_string(),
            "1.4.3.dev1700000000"
        );
    }

    #[test]
    fn dry_run_leaves_the_file_alone() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("Cargo.toml");
        fs::write(&path, CARGO).unwrap();

        let mut manifest = Manifest::read(&path).unwrap();
        bump(&mut manifest, None, true).unwrap();
        assert_eq!(fs::read_to_string(&path).unwrap(), CARGO);
    }

    #[test]
    fn largest_patch_is_refused_and_left_on_disk() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("Cargo.toml");
        let contents = "[package]\nversion = \"0.0.18446744073709551615\"\n";
        fs::write(&path, contents).unwrap();

        let mut manifest = Manifest::read(&path).unwrap();
        assert!(matches!(
            bump(&mut manifest, Some(1), false),
            Err(CliError::Release(ReleaseError::PatchOverflow(_)))
        ));
        assert_eq!(fs::read_to_string(&path).unwrap(), contents);
    }

    #[test]
    fn unix_now_is_after_2023() {
        assert!(unix_now() > 1_672_531_200);
    }
}
