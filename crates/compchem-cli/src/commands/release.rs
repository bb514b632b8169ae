use super::version::{resolve_manifest_path, unix_now};
use crate::cli::ReleaseArgs;
use crate::config::{AppConfig, split_command};
use crate::error::{CliError, Result};
use crate::git::Git;
use crate::utils::progress::{CliProgressHandler, plain_callback};
use compchem_toolkit::logging::create_logger_or_fallback;
use compchem_toolkit::progress::{Progress, ProgressReporter, log_callback};
use compchem_toolkit::release::{
    Manifest, ReleaseAction, ReleaseNotes, Version, plan_release,
};
use compchem_toolkit::utils::paths::set_pathspec;
use std::io::IsTerminal;
use std::path::{Path, PathBuf};
use tokio::process::Command;
use tracing::{debug, info, warn};

const TOTAL_PHASES: usize = 4;

/// Everything a release run needs, resolved from the CLI and configuration.
#[derive(Debug, Clone)]
struct ReleaseJob {
    manifest: PathBuf,
    build_command: Vec<String>,
    branches: Vec<String>,
    skip_build: bool,
    any_branch: bool,
    timestamp: u64,
    dry_run: bool,
}

#[derive(Debug)]
struct ReleaseOutcome {
    action: ReleaseAction,
    notes: ReleaseNotes,
    built: bool,
}

pub async fn run(args: ReleaseArgs, config: &AppConfig, quiet: bool) -> Result<()> {
    let build_command = match &args.build_command {
        Some(command) => split_command(command)?,
        None => config.release.build_command.clone(),
    };
    let job = ReleaseJob {
        manifest: resolve_manifest_path(args.manifest.as_deref(), config)?,
        build_command,
        branches: config.release.branches.clone(),
        skip_build: args.skip_build,
        any_branch: args.any_branch,
        timestamp: args.timestamp.unwrap_or_else(unix_now),
        dry_run: args.dry_run,
    };
    let notes_path = args.notes.or_else(|| config.release.notes.clone());

    let reporter = if quiet {
        let logger = create_logger_or_fallback(&config.logger).child("release");
        ProgressReporter::with_callback(log_callback(logger))
    } else if std::io::stderr().is_terminal() {
        ProgressReporter::with_callback(CliProgressHandler::new(TOTAL_PHASES).get_callback())
    } else {
        ProgressReporter::with_callback(plain_callback(TOTAL_PHASES, std::io::stderr()))
    };

    eprintln!("Preparing release from {:?}...", job.manifest);
    let outcome = execute(&job, &reporter).await?;

    match &outcome.action {
        ReleaseAction::Tag { tag, .. } => eprintln!("Tagged release {}.", tag),
        ReleaseAction::DevBump { from, to } => {
            eprintln!("Development build: {} -> {}.", from, to)
        }
    }
    if !outcome.built {
        eprintln!("Package build skipped.");
    }

    let rendered = outcome.notes.render();
    match notes_path {
        Some(path) if !job.dry_run => {
            let path = set_pathspec(&path)?;
            std::fs::write(&path, &rendered)?;
            eprintln!("Release notes written to {:?}.", path);
        }
        _ => print!("{}", rendered),
    }
    Ok(())
}

async fn execute(job: &ReleaseJob, reporter: &ProgressReporter<'_>) -> Result<ReleaseOutcome> {
    let workdir = job
        .manifest
        .parent()
        .map(Path::to_path_buf)
        .ok_or_else(|| CliError::Argument(format!("{:?} has no parent directory", job.manifest)))?;
    let manifest_name = job
        .manifest
        .file_name()
        .map(PathBuf::from)
        .ok_or_else(|| CliError::Argument(format!("{:?} is not a file", job.manifest)))?;
    let git = Git::new(workdir);

    reporter.report(Progress::PhaseStart {
        name: "Detecting version",
    });
    check_branch(&git, job).await?;
    let mut manifest = Manifest::read(&job.manifest)?;
    let previous = previous_version(&git, &manifest_name).await?;
    let action = plan_release(manifest.version(), previous, job.timestamp)?;
    info!("Release plan: {:?}", action);
    reporter.report(Progress::PhaseFinish);

    reporter.report(Progress::PhaseStart {
        name: "Applying release",
    });
    apply(&git, &mut manifest, &action, job, reporter).await?;
    reporter.report(Progress::PhaseFinish);

    reporter.report(Progress::PhaseStart {
        name: "Building package",
    });
    let built = if job.skip_build || job.dry_run {
        reporter.report(Progress::Message(format!(
            "Skipping `{}`",
            job.build_command.join(" ")
        )));
        false
    } else {
        build(git.workdir(), &job.build_command).await?;
        true
    };
    reporter.report(Progress::PhaseFinish);

    reporter.report(Progress::PhaseStart {
        name: "Collecting release notes",
    });
    let notes = collect_notes(&git, &action, reporter).await?;
    reporter.report(Progress::PhaseFinish);

    Ok(ReleaseOutcome {
        action,
        notes,
        built,
    })
}

/// Refuses to run from a branch outside the configured release branches.
/// A detached HEAD, as on most CI runners, is allowed.
async fn check_branch(git: &Git, job: &ReleaseJob) -> Result<()> {
    if job.any_branch {
        return Ok(());
    }
    match git.current_branch().await? {
        Some(branch) if !job.branches.iter().any(|b| *b == branch) => {
            Err(CliError::Argument(format!(
                "Refusing to release from branch '{}' (release branches: {}). Use --any-branch to override.",
                branch,
                job.branches.join(", ")
            )))
        }
        Some(branch) => {
            debug!("Releasing from branch '{}'.", branch);
            Ok(())
        }
        None => {
            warn!("HEAD is detached; skipping the release branch check.");
            Ok(())
        }
    }
}

/// The manifest version at `HEAD^`, if there is a parent commit carrying a
/// readable manifest.
async fn previous_version(git: &Git, manifest_name: &Path) -> Result<Option<Version>> {
    if !git.has_parent_commit().await? {
        info!("No parent commit; treating this as a development build.");
        return Ok(None);
    }
    let Some(contents) = git.show_file_at("HEAD^", manifest_name).await? else {
        info!("{:?} does not exist at HEAD^.", manifest_name);
        return Ok(None);
    };
    match Manifest::version_from_str(&contents) {
        Ok(version) => Ok(Some(version)),
        Err(e) => {
            warn!("Ignoring unreadable manifest at HEAD^: {}", e);
            Ok(None)
        }
    }
}

async fn apply(
    git: &Git,
    manifest: &mut Manifest,
    action: &ReleaseAction,
    job: &ReleaseJob,
    reporter: &ProgressReporter<'_>,
) -> Result<()> {
    match action {
        ReleaseAction::Tag { version, tag } => {
            if git.tag_exists(tag).await? {
                warn!("Tag {} already exists; leaving it in place.", tag);
                reporter.report(Progress::Message(format!("{} already tagged", tag)));
            } else if job.dry_run {
                reporter.report(Progress::Message(format!("Would tag {}", tag)));
            } else {
                git.create_tag(tag, &format!("Release {}", version)).await?;
                reporter.report(Progress::Message(format!("Created tag {}", tag)));
            }
        }
        ReleaseAction::DevBump { from, to } => {
            manifest.set_version(*to)?;
            if job.dry_run {
                reporter.report(Progress::Message(format!("Would bump {} -> {}", from, to)));
            } else {
                manifest.write()?;
                reporter.report(Progress::Message(format!("Bumped {} -> {}", from, to)));
            }
        }
    }
    Ok(())
}

async fn build(workdir: &Path, command: &[String]) -> Result<()> {
    let (program, args) = command
        .split_first()
        .ok_or_else(|| CliError::Config("Build command must not be empty".to_string()))?;
    let command_line = command.join(" ");
    info!("Running build command `{}` in {:?}", command_line, workdir);

    let output = Command::new(program)
        .args(args)
        .current_dir(workdir)
        .kill_on_drop(true)
        .output()
        .await
        .map_err(|e| CliError::Build {
            command: command_line.clone(),
            message: e.to_string(),
        })?;
    debug!("Build output:\n{}", String::from_utf8_lossy(&output.stdout));

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        return Err(CliError::Build {
            command: command_line,
            message: format!("{} ({})", stderr.trim(), output.status),
        });
    }
    Ok(())
}

/// Gathers commit subjects since the previous tag. A fresh tag on `HEAD` is
/// skipped by searching from `HEAD^`.
async fn collect_notes(
    git: &Git,
    action: &ReleaseAction,
    reporter: &ProgressReporter<'_>,
) -> Result<ReleaseNotes> {
    let search_from = if action.is_tag() { "HEAD^" } else { "HEAD" };
    let since = git.last_tag(search_from).await?;
    debug!("Collecting commits since {:?}", since);

    let subjects = git.commit_subjects(since.as_deref()).await?;
    reporter.report(Progress::TaskStart {
        total_steps: subjects.len() as u64,
    });
    for _ in &subjects {
        reporter.report(Progress::TaskIncrement);
    }
    reporter.report(Progress::TaskFinish);

    Ok(ReleaseNotes::from_commits(action.version(), subjects))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::git::test_repo::{commit_file, git, git_available, init};
    use compchem_toolkit::release::Section;
    use std::fs;
    use std::sync::{Arc, Mutex};
    use tempfile::{TempDir, tempdir};

    const NOW: u64 = 1_700_000_000;

    fn cargo(version: &str) -> String {
        format!("[package]\nname = \"demo\"\nversion = \"{}\"\n", version)
    }

    fn job(dir: &Path) -> ReleaseJob {
        ReleaseJob {
            manifest: dir.join("Cargo.toml"),
            build_command: vec!["git".to_string(), "status".to_string()],
            branches: vec!["main".to_string()],
            skip_build: true,
            any_branch: false,
            timestamp: NOW,
            dry_run: false,
        }
    }

    fn repo_with(versions: &[(&str, &str)]) -> Option<TempDir> {
        if !git_available() {
            return None;
        }
        let dir = tempdir().unwrap();
        init(dir.path());
        for (version, message) in versions {
            commit_file(dir.path(), "Cargo.toml", &cargo(version), message);
        }
        Some(dir)
    }

    async fn tag_exists(dir: &Path, tag: &str) -> bool {
        Git::new(dir).tag_exists(tag).await.unwrap()
    }

    #[tokio::test]
    async fn changed_version_is_tagged() {
        let Some(dir) = repo_with(&[("0.1.0", "feat: initial"), ("0.2.0", "fix: release")]) else {
            return;
        };

        let outcome = execute(&job(dir.path()), &ProgressReporter::new()).await.unwrap();
        assert_eq!(
            outcome.action,
            ReleaseAction::Tag {
                version: Version::new(0, 2, 0),
                tag: "v0.2.0".to_string()
            }
        );
        assert!(tag_exists(dir.path(), "v0.2.0").await);
        assert_eq!(outcome.notes.entries(Section::Features), ["initial"]);
        assert_eq!(outcome.notes.entries(Section::BugFixes), ["release"]);
        assert_eq!(
            fs::read_to_string(dir.path().join("Cargo.toml")).unwrap(),
            cargo("0.2.0")
        );
    }

    #[tokio::test]
    async fn unchanged_version_gets_a_dev_bump() {
        let Some(dir) = repo_with(&[("0.1.0", "feat: initial"), ("0.1.0", "docs: readme")]) else {
            return;
        };

        let outcome = execute(&job(dir.path()), &ProgressReporter::new()).await.unwrap();
        let expected = Version::new(0, 1, 1).with_dev(NOW);
        assert_eq!(
            outcome.action,
            ReleaseAction::DevBump {
                from: Version::new(0, 1, 0),
                to: expected
            }
        );
        assert_eq!(
            Manifest::read(dir.path().join("Cargo.toml")).unwrap().version(),
            expected
        );
        assert!(!tag_exists(dir.path(), "v0.1.0").await);
        assert!(outcome.notes.render().starts_with("# v0.1.1.dev1700000000\n"));
    }

    #[tokio::test]
    async fn first_commit_gets_a_dev_bump() {
        let Some(dir) = repo_with(&[("0.3.0", "feat: initial")]) else {
            return;
        };

        let outcome = execute(&job(dir.path()), &ProgressReporter::new()).await.unwrap();
        assert!(!outcome.action.is_tag());
        assert_eq!(outcome.action.version(), Version::new(0, 3, 1).with_dev(NOW));
    }

    #[tokio::test]
    async fn notes_start_after_the_previous_tag() {
        let Some(dir) = repo_with(&[("0.1.0", "feat: initial")]) else {
            return;
        };
        git(dir.path(), &["tag", "v0.1.0"]);
        commit_file(dir.path(), "Cargo.toml", &cargo("0.1.1"), "fix(io): handle empty files");

        let outcome = execute(&job(dir.path()), &ProgressReporter::new()).await.unwrap();
        assert!(outcome.action.is_tag());
        assert!(outcome.notes.entries(Section::Features).is_empty());
        assert_eq!(
            outcome.notes.entries(Section::BugFixes),
            ["handle empty files"]
        );
    }

    #[tokio::test]
    async fn dry_run_changes_nothing() {
        let Some(dir) = repo_with(&[("0.1.0", "feat: a"), ("0.1.0", "chore: b")]) else {
            return;
        };
        let mut dry = job(dir.path());
        dry.dry_run = true;
        dry.skip_build = false;
        dry.build_command = vec!["false".to_string()];

        let outcome = execute(&dry, &ProgressReporter::new()).await.unwrap();
        assert!(!outcome.built);
        assert_eq!(
            fs::read_to_string(dir.path().join("Cargo.toml")).unwrap(),
            cargo("0.1.0")
        );
    }

    #[tokio::test]
    async fn existing_tag_is_left_in_place() {
        let Some(dir) = repo_with(&[("0.1.0", "feat: a"), ("0.2.0", "feat: b")]) else {
            return;
        };
        git(dir.path(), &["tag", "v0.2.0"]);

        let outcome = execute(&job(dir.path()), &ProgressReporter::new()).await.unwrap();
        assert!(outcome.action.is_tag());
        assert!(tag_exists(dir.path(), "v0.2.0").await);
    }

    #[tokio::test]
    async fn feature_branches_are_refused() {
        let Some(dir) = repo_with(&[("0.1.0", "feat: a")]) else {
            return;
        };
        git(dir.path(), &["checkout", "--quiet", "-b", "feature"]);

        let result = execute(&job(dir.path()), &ProgressReporter::new()).await;
        assert!(matches!(result, Err(CliError::Argument(_))));

        let mut anywhere = job(dir.path());
        anywhere.any_branch = true;
        assert!(execute(&anywhere, &ProgressReporter::new()).await.is_ok());
    }

    #[tokio::test]
    async fn build_runs_and_reports_failures() {
        let Some(dir) = repo_with(&[("0.1.0", "feat: a")]) else {
            return;
        };
        let mut building = job(dir.path());
        building.skip_build = false;
        let outcome = execute(&building, &ProgressReporter::new()).await.unwrap();
        assert!(outcome.built);

        building.build_command = vec!["git".to_string(), "no-such-subcommand".to_string()];
        let result = execute(&building, &ProgressReporter::new()).await;
        assert!(matches!(result, Err(CliError::Build { .. })));
    }

    #[tokio::test]
    async fn phases_are_reported_in_order() {
        let Some(dir) = repo_with(&[("0.1.0", "feat: a")]) else {
            return;
        };
        let events = Arc::new(Mutex::new(Vec::new()));
        let sink = events.clone();
        let reporter = ProgressReporter::with_callback(Box::new(move |p: Progress| {
            if let Progress::PhaseStart { name } = p {
                sink.lock().unwrap().push(name);
            }
        }));

        execute(&job(dir.path()), &reporter).await.unwrap();
        assert_eq!(
            *events.lock().unwrap(),
            [
                "Detecting version",
                "Applying release",
                "Building package",
                "Collecting release notes"
            ]
        );
    }
}
