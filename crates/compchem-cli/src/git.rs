use crate::error::{CliError, Result};
use std::path::{Path, PathBuf};
use std::process::Output;
use tokio::process::Command;
use tracing::{debug, trace};

/// A thin async wrapper over the `git` executable, run inside one working tree.
#[derive(Debug, Clone)]
pub struct Git {
    workdir: PathBuf,
}

impl Git {
    pub fn new(workdir: impl Into<PathBuf>) -> Self {
        Self {
            workdir: workdir.into(),
        }
    }

    pub fn workdir(&self) -> &Path {
        &self.workdir
    }

    async fn output(&self, args: &[&str]) -> Result<Output> {
        trace!("Running git {:?} in {:?}", args, self.workdir);
        Command::new("git")
            .args(args)
            .current_dir(&self.workdir)
            .kill_on_drop(true)
            .output()
            .await
            .map_err(|e| CliError::Git {
                command: args.join(" "),
                message: e.to_string(),
            })
    }

    /// Runs git and returns trimmed stdout, failing on a non-zero exit.
    async fn run(&self, args: &[&str]) -> Result<String> {
        let output = self.output(args).await?;
        if !output.status.success() {
            return Err(CliError::Git {
                command: args.join(" "),
                message: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            });
        }
        Ok(String::from_utf8_lossy(&output.stdout).trim_end().to_string())
    }

    /// Runs git and returns trimmed stdout, or `None` on a non-zero exit.
    async fn try_run(&self, args: &[&str]) -> Result<Option<String>> {
        let output = self.output(args).await?;
        if !output.status.success() {
            debug!(
                "git {} exited with {}: {}",
                args.join(" "),
                output.status,
                String::from_utf8_lossy(&output.stderr).trim()
            );
            return Ok(None);
        }
        Ok(Some(
            String::from_utf8_lossy(&output.stdout).trim_end().to_string(),
        ))
    }

    pub async fn has_parent_commit(&self) -> Result<bool> {
        Ok(self
            .try_run(&["rev-parse", "--verify", "--quiet", "HEAD^"])
            .await?
            .is_some())
    }

    /// Returns `None` on a detached HEAD or in a repository without commits.
    pub async fn current_branch(&self) -> Result<Option<String>> {
        Ok(self
            .try_run(&["symbolic-ref", "--quiet", "--short", "HEAD"])
            .await?
            .filter(|b| !b.is_empty()))
    }

    /// Reads a file as of `rev`. `path` is relative to the working directory.
    pub async fn show_file_at(&self, rev: &str, path: &Path) -> Result<Option<String>> {
        let spec = format!("{}:./{}", rev, path.to_string_lossy().replace('\\', "/"));
        self.try_run(&["show", &spec]).await
    }

    pub async fn tag_exists(&self, tag: &str) -> Result<bool> {
        let reference = format!("refs/tags/{}", tag);
        Ok(self
            .try_run(&["rev-parse", "--verify", "--quiet", &reference])
            .await?
            .is_some())
    }

    pub async fn create_tag(&self, tag: &str, message: &str) -> Result<()> {
        self.run(&["tag", "--annotate", tag, "--message", message])
            .await
            .map(|_| ())
    }

    /// The most recent tag reachable from `rev`.
    pub async fn last_tag(&self, rev: &str) -> Result<Option<String>> {
        self.try_run(&["describe", "--tags", "--abbrev=0", rev]).await
    }

    /// Commit subjects in `since..HEAD`, newest first; all of history when
    /// `since` is `None`.
    pub async fn commit_subjects(&self, since: Option<&str>) -> Result<Vec<String>> {
        let range = match since {
            Some(since) => format!("{}..HEAD", since),
            None => "HEAD".to_string(),
        };
        let log = self.run(&["log", "--format=%s", &range]).await?;
        Ok(log.lines().map(String::from).collect())
    }
}
