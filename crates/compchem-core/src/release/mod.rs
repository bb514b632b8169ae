//! Release automation: detecting new versions, development bumps and
//! release notes.
//!
//! A release run compares the manifest version at `HEAD` with the one at the
//! parent commit. A changed version is tagged; otherwise the patch version is
//! bumped and given a timestamp-based development suffix.

pub mod manifest;
pub mod notes;
pub mod plan;
pub mod version;

pub use manifest::{Manifest, VersionLocation};
pub use notes::{ReleaseNotes, Section};
pub use plan::{ReleaseAction, plan_release};
pub use version::Version;

use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ReleaseError {
    #[error("Invalid version '{0}'; expected MAJOR.MINOR.PATCH with an optional .devN suffix")]
    InvalidVersion(String),

    #[error("Cannot bump the patch number of {0}: it is already at its maximum")]
    PatchOverflow(String),

    #[error("Failed to parse manifest: {0}")]
    Manifest(String),

    #[error("No version found in [package], [tool.poetry] or [project]")]
    MissingVersion,

    #[error("No `version = ...` line found under [{table}] in '{path}'", path = path.display())]
    VersionLineNotFound { path: PathBuf, table: String },

    #[error("I/O error on '{path}': {source}", path = path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}
