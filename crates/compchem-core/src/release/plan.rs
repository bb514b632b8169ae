use super::ReleaseError;
use super::version::Version;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReleaseAction {
    /// The manifest version changed since the parent commit; tag it.
    Tag { version: Version, tag: String },
    /// No new version; publish a development build instead.
    DevBump { from: Version, to: Version },
}

impl ReleaseAction {
    /// The version that the build step should package.
    pub fn version(&self) -> Version {
        match self {
            Self::Tag { version, .. } => *version,
            Self::DevBump { to, .. } => *to,
        }
    }

    pub fn is_tag(&self) -> bool {
        matches!(self, Self::Tag { .. })
    }
}

/// Decides what a release run does.
///
/// `previous` is the manifest version at the parent commit, or `None` when
/// there is no parent commit (or it has no readable manifest).
///
/// # Errors
///
/// Fails only when a development bump would overflow the patch number.
pub fn plan_release(
    current: Version,
    previous: Option<Version>,
    timestamp: u64,
) -> Result<ReleaseAction, ReleaseError> {
    match previous {
        Some(previous) if previous != current => Ok(ReleaseAction::Tag {
            version: current,
            tag: current.tag_name(),
        }),
        _ => Ok(ReleaseAction::DevBump {
            from: current,
            to: current.dev_bump(timestamp)?,
        }),
    }
}
