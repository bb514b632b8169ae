use super::ReleaseError;
use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

/// A release version of the form `MAJOR.MINOR.PATCH[.devN]`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Version {
    pub major: u64,
    pub minor: u64,
    pub patch: u64,
    pub dev: Option<u64>,
}

impl Version {
    pub const fn new(major: u64, minor: u64, patch: u64) -> Self {
        Self {
            major,
            minor,
            patch,
            dev: None,
        }
    }

    pub fn is_dev(&self) -> bool {
        self.dev.is_some()
    }

    /// Increments the patch number and drops any development suffix.
    ///
    /// # Errors
    ///
    /// Returns [`ReleaseError::PatchOverflow`] when the patch number cannot grow.
    pub fn bump_patch(&self) -> Result<Self, ReleaseError> {
        let patch = self
            .patch
            .checked_add(1)
            .ok_or_else(|| ReleaseError::PatchOverflow(self.to_string()))?;
        Ok(Self {
            patch,
            dev: None,
            ..*self
        })
    }

    pub fn with_dev(&self, dev: u64) -> Self {
        Self {
            dev: Some(dev),
            ..*self
        }
    }

    /// The next patch version marked as a development build, e.g.
    /// `0.1.0` with timestamp `1700000000` becomes `0.1.1.dev1700000000`.
    pub fn dev_bump(&self, timestamp: u64) -> Result<Self, ReleaseError> {
        self.bump_patch().map(|bumped| bumped.with_dev(timestamp))
    }

    pub fn tag_name(&self) -> String {
        format!("v{}", self)
    }
}

impl fmt::Display for Version {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}.{}", self.major, self.minor, self.patch)?;
        if let Some(dev) = self.dev {
            write!(f, ".dev{}", dev)?;
        }
        Ok(())
    }
}

impl FromStr for Version {
    type Err = ReleaseError;

    /// Accepts an optional leading `v` and the dev spellings `.devN`,
    /// `.dev.N` and `-devN`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || ReleaseError::InvalidVersion(s.to_string());
        let trimmed = s.trim();
        let trimmed = trimmed.strip_prefix('v').unwrap_or(trimmed);

        let (release, dev) = match trimmed.find("dev") {
            Some(idx) => {
                let release = trimmed[..idx]
                    .strip_suffix(['.', '-'])
                    .ok_or_else(invalid)?;
                let number = trimmed[idx + 3..].trim_start_matches('.');
                let dev = if number.is_empty() {
                    0
                } else {
                    parse_number(number).ok_or_else(invalid)?
                };
                (release, Some(dev))
            }
            None => (trimmed, None),
        };

        let mut parts = release.split('.');
        let mut next = || parts.next().and_then(parse_number).ok_or_else(invalid);
        let (major, minor, patch) = (next()?, next()?, next()?);
        if parts.next().is_some() {
            return Err(invalid());
        }

        Ok(Self {
            major,
            minor,
            patch,
            dev,
        })
    }
}

fn parse_number(s: &str) -> Option<u64> {
    if s.is_empty() || !s.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    s.parse().ok()
}

impl Ord for Version {
    fn cmp(&self, other: &Self) -> Ordering {
        (self.major, self.minor, self.patch)
            .cmp(&(other.major, other.minor, other.patch))
            .then_with(|| match (self.dev, other.dev) {
                (None, None) => Ordering::Equal,
                (Some(_), None) => Ordering::Less,
                (None, Some(_)) => Ordering::Greater,
                (Some(a), Some(b)) => a.cmp(&b),
            })
    }
}

impl PartialOrd for Version {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn v(s: &str) -> Version {
        s.parse().unwrap()
    }

    #[test]
    fn parses_plain_and_prefixed_versions() {
        assert_eq!(v("0.1.0"), Version::new(0, 1, 0));
        assert_eq!(v("v2.10.3"), Version::new(2, 10, 3));
        assert_eq!(v(" 1.2.3 \n"), Version::new(1, 2, 3));
    }

    #[test]
    fn parses_all_dev_spellings() {
        let expected = Version::new(0, 1, 1).with_dev(1700000000);
        assert_eq!(v("0.1.1.dev1700000000"), expected);
        assert_eq!(v("0.1.1.dev.1700000000"), expected);
        assert_eq!(v("0.1.1-dev1700000000"), expected);
        assert_eq!(v("0.1.1.dev"), Version::new(0, 1, 1).with_dev(0));
    }

    #[test]
    fn rejects_malformed_versions() {
        for bad in ["", "1", "1.2", "1.2.3.4", "1.x.3", "1.2.3dev1", "1.2.3.devx", "-1.2.3"] {
            assert!(
                matches!(bad.parse::<Version>(), Err(ReleaseError::InvalidVersion(_))),
                "{bad:?} should be rejected"
            );
        }
    }

    #[test]
    fn displays_normalized_form() {
        assert_eq!(v("v0.1.1.dev.42").to_string(), "0.1.1.dev42");
        assert_eq!(v("3.0.0").to_string(), "3.0.0");
    }

    #[test]
    fn bump_patch_increments_and_clears_dev() {
        assert_eq!(v("0.1.9").bump_patch().unwrap(), v("0.1.10"));
        assert_eq!(v("0.1.1.dev5").bump_patch().unwrap(), v("0.1.2"));
    }

    #[test]
    fn bumping_the_largest_patch_is_an_error() {
        let max = v("0.0.18446744073709551615");
        assert!(matches!(max.bump_patch(), Err(ReleaseError::PatchOverflow(_))));
        assert!(matches!(max.dev_bump(1), Err(ReleaseError::PatchOverflow(_))));
    }

    #[test]
    fn dev_bump_produces_well_formed_version() {
        let bumped = v("0.1.0").dev_bump(1700000000).unwrap();
        assert_eq!(bumped.to_string(), "0.1.1.dev1700000000");
        assert_eq!(v(&bumped.to_string()), bumped);
        assert!(bumped.is_dev());
    }

    #[test]
    fn tag_name_is_prefixed_with_v() {
        assert_eq!(v("1.4.2").tag_name(), "v1.4.2");
    }

    #[test]
    fn dev_releases_sort_before_final_release() {
        assert!(v("0.1.1.dev99") < v("0.1.1"));
        assert!(v("0.1.1.dev1") < v("0.1.1.dev2"));
        assert!(v("0.1.1") < v("0.2.0.dev1"));
        assert!(v("1.0.0") > v("0.99.99"));
    }
}
