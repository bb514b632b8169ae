use super::ReleaseError;
use super::version::Version;
use std::fs;
use std::path::{Path, PathBuf};

/// The table holding the version, in lookup order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VersionLocation {
    /// `[package]` (Cargo)
    Package,
    /// `[tool.poetry]` (Poetry)
    Poetry,
    /// `[project]` (PEP 621)
    Project,
}

impl VersionLocation {
    const ALL: [VersionLocation; 3] = [Self::Package, Self::Poetry, Self::Project];

    fn table_path(&self) -> &'static [&'static str] {
        match self {
            Self::Package => &["package"],
            Self::Poetry => &["tool", "poetry"],
            Self::Project => &["project"],
        }
    }

    fn header(&self) -> String {
        self.table_path().join(".")
    }
}

/// A TOML project manifest whose version can be rewritten in place.
#[derive(Debug, Clone)]
pub struct Manifest {
    path: PathBuf,
    contents: String,
    location: VersionLocation,
    version: Version,
}

impl Manifest {
    pub fn read(path: impl AsRef<Path>) -> Result<Self, ReleaseError> {
        let path = path.as_ref();
        let contents = fs::read_to_string(path).map_err(|source| ReleaseError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::parse(path, contents)
    }

    pub fn parse(path: impl Into<PathBuf>, contents: String) -> Result<Self, ReleaseError> {
        let (location, version) = locate_version(&contents)?;
        Ok(Self {
            path: path.into(),
            contents,
            location,
            version,
        })
    }

    /// Reads just the version from manifest text, e.g. a manifest taken from
    /// an earlier commit.
    pub fn version_from_str(contents: &str) -> Result<Version, ReleaseError> {
        locate_version(contents).map(|(_, version)| version)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn version(&self) -> Version {
        self.version
    }

    pub fn location(&self) -> VersionLocation {
        self.location
    }

    pub fn contents(&self) -> &str {
        &self.contents
    }

    /// Replaces the version string, leaving every other byte of the file as is.
    pub fn set_version(&mut self, version: Version) -> Result<(), ReleaseError> {
        let header = self.location.header();
        let mut in_table = false;
        let mut replaced = false;
        let mut out = String::with_capacity(self.contents.len() + 16);

        for line in self.contents.split_inclusive('\n') {
            let trimmed = line.trim();
            if trimmed.starts_with('[') {
                in_table = table_header(trimmed).as_deref() == Some(header.as_str());
            } else if in_table && !replaced {
                if let Some(rewritten) = rewrite_version_line(line, &version) {
                    out.push_str(&rewritten);
                    replaced = true;
                    continue;
                }
            }
            out.push_str(line);
        }

        if !replaced {
            return Err(ReleaseError::VersionLineNotFound {
                path: self.path.clone(),
                table: header,
            });
        }
        self.contents = out;
        self.version = version;
        Ok(())
    }

    pub fn write(&self) -> Result<(), ReleaseError> {
        fs::write(&self.path, &self.contents).map_err(|source| ReleaseError::Io {
            path: self.path.clone(),
            source,
        })
    }
}

fn locate_version(contents: &str) -> Result<(VersionLocation, Version), ReleaseError> {
    let table: toml::Table = contents
        .parse()
        .map_err(|e: toml::de::Error| ReleaseError::Manifest(e.message().to_string()))?;

    for location in VersionLocation::ALL {
        let mut value = table.get(location.table_path()[0]);
        for key in &location.table_path()[1..] {
            value = value.and_then(|v| v.get(*key));
        }
        if let Some(version) = value
            .and_then(|v| v.get("version"))
            .and_then(|v| v.as_str())
        {
            return Ok((location, version.parse()?));
        }
    }
    Err(ReleaseError::MissingVersion)
}

fn table_header(trimmed: &str) -> Option<String> {
    let end = trimmed.find(']')?;
    if trimmed.starts_with("[[") {
        return None;
    }
    Some(trimmed[1..end].chars().filter(|c| !c.is_whitespace()).collect())
}

fn rewrite_version_line(line: &str, version: &Version) -> Option<String> {
    let (key, value) = line.split_once('=')?;
    if key.trim() != "version" {
        return None;
    }
    let quote = value.find(['"', '\''])?;
    let quote_char = value[quote..].chars().next()?;
    let close = value[quote + 1..].find(quote_char)? + quote + 1;
    Some(format!(
        "{}={}{}{}",
        key,
        &value[..=quote],
        version,
        &value[close..]
    ))
}
