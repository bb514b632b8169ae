use super::version::Version;
use std::collections::BTreeMap;
use std::fmt::Write;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Section {
    Features,
    BugFixes,
    Documentation,
    Maintenance,
    Other,
}

impl Section {
    pub fn title(&self) -> &'static str {
        match self {
            Self::Features => "Features",
            Self::BugFixes => "Bug Fixes",
            Self::Documentation => "Documentation",
            Self::Maintenance => "Maintenance",
            Self::Other => "Other Changes",
        }
    }

    fn from_commit_type(kind: &str) -> Option<Self> {
        match kind {
            "feat" => Some(Self::Features),
            "fix" => Some(Self::BugFixes),
            "docs" => Some(Self::Documentation),
            "build" | "ci" | "chore" => Some(Self::Maintenance),
            _ => None,
        }
    }
}

/// Release notes grouped by conventional-commit type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReleaseNotes {
    version: Version,
    sections: BTreeMap<Section, Vec<String>>,
}

impl ReleaseNotes {
    pub fn from_commits<I, S>(version: Version, subjects: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut sections: BTreeMap<Section, Vec<String>> = BTreeMap::new();
        for subject in subjects {
            let subject = subject.as_ref().trim();
            if subject.is_empty() {
                continue;
            }
            let (section, text) = classify(subject);
            sections.entry(section).or_default().push(text.to_string());
        }
        Self { version, sections }
    }

    pub fn version(&self) -> Version {
        self.version
    }

    pub fn entries(&self, section: Section) -> &[String] {
        self.sections.get(&section).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn is_empty(&self) -> bool {
        self.sections.is_empty()
    }

    pub fn render(&self) -> String {
        let mut out = format!("# {}\n", self.version.tag_name());
        if self.sections.is_empty() {
            out.push_str("\nNo changes.\n");
            return out;
        }
        for (section, entries) in &self.sections {
            let _ = write!(out, "\n## {}\n\n", section.title());
            for entry in entries {
                let _ = writeln!(out, "- {}", entry);
            }
        }
        out
    }
}

/// Splits `type(scope)!: description` into its section and description.
/// Subjects without a recognized type go to [`Section::Other`] unchanged.
fn classify(subject: &str) -> (Section, &str) {
    let Some((prefix, description)) = subject.split_once(':') else {
        return (Section::Other, subject);
    };
    let kind = prefix
        .split(['(', '!'])
        .next()
        .unwrap_or_default()
        .trim()
        .to_ascii_lowercase();
    match Section::from_commit_type(&kind) {
        Some(section) if !description.trim().is_empty() => (section, description.trim()),
        _ => (Section::Other, subject),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn groups_commits_by_conventional_type() {
        let notes = ReleaseNotes::from_commits(
            Version::new(0, 2, 0),
            [
                "feat: add xyz reader",
                "fix(parser): handle empty frames",
                "docs: describe logging keywords",
                "ci: cache cargo registry",
                "chore!: drop old toolchain",
                "Merge branch 'main'",
                "",
            ],
        );

        assert_eq!(notes.entries(Section::Features), ["add xyz reader"]);
        assert_eq!(notes.entries(Section::BugFixes), ["handle empty frames"]);
        assert_eq!(notes.entries(Section::Documentation), ["describe logging keywords"]);
        assert_eq!(
            notes.entries(Section::Maintenance),
            ["cache cargo registry", "drop old toolchain"]
        );
        assert_eq!(notes.entries(Section::Other), ["Merge branch 'main'"]);
    }

    #[test]
    fn unknown_types_and_empty_descriptions_stay_verbatim() {
        let notes = ReleaseNotes::from_commits(Version::new(0, 1, 0), ["perf: faster", "feat:"]);
        assert_eq!(notes.entries(Section::Other), ["perf: faster", "feat:"]);
    }

    #[test]
    fn render_orders_sections_and_skips_empty_ones() {
        let notes = ReleaseNotes::from_commits(
            Version::new(1, 0, 0),
            ["tidy up", "fix: off-by-one", "feat: new command"],
        );
        assert_eq!(
            notes.render(),
            "# v1.0.0\n\n## Features\n\n- new command\n\n## Bug Fixes\n\n- off-by-one\n\n## Other Changes\n\n- tidy up\n"
        );
    }

    #[test]
    fn render_without_commits_says_so() {
        let notes = ReleaseNotes::from_commits(Version::new(0, 1, 1).with_dev(7), Vec::<String>::new());
        assert!(notes.is_empty());
        assert_eq!(notes.render(), "# v0.1.1.dev7\n\nNo changes.\n");
    }
}
