use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ParseError {
    #[error("Invalid override '{0}'. Expected 'section.key=value' (e.g., 'logging.console=debug').")]
    InvalidOverrideFormat(String),

    #[error("Unknown configuration section '{0}'. Expected 'logging' or 'release'.")]
    UnknownSection(String),

    #[error("Component '{component}' cannot be empty in override '{name}'.")]
    EmptyComponent {
        component: &'static str,
        name: String,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigSection {
    Logging,
    Release,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SetValue {
    pub section: ConfigSection,
    pub key: String,
    pub value: String,
}

/// Parses a `-S section.key=value` override.
pub fn parse_set_value(raw: &str) -> Result<SetValue, ParseError> {
    let (path, value) = raw
        .split_once('=')
        .ok_or_else(|| ParseError::InvalidOverrideFormat(raw.to_string()))?;
    let (section, key) = path
        .trim()
        .split_once('.')
        .ok_or_else(|| ParseError::InvalidOverrideFormat(raw.to_string()))?;

    if key.is_empty() {
        return Err(ParseError::EmptyComponent {
            component: "key",
            name: raw.to_string(),
        });
    }

    let section = match section {
        "logging" => ConfigSection::Logging,
        "release" => ConfigSection::Release,
        "" => {
            return Err(ParseError::EmptyComponent {
                component: "section",
                name: raw.to_string(),
            });
        }
        other => return Err(ParseError::UnknownSection(other.to_string())),
    };

    Ok(SetValue {
        section,
        key: key.to_string(),
        value: value.trim().to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_section_key_and_value() {
        assert_eq!(
            parse_set_value("logging.console=debug").unwrap(),
            SetValue {
                section: ConfigSection::Logging,
                key: "console".to_string(),
                value: "debug".to_string(),
            }
        );
    }

    #[test]
    fn value_may_contain_equals_and_spaces() {
        let parsed = parse_set_value("release.build-command=make dist VERSION=1").unwrap();
        assert_eq!(parsed.section, ConfigSection::Release);
        assert_eq!(parsed.key, "build-command");
        assert_eq!(parsed.value, "make dist VERSION=1");
    }

    #[test]
    fn missing_equals_or_section_is_rejected() {
        assert_eq!(
            parse_set_value("logging.console"),
            Err(ParseError::InvalidOverrideFormat("logging.console".into()))
        );
        assert_eq!(
            parse_set_value("console=debug"),
            Err(ParseError::InvalidOverrideFormat("console=debug".into()))
        );
    }

    #[test]
    fn empty_components_are_rejected() {
        assert!(matches!(
            parse_set_value(".console=debug"),
            Err(ParseError::EmptyComponent { component: "section", .. })
        ));
        assert!(matches!(
            parse_set_value("logging.=debug"),
            Err(ParseError::EmptyComponent { component: "key", .. })
        ));
    }

    #[test]
    fn unknown_sections_are_rejected() {
        assert_eq!(
            parse_set_value("optimization.num=3"),
            Err(ParseError::UnknownSection("optimization".into()))
        );
    }
}
