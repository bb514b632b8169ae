use super::logger::{Logger, default_logger};
use std::fmt;

/// Runs `f` with a logger named after the function it wraps.
///
/// The arguments are logged on entry and the return value on exit, both at
/// debug level, as a child of `parent`. Errors are logged before they are
/// returned. Without a parent the [`default_logger`] is used and the child
/// warns about it.
///
/// ```no_run
/// use compchem_toolkit::logging::{named_logging, default_logger};
///
/// let parent = default_logger();
/// let total: Result<i32, std::num::ParseIntError> =
///     named_logging(Some(&parent), "parse_charge", &[&"-2"], |logger| {
///         logger.info("parsing formal charge");
///         "-2".parse::<i32>()
///     });
/// ```
pub fn named_logging<T, E, F>(
    parent: Option<&Logger>,
    fn_name: &str,
    args: &[&dyn fmt::Debug],
    f: F,
) -> Result<T, E>
where
    F: FnOnce(&Logger) -> Result<T, E>,
    T: fmt::Debug,
    E: fmt::Display,
{
    let (parent, issue_warning) = match parent {
        Some(parent) => (parent.clone(), false),
        None => (default_logger(), true),
    };

    let named_logger = parent.child(fn_name);
    if issue_warning {
        named_logger.warn(format!(
            "{} called without a parent logger.  Using {} as parent.",
            fn_name,
            parent.name()
        ));
    }

    let formatted_arguments = args
        .iter()
        .map(|arg| format!("{:?}", arg))
        .collect::<Vec<_>>()
        .join(", ");
    named_logger.debug(format!(
        "Begin function - Arguments: {}",
        formatted_arguments
    ));

    match f(&named_logger) {
        Ok(value) => {
            named_logger.debug(format!("Returned: - return = {:?}", value));
            Ok(value)
        }
        Err(err) => {
            named_logger.error(format!(
                "Logger '{}' Raised an exception: {}",
                fn_name, err
            ));
            Err(err)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::logging::{DEFAULT_LOGGER_NAME, LoggerOptions, close_logger, create_logger};
    use serial_test::serial;
    use std::fs;
    use std::path::PathBuf;
    use tempfile::tempdir;
    use tracing::level_filters::LevelFilter;

    fn parent_in(dir: &std::path::Path) -> Logger {
        create_logger(&LoggerOptions {
            name: "named_parent".to_string(),
            console: LevelFilter::OFF,
            file: LevelFilter::DEBUG,
            logdir: dir.to_path_buf(),
            fname: PathBuf::from("named.log"),
            propagate: true,
        })
        .unwrap()
    }

    #[test]
    #[serial]
    fn logs_arguments_and_return_value() {
        let dir = tempdir().unwrap();
        let parent = parent_in(dir.path());

        let result: Result<usize, String> =
            named_logging(Some(&parent), "count_atoms", &[&"C6H6", &2], |logger| {
                logger.info("counting");
                Ok(12)
            });
        assert_eq!(result.unwrap(), 12);

        let content = fs::read_to_string(parent.logfile().unwrap()).unwrap();
        assert!(content.contains("[named_parent.count_atoms:"));
        assert!(content.contains("DEBUG: Begin function - Arguments: \"C6H6\", 2"));
        assert!(content.contains("INFO: counting"));
        assert!(content.contains("DEBUG: Returned: - return = 12"));
        assert!(!content.contains("without a parent logger"));
        close_logger(&parent);
    }

    #[test]
    #[serial]
    fn logs_and_returns_errors() {
        let dir = tempdir().unwrap();
        let parent = parent_in(dir.path());

        let result: Result<(), String> =
            named_logging(Some(&parent), "explode", &[], |_| Err("boom".to_string()));
        assert_eq!(result.unwrap_err(), "boom");

        let content = fs::read_to_string(parent.logfile().unwrap()).unwrap();
        assert!(content.contains("DEBUG: Begin function - Arguments: \n"));
        assert!(content.contains("ERROR: Logger 'explode' Raised an exception: boom"));
        assert!(!content.contains("Returned:"));
        close_logger(&parent);
    }

    #[test]
    #[serial]
    fn missing_parent_falls_back_to_default_logger_with_a_warning() {
        let dir = tempdir().unwrap();
        let default = create_logger(&LoggerOptions {
            name: DEFAULT_LOGGER_NAME.to_string(),
            console: LevelFilter::OFF,
            file: LevelFilter::DEBUG,
            logdir: dir.path().to_path_buf(),
            fname: PathBuf::from("default.log"),
            propagate: true,
        })
        .unwrap();

        let result: Result<&str, String> = named_logging(None, "orphan", &[&1], |_| Ok("done"));
        assert_eq!(result.unwrap(), "done");

        let content = fs::read_to_string(default.logfile().unwrap()).unwrap();
        assert!(content.contains(&format!(
            "[{}.orphan:",
            DEFAULT_LOGGER_NAME
        )));
        assert!(content.contains(&format!(
            "WARNING: orphan called without a parent logger.  Using {} as parent.",
            DEFAULT_LOGGER_NAME
        )));
        assert!(content.contains("DEBUG: Returned: - return = \"done\""));
        close_logger(&default);
    }
}
