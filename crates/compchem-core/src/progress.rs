use crate::logging::{Logger, ProgressLogWriter};
use std::io::Write;
use std::sync::Mutex;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Progress {
    PhaseStart { name: &'static str },
    PhaseFinish,

    TaskStart { total_steps: u64 },
    TaskIncrement,
    TaskFinish,

    Message(String),
}

pub type ProgressCallback<'a> = Box<dyn Fn(Progress) + Send + Sync + 'a>;

#[derive(Default)]
pub struct ProgressReporter<'a> {
    callback: Option<ProgressCallback<'a>>,
}

impl<'a> ProgressReporter<'a> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_callback(callback: ProgressCallback<'a>) -> Self {
        Self {
            callback: Some(callback),
        }
    }

    #[inline]
    pub fn report(&self, event: Progress) {
        if let Some(cb) = &self.callback {
            cb(event);
        }
    }
}

/// A callback that renders progress events as log records instead of a bar.
///
/// Task increments are counted but only logged when a task finishes.
pub fn log_callback(logger: Logger) -> ProgressCallback<'static> {
    let state = Mutex::new(LogProgressState {
        writer: ProgressLogWriter::new(logger),
        phase: None,
        done: 0,
        total: 0,
    });

    Box::new(move |progress: Progress| {
        let Ok(mut state) = state.lock() else {
            return;
        };
        let line = match progress {
            Progress::PhaseStart { name } => {
                state.phase = Some(name);
                format!("{}...", name)
            }
            Progress::PhaseFinish => format!("✓ {}", state.phase.take().unwrap_or("Done")),
            Progress::TaskStart { total_steps } => {
                state.done = 0;
                state.total = total_steps;
                return;
            }
            Progress::TaskIncrement => {
                state.done += 1;
                return;
            }
            Progress::TaskFinish => format!("{}/{} steps", state.done, state.total),
            Progress::Message(msg) => msg,
        };
        let _ = state.writer.write_all(line.as_bytes());
        let _ = state.writer.flush();
    })
}

struct LogProgressState {
    writer: ProgressLogWriter,
    phase: Option<&'static str>,
    done: u64,
    total: u64,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::logging::{LoggerOptions, close_logger, create_logger};
    use serial_test::serial;
    use std::path::PathBuf;
    use std::sync::Arc;
    use tempfile::tempdir;
    use tracing::level_filters::LevelFilter;

    #[test]
    fn reporter_without_callback_ignores_events() {
        let reporter = ProgressReporter::new();
        reporter.report(Progress::TaskIncrement);
    }

    #[test]
    fn reporter_forwards_events_to_callback() {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = seen.clone();
        let reporter = ProgressReporter::with_callback(Box::new(move |p| {
            sink.lock().unwrap().push(p);
        }));

        reporter.report(Progress::PhaseStart { name: "Detect" });
        reporter.report(Progress::PhaseFinish);

        assert_eq!(
            *seen.lock().unwrap(),
            vec![Progress::PhaseStart { name: "Detect" }, Progress::PhaseFinish]
        );
    }

    #[test]
    #[serial]
    fn log_callback_writes_phases_and_task_totals() {
        let dir = tempdir().unwrap();
        let logger = create_logger(&LoggerOptions {
            name: "progress_log".to_string(),
            console: LevelFilter::OFF,
            file: LevelFilter::INFO,
            logdir: dir.path().to_path_buf(),
            fname: PathBuf::from("progress.log"),
            propagate: true,
        })
        .unwrap();
        let reporter = ProgressReporter::with_callback(log_callback(logger.clone()));

        reporter.report(Progress::PhaseStart { name: "Building" });
        reporter.report(Progress::TaskStart { total_steps: 3 });
        reporter.report(Progress::TaskIncrement);
        reporter.report(Progress::TaskIncrement);
        reporter.report(Progress::TaskFinish);
        reporter.report(Progress::Message("artifact ready".into()));
        reporter.report(Progress::PhaseFinish);

        let content = std::fs::read_to_string(logger.logfile().unwrap()).unwrap();
        let messages: Vec<&str> = content
            .lines()
            .map(|l| l.split_once("INFO: ").unwrap().1)
            .collect();
        assert_eq!(
            messages,
            vec!["Building...", "2/3 steps", "artifact ready", "✓ Building"]
        );
        close_logger(&logger);
    }
}
