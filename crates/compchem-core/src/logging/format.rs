use chrono::Local;
use std::fmt;
use tracing::field::{Field, Visit};
use tracing::{Event, Level, Subscriber};
use tracing_subscriber::fmt::format::Writer;
use tracing_subscriber::fmt::{FmtContext, FormatEvent, FormatFields};
use tracing_subscriber::registry::LookupSpan;

const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecordStyle {
    /// `LEVEL: [name] message`
    Concise,
    /// `YYYY-MM-DD HH:MM:SS [name:line] LEVEL: message`
    Detailed,
}

/// Event formatter for logger sinks.
///
/// Reads the `logger` and `line` fields attached by [`Logger`](super::Logger);
/// events without them fall back to the event's target and source line.
#[derive(Debug, Clone, Copy)]
pub struct RecordFormat {
    style: RecordStyle,
}

impl RecordFormat {
    pub fn concise() -> Self {
        Self {
            style: RecordStyle::Concise,
        }
    }

    pub fn detailed() -> Self {
        Self {
            style: RecordStyle::Detailed,
        }
    }

    pub fn style(&self) -> RecordStyle {
        self.style
    }
}

impl<S, N> FormatEvent<S, N> for RecordFormat
where
    S: Subscriber + for<'a> LookupSpan<'a>,
    N: for<'a> FormatFields<'a> + 'static,
{
    fn format_event(
        &self,
        _ctx: &FmtContext<'_, S, N>,
        mut writer: Writer<'_>,
        event: &Event<'_>,
    ) -> fmt::Result {
        let metadata = event.metadata();
        let mut record = RecordFields::default();
        event.record(&mut record);

        let name = record.logger.as_deref().unwrap_or(metadata.target());
        let level = level_name(*metadata.level());
        match self.style {
            RecordStyle::Concise => writeln!(writer, "{}: [{}] {}", level, name, record.message),
            RecordStyle::Detailed => writeln!(
                writer,
                "{} [{}:{}] {}: {}",
                Local::now().format(TIMESTAMP_FORMAT),
                name,
                record.line.or(metadata.line().map(u64::from)).unwrap_or(0),
                level,
                record.message
            ),
        }
    }
}

pub(crate) fn level_name(level: Level) -> &'static str {
    match level {
        Level::TRACE => "TRACE",
        Level::DEBUG => "DEBUG",
        Level::INFO => "INFO",
        Level::WARN => "WARNING",
        _ => "ERROR",
    }
}

#[derive(Default)]
struct RecordFields {
    message: String,
    logger: Option<String>,
    line: Option<u64>,
}

impl Visit for RecordFields {
    fn record_str(&mut self, field: &Field, value: &str) {
        match field.name() {
            "logger" => self.logger = Some(value.to_string()),
            "message" => self.message = value.to_string(),
            _ => {}
        }
    }

    fn record_u64(&mut self, field: &Field, value: u64) {
        if field.name() == "line" {
            self.line = Some(value);
        }
    }

    fn record_debug(&mut self, field: &Field, value: &dyn fmt::Debug) {
        match field.name() {
            "message" => self.message = format!("{:?}", value),
            "logger" => self.logger = Some(format!("{:?}", value)),
            _ => {}
        }
    }
}
