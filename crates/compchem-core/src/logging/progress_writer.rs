use super::logger::Logger;
use std::io;
use tracing::Level;

/// Redirects progress-bar output into a [`Logger`].
///
/// Progress renderers repaint the same line over and over, so only the most
/// recent write is kept (with surrounding `\r`, `\n` and `\t` trimmed) and it
/// is emitted as one record when the writer is flushed.
#[derive(Debug)]
pub struct ProgressLogWriter {
    logger: Logger,
    level: Level,
    buf: String,
}

impl ProgressLogWriter {
    pub fn new(logger: Logger) -> Self {
        Self {
            logger,
            level: Level::INFO,
            buf: String::new(),
        }
    }

    pub fn with_level(mut self, level: Level) -> Self {
        self.level = level;
        self
    }

    pub fn pending(&self) -> &str {
        &self.buf
    }
}

impl io::Write for ProgressLogWriter {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.buf = String::from_utf8_lossy(buf)
            .trim_matches(['\r', '\n', '\t'])
            .to_string();
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        if !self.buf.is_empty() {
            let message = std::mem::take(&mut self.buf);
            self.logger.log(self.level, message);
        }
        Ok(())
    }
}
