//! Logger collaborators that receive formatted match lines and errors

use std::cell::RefCell;
use std::io::{self, Write};

use termcolor::{Color, ColorChoice, ColorSpec, StandardStream, WriteColor};
use tracing::warn;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    /// A match line.
    Text,
    Error,
}

/// Renders already-formatted messages somewhere.
///
/// `detail` is an optional rendered preview of the value behind the message.
pub trait Logger {
    fn log(&self, severity: Severity, message: &str, detail: Option<&str>);
}

/// Writes match lines to stdout and errors to stderr, with optional color.
pub struct ConsoleLogger {
    stdout: RefCell<StandardStream>,
    stderr: RefCell<StandardStream>,
}

impl ConsoleLogger {
    pub fn new(use_color: bool) -> Self {
        let choice = if use_color {
            ColorChoice::Auto
        } else {
            ColorChoice::Never
        };
        Self {
            stdout: RefCell::new(StandardStream::stdout(choice)),
            stderr: RefCell::new(StandardStream::stderr(choice)),
        }
    }

    fn write_text(&self, message: &str, detail: Option<&str>) -> io::Result<()> {
        let mut out = self.stdout.borrow_mut();
        // "path -> (kind)": highlight the path
        match message.split_once(" -> ") {
            Some((path, rest)) => {
                out.set_color(ColorSpec::new().set_fg(Some(Color::Blue)).set_bold(true))?;
                write!(out, "{}", path)?;
                out.reset()?;
                write!(out, " -> {}", rest)?;
            }
            None => write!(out, "{}", message)?,
        }
        if let Some(detail) = detail {
            write!(out, " ")?;
            out.set_color(ColorSpec::new().set_fg(Some(Color::Green)))?;
            write!(out, "{}", detail)?;
            out.reset()?;
        }
        writeln!(out)
    }

    fn write_error(&self, message: &str) -> io::Result<()> {
        let mut err = self.stderr.borrow_mut();
        err.set_color(ColorSpec::new().set_fg(Some(Color::Red)).set_bold(true))?;
        write!(err, "error:")?;
        err.reset()?;
        writeln!(err, " {}", message)
    }
}

impl Default for ConsoleLogger {
    fn default() -> Self {
        Self::new(true)
    }
}

impl Logger for ConsoleLogger {
    fn log(&self, severity: Severity, message: &str, detail: Option<&str>) {
        let result = match severity {
            Severity::Text => self.write_text(message, detail),
            Severity::Error => self.write_error(message),
        };
        if let Err(e) = result {
            warn!(error = %e, "console write failed");
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogEntry {
    pub severity: Severity,
    pub message: String,
    pub detail: Option<String>,
}

/// Keeps every entry in memory.
#[derive(Debug, Default)]
pub struct MemoryLogger {
    entries: RefCell<Vec<LogEntry>>,
}

impl MemoryLogger {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn entries(&self) -> Vec<LogEntry> {
        self.entries.borrow().clone()
    }

    /// Messages logged with the given severity, in order.
    pub fn messages(&self, severity: Severity) -> Vec<String> {
        self.entries
            .borrow()
            .iter()
            .filter(|e| e.severity == severity)
            .map(|e| e.message.clone())
            .collect()
    }

    pub fn clear(&self) {
        self.entries.borrow_mut().clear();
    }
}

impl Logger for MemoryLogger {
    fn log(&self, severity: Severity, message: &str, detail: Option<&str>) {
        self.entries.borrow_mut().push(LogEntry {
            severity,
            message: message.to_string(),
            detail: detail.map(str::to_string),
        });
    }
}

/// Discards everything.
#[derive(Debug, Default, Clone, Copy)]
pub struct NullLogger;

impl Logger for NullLogger {
    fn log(&self, _severity: Severity, _message: &str, _detail: Option<&str>) {}
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_memory_logger_records_in_order() {
        let logger = MemoryLogger::new();
        logger.log(Severity::Text, "a -> (number)", Some("1"));
        logger.log(Severity::Error, "bad", None);
        logger.log(Severity::Text, "b -> (number)", Some("2"));

        assert_eq!(
            logger.messages(Severity::Text),
            vec!["a -> (number)", "b -> (number)"]
        );
        assert_eq!(logger.messages(Severity::Error), vec!["bad"]);
        assert_eq!(logger.entries()[0].detail.as_deref(), Some("1"));

        logger.clear();
        assert!(logger.entries().is_empty());
    }
}
