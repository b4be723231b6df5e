//! Structured stage logging for the receive pipeline.
//!
//! The library never prints. Each stage records what it did into a
//! [`StageLogger`] owned by the pipeline, and the caller decides how to
//! render the entries.

use std::fmt;

/// Log level for filtering messages.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum LogLevel {
    Debug = 0,
    Info = 1,
    Warn = 2,
    Error = 3,
}

impl fmt::Display for LogLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            LogLevel::Debug => "DEBUG",
            LogLevel::Info => "INFO",
            LogLevel::Warn => "WARN",
            LogLevel::Error => "ERROR",
        };
        f.pad(name)
    }
}

/// A single log entry tagged with the stage that produced it.
#[derive(Debug, Clone)]
pub struct LogEntry {
    pub level: LogLevel,
    pub stage: &'static str,
    pub message: String,
}

impl fmt::Display for LogEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{:5}] {}: {}", self.level, self.stage, self.message)
    }
}

/// Collects structured log entries from the pipeline stages.
#[derive(Debug, Clone)]
pub struct StageLogger {
    min_level: LogLevel,
    entries: Vec<LogEntry>,
}

impl StageLogger {
    pub fn new(min_level: LogLevel) -> Self {
        Self {
            min_level,
            entries: Vec::new(),
        }
    }

    pub fn log(&mut self, level: LogLevel, stage: &'static str, message: impl Into<String>) {
        if level >= self.min_level {
            self.entries.push(LogEntry {
                level,
                stage,
                message: message.into(),
            });
        }
    }

    pub fn debug(&mut self, stage: &'static str, message: impl Into<String>) {
        self.log(LogLevel::Debug, stage, message);
    }

    pub fn info(&mut self, stage: &'static str, message: impl Into<String>) {
        self.log(LogLevel::Info, stage, message);
    }

    pub fn warn(&mut self, stage: &'static str, message: impl Into<String>) {
        self.log(LogLevel::Warn, stage, message);
    }

    pub fn error(&mut self, stage: &'static str, message: impl Into<String>) {
        self.log(LogLevel::Error, stage, message);
    }

    pub fn entries(&self) -> &[LogEntry] {
        &self.entries
    }
}

impl Default for StageLogger {
    fn default() -> Self {
        Self::new(LogLevel::Info)
    }
}
