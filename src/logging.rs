//! Structured logging for the publish probe
//!
//! The probe never logs through a process-wide singleton. A `Logger` is
//! handed to each probe at configure time and scoped to that instance:
//! - Structured entries with levels, correlation IDs and arbitrary fields
//! - Console, JSON and compact output formats
//! - An in-memory capture sink so callers can inspect what was logged

use crate::error::{AppError, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::io::{self, Write};
use std::sync::Arc;
use tokio::sync::RwLock;
use uuid::Uuid;

/// Log level enumeration
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum LogLevel {
    /// Trace level - most detailed
    Trace = 0,
    /// Debug level - detailed information for debugging
    Debug = 1,
    /// Info level - general application information
    Info = 2,
    /// Warning level - potentially harmful situations
    Warn = 3,
    /// Error level - error events but the run can continue
    Error = 4,
}

impl LogLevel {
    /// Get log level name as string
    pub fn as_str(&self) -> &'static str {
        match self {
            LogLevel::Trace => "TRACE",
            LogLevel::Debug => "DEBUG",
            LogLevel::Info => "INFO",
            LogLevel::Warn => "WARN",
            LogLevel::Error => "ERROR",
        }
    }

    /// Get ANSI color code for console output
    pub fn color_code(&self) -> &'static str {
        match self {
            LogLevel::Trace => "\x1b[37m",    // White
            LogLevel::Debug => "\x1b[36m",    // Cyan
            LogLevel::Info => "\x1b[32m",     // Green
            LogLevel::Warn => "\x1b[33m",     // Yellow
            LogLevel::Error => "\x1b[31m",    // Red
        }
    }

    /// Reset ANSI color code
    pub fn reset_code() -> &'static str {
        "\x1b[0m"
    }
}

impl std::str::FromStr for LogLevel {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_uppercase().as_str() {
            "TRACE" => Ok(LogLevel::Trace),
            "DEBUG" => Ok(LogLevel::Debug),
            "INFO" => Ok(LogLevel::Info),
            "WARN" | "WARNING" => Ok(LogLevel::Warn),
            "ERROR" => Ok(LogLevel::Error),
            _ => Err(AppError::parse(format!("Invalid log level: {}", s))),
        }
    }
}

/// Log entry structure for structured logging
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LogEntry {
    /// Timestamp when log entry was created
    pub timestamp: DateTime<Utc>,
    /// Log level
    pub level: LogLevel,
    /// Log message
    pub message: String,
    /// Logger name/component
    pub logger: String,
    /// Correlation ID of the message being published, if any
    pub correlation_id: Option<String>,
    /// Additional structured fields
    pub fields: HashMap<String, serde_json::Value>,
}

/// Log output format options
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum LogFormat {
    /// Human-readable console format
    Console,
    /// JSON format for structured logging
    Json,
    /// Compact single-line format
    Compact,
}

/// In-memory log sink shared between a logger and whoever inspects it
#[derive(Debug, Clone, Default)]
pub struct LogCapture {
    entries: Arc<RwLock<Vec<LogEntry>>>,
}

impl LogCapture {
    /// Snapshot of all captured entries
    pub async fn entries(&self) -> Vec<LogEntry> {
        self.entries.read().await.clone()
    }

    /// Whether an entry at `level` contains `needle` in its message
    pub async fn contains(&self, level: LogLevel, needle: &str) -> bool {
        self.entries
            .read()
            .await
            .iter()
            .any(|entry| entry.level == level && entry.message.contains(needle))
    }

    /// Number of entries at or above `level`
    pub async fn count_at_least(&self, level: LogLevel) -> usize {
        self.entries
            .read()
            .await
            .iter()
            .filter(|entry| entry.level >= level)
            .count()
    }

    async fn push(&self, entry: LogEntry) {
        self.entries.write().await.push(entry);
    }
}

#[derive(Debug, Clone)]
enum LogSink {
    /// stderr for warnings and errors, stdout otherwise
    Stdio,
    /// stderr for every level, keeps stdout for machine-readable output
    Stderr,
    Capture(LogCapture),
}

/// Shared logging context for session tracking
#[derive(Debug, Default)]
struct LogContext {
    /// Correlation ID for the whole run
    session_id: Option<String>,
    /// Additional context fields
    context_fields: HashMap<String, serde_json::Value>,
}

/// Logger implementation with multiple output formats
#[derive(Debug, Clone)]
pub struct Logger {
    /// Minimum log level to output
    min_level: LogLevel,
    /// Whether to use colored output
    use_color: bool,
    /// Output format
    format: LogFormat,
    /// Logger name
    name: String,
    /// Where entries go
    sink: LogSink,
    /// Shared context storage
    context: Arc<RwLock<LogContext>>,
}

impl Logger {
    /// Create a new console logger at info level
    pub fn new(name: String) -> Self {
        Self {
            min_level: LogLevel::Info,
            use_color: true,
            format: LogFormat::Console,
            name,
            sink: LogSink::Stdio,
            context: Arc::new(RwLock::new(LogContext::default())),
        }
    }

    /// Create a console logger from the harness verbosity flags
    pub fn with_flags(name: String, verbose: bool, debug: bool, use_color: bool) -> Self {
        let min_level = if debug {
            LogLevel::Debug
        } else if verbose {
            LogLevel::Info
        } else {
            LogLevel::Warn
        };

        Self {
            min_level,
            use_color,
            format: if debug { LogFormat::Json } else { LogFormat::Console },
            name,
            sink: LogSink::Stdio,
            context: Arc::new(RwLock::new(LogContext::default())),
        }
    }

    /// Create a logger that records every entry in memory
    pub fn captured(name: String) -> (Self, LogCapture) {
        let capture = LogCapture::default();
        let logger = Self {
            min_level: LogLevel::Trace,
            use_color: false,
            format: LogFormat::Compact,
            name,
            sink: LogSink::Capture(capture.clone()),
            context: Arc::new(RwLock::new(LogContext::default())),
        };
        (logger, capture)
    }

    /// A logger with a different component name sharing sink and context
    pub fn child(&self, name: &str) -> Self {
        let mut child = self.clone();
        child.name = name.to_string();
        child
    }

    /// Logger name
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Send every entry to stderr
    pub fn to_stderr(mut self) -> Self {
        self.sink = LogSink::Stderr;
        self
    }

    /// Enable or disable colored output
    pub fn set_color(&mut self, use_color: bool) {
        self.use_color = use_color;
    }

    /// Set session correlation ID
    pub async fn set_session_id(&self, session_id: String) {
        let mut context = self.context.write().await;
        context.session_id = Some(session_id);
    }

    /// Start a new session with a fresh ID and return it
    pub async fn start_session(&self) -> String {
        let session_id = Uuid::new_v4().to_string();
        self.set_session_id(session_id.clone()).await;
        session_id
    }

    /// Add context field for all subsequent log entries
    pub async fn add_context_field<T: Serialize>(&self, key: String, value: T) {
        if let Ok(json_value) = serde_json::to_value(value) {
            let mut context = self.context.write().await;
            context.context_fields.insert(key, json_value);
        }
    }

    /// Create a log entry builder
    pub fn log(&self, level: LogLevel, message: &str) -> LogEntryBuilder<'_> {
        LogEntryBuilder::new(self, level, message.to_string())
    }

    /// Convenience methods for different log levels
    pub fn debug(&self, message: &str) -> LogEntryBuilder<'_> {
        self.log(LogLevel::Debug, message)
    }

    pub fn info(&self, message: &str) -> LogEntryBuilder<'_> {
        self.log(LogLevel::Info, message)
    }

    pub fn warn(&self, message: &str) -> LogEntryBuilder<'_> {
        self.log(LogLevel::Warn, message)
    }

    pub fn error(&self, message: &str) -> LogEntryBuilder<'_> {
        self.log(LogLevel::Error, message)
    }

    /// Check if a log level would be output
    pub fn would_log(&self, level: LogLevel) -> bool {
        level >= self.min_level
    }

    /// Write log entry to output
    async fn write_entry(&self, mut entry: LogEntry) {
        if entry.level < self.min_level {
            return;
        }

        let context = self.context.read().await;
        if let Some(session_id) = &context.session_id {
            entry.fields.insert("session_id".to_string(), serde_json::Value::String(session_id.clone()));
        }

        for (key, value) in &context.context_fields {
            entry.fields.insert(key.clone(), value.clone());
        }
        drop(context);

        match &self.sink {
            LogSink::Capture(capture) => capture.push(entry).await,
            LogSink::Stdio | LogSink::Stderr => {
                let output = match self.format {
                    LogFormat::Console => self.format_console(&entry),
                    LogFormat::Json => self.format_json(&entry),
                    LogFormat::Compact => self.format_compact(&entry),
                };

                if entry.level >= LogLevel::Warn || matches!(self.sink, LogSink::Stderr) {
                    let _ = writeln!(io::stderr(), "{}", output);
                } else {
                    let _ = writeln!(io::stdout(), "{}", output);
                }
            }
        }
    }

    /// Format log entry for console output
    fn format_console(&self, entry: &LogEntry) -> String {
        let timestamp = entry.timestamp.format("%Y-%m-%d %H:%M:%S%.3f");
        let level_str = entry.level.as_str();

        let formatted_level = if self.use_color {
            format!("{}{:>5}{}", entry.level.color_code(), level_str, LogLevel::reset_code())
        } else {
            format!("{:>5}", level_str)
        };

        let mut output = format!("{} {} [{}] {}",
            timestamp,
            formatted_level,
            entry.logger,
            entry.message
        );

        if let Some(correlation_id) = &entry.correlation_id {
            let short = correlation_id.get(..8).unwrap_or(correlation_id);
            output.push_str(&format!(" [{}]", short));
        }

        if !entry.fields.is_empty() {
            let mut fields_str: Vec<String> = entry.fields.iter()
                .map(|(k, v)| format!("{}={}", k, v))
                .collect();
            fields_str.sort();
            output.push_str(&format!(" {{{}}}", fields_str.join(", ")));
        }

        output
    }

    /// Format log entry as JSON
    fn format_json(&self, entry: &LogEntry) -> String {
        match serde_json::to_string(entry) {
            Ok(json) => json,
            Err(_) => format!("{{\"error\": \"Failed to serialize log entry\", \"message\": \"{}\"}}", entry.message),
        }
    }

    /// Format log entry in compact format
    fn format_compact(&self, entry: &LogEntry) -> String {
        let timestamp = entry.timestamp.format("%H:%M:%S");
        format!("{} {} {}: {}",
            timestamp,
            entry.level.as_str().chars().next().unwrap_or('?'),
            entry.logger,
            entry.message
        )
    }
}

/// Builder pattern for creating log entries
pub struct LogEntryBuilder<'a> {
    logger: &'a Logger,
    entry: LogEntry,
}

impl<'a> LogEntryBuilder<'a> {
    fn new(logger: &'a Logger, level: LogLevel, message: String) -> Self {
        Self {
            logger,
            entry: LogEntry {
                timestamp: Utc::now(),
                level,
                message,
                logger: logger.name.clone(),
                correlation_id: None,
                fields: HashMap::new(),
            },
        }
    }

    /// Add a correlation ID
    pub fn correlation_id(mut self, id: &str) -> Self {
        self.entry.correlation_id = Some(id.to_string());
        self
    }

    /// Add a structured field
    pub fn field<T: Serialize>(mut self, key: &str, value: T) -> Self {
        if let Ok(json_value) = serde_json::to_value(value) {
            self.entry.fields.insert(key.to_string(), json_value);
        }
        self
    }

    /// Add error information
    pub fn error_info(self, error: &AppError) -> Self {
        self.field("error_kind", error.kind())
            .field("error_category", error.category())
    }

    /// Finalize and write the log entry
    pub async fn log(self) {
        self.logger.write_entry(self.entry).await;
    }
}
