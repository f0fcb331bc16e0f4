//! Error handling for the AMQP publish probe

use thiserror::Error;

/// Error types raised inside the probe and its harness driver.
///
/// None of these cross the `run_once`/`tear_down` boundary of the probe;
/// they are logged and folded into an `IterationResult` or `SetupOutcome`.
#[derive(Error, Debug)]
pub enum AppError {
    /// Harness-side configuration errors (malformed CLI input, unreadable .env)
    #[error("Configuration error: {0}")]
    Config(String),

    /// Broker URI could not be parsed
    #[error("Invalid broker URI: {0}")]
    InvalidUri(String),

    /// Connection or channel could not be established
    #[error("Connection error: {0}")]
    Connection(String),

    /// Connection establishment exceeded its deadline
    #[error("Timeout error: {0}")]
    Timeout(String),

    /// Publish attempted without an open channel
    #[error("Channel unavailable: {0}")]
    ChannelUnavailable(String),

    /// Publish call rejected by the client library
    #[error("Publish error: {0}")]
    Publish(String),

    /// Message payload could not be built
    #[error("Payload error: {0}")]
    Payload(String),

    /// Closing the channel or connection failed
    #[error("Teardown error: {0}")]
    Teardown(String),

    /// I/O errors (file operations, etc.)
    #[error("I/O error: {0}")]
    Io(String),

    /// Parsing errors (URLs, JSON, etc.)
    #[error("Parsing error: {0}")]
    Parse(String),

    /// Test execution errors
    #[error("Test execution error: {0}")]
    TestExecution(String),

    /// Generic internal errors
    #[error("Internal error: {0}")]
    Internal(String),
}

impl AppError {
    /// Create a new configuration error
    pub fn config<S: Into<String>>(message: S) -> Self {
        Self::Config(message.into())
    }

    /// Create a new invalid URI error
    pub fn invalid_uri<S: Into<String>>(message: S) -> Self {
        Self::InvalidUri(message.into())
    }

    /// Create a new connection error
    pub fn connection<S: Into<String>>(message: S) -> Self {
        Self::Connection(message.into())
    }

    /// Create a new timeout error
    pub fn timeout<S: Into<String>>(message: S) -> Self {
        Self::Timeout(message.into())
    }

    /// Create a new channel unavailable error
    pub fn channel_unavailable<S: Into<String>>(message: S) -> Self {
        Self::ChannelUnavailable(message.into())
    }

    /// Create a new publish error
    pub fn publish<S: Into<String>>(message: S) -> Self {
        Self::Publish(message.into())
    }

    /// Create a new payload error
    pub fn payload<S: Into<String>>(message: S) -> Self {
        Self::Payload(message.into())
    }

    /// Create a new teardown error
    pub fn teardown<S: Into<String>>(message: S) -> Self {
        Self::Teardown(message.into())
    }

    /// Create a new I/O error
    pub fn io<S: Into<String>>(message: S) -> Self {
        Self::Io(message.into())
    }

    /// Create a new parsing error
    pub fn parse<S: Into<String>>(message: S) -> Self {
        Self::Parse(message.into())
    }

    /// Create a new test execution error
    pub fn test_execution<S: Into<String>>(message: S) -> Self {
        Self::TestExecution(message.into())
    }

    /// Create a new internal error
    pub fn internal<S: Into<String>>(message: S) -> Self {
        Self::Internal(message.into())
    }

    /// Variant name, reported as the failure kind in iteration results
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Config(_) => "Config",
            Self::InvalidUri(_) => "InvalidUri",
            Self::Connection(_) => "Connection",
            Self::Timeout(_) => "Timeout",
            Self::ChannelUnavailable(_) => "ChannelUnavailable",
            Self::Publish(_) => "Publish",
            Self::Payload(_) => "Payload",
            Self::Teardown(_) => "Teardown",
            Self::Io(_) => "Io",
            Self::Parse(_) => "Parse",
            Self::TestExecution(_) => "TestExecution",
            Self::Internal(_) => "Internal",
        }
    }

    /// The message carried by the error, without the display prefix
    pub fn detail(&self) -> &str {
        match self {
            Self::Config(msg)
            | Self::InvalidUri(msg)
            | Self::Connection(msg)
            | Self::Timeout(msg)
            | Self::ChannelUnavailable(msg)
            | Self::Publish(msg)
            | Self::Payload(msg)
            | Self::Teardown(msg)
            | Self::Io(msg)
            | Self::Parse(msg)
            | Self::TestExecution(msg)
            | Self::Internal(msg) => msg,
        }
    }

    /// Get error category for logging and reporting
    pub fn category(&self) -> &'static str {
        match self {
            Self::Config(_) | Self::Parse(_) => "CONFIG",
            Self::InvalidUri(_) | Self::Connection(_) | Self::Timeout(_) => "SETUP",
            Self::ChannelUnavailable(_) | Self::Publish(_) | Self::Payload(_) => "PUBLISH",
            Self::Teardown(_) => "TEARDOWN",
            Self::Io(_) => "IO",
            Self::TestExecution(_) => "TEST",
            Self::Internal(_) => "INTERNAL",
        }
    }

    /// Get exit code for this error type
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::Config(_) | Self::Parse(_) | Self::InvalidUri(_) => 1,
            Self::Connection(_) | Self::ChannelUnavailable(_) | Self::Publish(_) | Self::Payload(_) => 2,
            Self::Timeout(_) => 3,
            Self::Io(_) => 5,
            Self::TestExecution(_) | Self::Teardown(_) => 6,
            Self::Internal(_) => 99,
        }
    }

    /// Format error for console display with color coding
    pub fn format_for_console(&self, use_color: bool) -> String {
        let category = self.category();
        let message = self.to_string();

        if use_color {
            use colored::Colorize;
            match self {
                Self::Config(_) | Self::Parse(_) | Self::InvalidUri(_) => {
                    format!("[{}] {}", category.red().bold(), message.red())
                }
                Self::Connection(_) | Self::ChannelUnavailable(_) | Self::Publish(_) | Self::Payload(_) => {
                    format!("[{}] {}", category.yellow().bold(), message.yellow())
                }
                Self::Timeout(_) => {
                    format!("[{}] {}", category.blue().bold(), message.blue())
                }
                Self::Io(_) | Self::TestExecution(_) | Self::Teardown(_) => {
                    format!("[{}] {}", category.cyan().bold(), message.cyan())
                }
                Self::Internal(_) => {
                    format!("[{}] {}", category.bright_red().bold(), message.bright_red())
                }
            }
        } else {
            format!("[{}] {}", category, message)
        }
    }
}

impl From<lapin::Error> for AppError {
    fn from(error: lapin::Error) -> Self {
        match error {
            lapin::Error::InvalidChannelState(_) | lapin::Error::InvalidConnectionState(_) => {
                Self::channel_unavailable(error.to_string())
            }
            lapin::Error::IOError(_) => Self::connection(error.to_string()),
            _ => Self::publish(error.to_string()),
        }
    }
}

impl From<std::io::Error> for AppError {
    fn from(error: std::io::Error) -> Self {
        Self::io(error.to_string())
    }
}

impl From<url::ParseError> for AppError {
    fn from(error: url::ParseError) -> Self {
        Self::invalid_uri(format!("URL parse error: {}", error))
    }
}

impl From<serde_json::Error> for AppError {
    fn from(error: serde_json::Error) -> Self {
        Self::parse(format!("JSON error: {}", error))
    }
}

impl From<dotenv::Error> for AppError {
    fn from(error: dotenv::Error) -> Self {
        Self::config(format!("Environment file error: {}", error))
    }
}

impl From<tokio::time::error::Elapsed> for AppError {
    fn from(error: tokio::time::error::Elapsed) -> Self {
        Self::timeout(error.to_string())
    }
}

// Anyhow integration
impl From<anyhow::Error> for AppError {
    fn from(error: anyhow::Error) -> Self {
        Self::internal(error.to_string())
    }
}

/// Custom Result type for the application
pub type Result<T> = std::result::Result<T, AppError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_creation() {
        let error = AppError::config("bad flag");
        assert!(matches!(error, AppError::Config(_)));
        assert_eq!(error.to_string(), "Configuration error: bad flag");

        let error = AppError::channel_unavailable("closed");
        assert_eq!(error.to_string(), "Channel unavailable: closed");
    }

    #[test]
    fn test_kind_and_detail() {
        let error = AppError::publish("frame rejected");
        assert_eq!(error.kind(), "Publish");
        assert_eq!(error.detail(), "frame rejected");

        let error = AppError::timeout("connect took too long");
        assert_eq!(error.kind(), "Timeout");
        assert_eq!(error.detail(), "connect took too long");
    }

    #[test]
    fn test_error_categories() {
        assert_eq!(AppError::config("x").category(), "CONFIG");
        assert_eq!(AppError::invalid_uri("x").category(), "SETUP");
        assert_eq!(AppError::connection("x").category(), "SETUP");
        assert_eq!(AppError::publish("x").category(), "PUBLISH");
        assert_eq!(AppError::teardown("x").category(), "TEARDOWN");
        assert_eq!(AppError::internal("x").category(), "INTERNAL");
    }

    #[test]
    fn test_exit_codes() {
        assert_eq!(AppError::config("x").exit_code(), 1);
        assert_eq!(AppError::connection("x").exit_code(), 2);
        assert_eq!(AppError::timeout("x").exit_code(), 3);
        assert_eq!(AppError::io("x").exit_code(), 5);
        assert_eq!(AppError::test_execution("x").exit_code(), 6);
        assert_eq!(AppError::internal("x").exit_code(), 99);
    }

    #[test]
    fn test_console_formatting_plain() {
        let error = AppError::connection("refused");
        assert_eq!(
            error.format_for_console(false),
            "[SETUP] Connection error: refused"
        );
    }

    #[test]
    fn test_conversions() {
        let io_error = std::io::Error::new(std::io::ErrorKind::NotFound, "missing");
        let app_error: AppError = io_error.into();
        assert!(matches!(app_error, AppError::Io(_)));

        let url_error = url::Url::parse("not a url").unwrap_err();
        let app_error: AppError = url_error.into();
        assert!(matches!(app_error, AppError::InvalidUri(_)));

        let anyhow_error = anyhow::anyhow!("boom");
        let app_error: AppError = anyhow_error.into();
        assert!(matches!(app_error, AppError::Internal(_)));
    }
}
