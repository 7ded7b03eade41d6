//! # Error Handling
//!
//! Error types for the sandbox suite, built with `thiserror`.
//!
//! Scenario functions return [`Result`]; an expectation mismatch becomes
//! [`Error::Assertion`] carrying both the expected and the observed value so
//! the test runner (or the CLI report) can print them side by side.

use std::fmt::Display;
use std::time::Duration;

/// Custom result type for suite operations
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for the suite
#[derive(thiserror::Error, Debug)]
pub enum Error {
    /// Configuration errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// Transport errors raised by the HTTP request fixture
    #[error("HTTP error: {context}")]
    Http {
        context: String,
        #[source]
        source: reqwest::Error,
    },

    /// URL parsing or rewriting errors
    #[error("Invalid URL '{input}': {message}")]
    Url { input: String, message: String },

    /// Browser driver errors (launch, navigation, script evaluation)
    #[error("Browser error: {0}")]
    Browser(String),

    /// Sandbox orchestration errors
    #[error("Compose error: {message}")]
    Compose { message: String, stderr: Option<String> },

    /// A bounded wait ran out of budget
    #[error("Operation timed out: {operation} after {duration_ms}ms")]
    Timeout { operation: String, duration_ms: u64 },

    /// Expectation mismatch in a scenario
    #[error("Assertion failed: {what} (expected {expected}, got {actual})")]
    Assertion { what: String, expected: String, actual: String },

    /// I/O errors with additional context
    #[error("I/O error: {context}")]
    Io {
        context: String,
        #[source]
        source: std::io::Error,
    },
}

impl Error {
    /// Create a new configuration error
    pub fn config<S: Into<String>>(message: S) -> Self {
        Self::Config(message.into())
    }

    /// Wrap a transport error with the request it belongs to
    pub fn http<S: Into<String>>(context: S, source: reqwest::Error) -> Self {
        Self::Http { context: context.into(), source }
    }

    /// Create a URL error
    pub fn url<I: Into<String>, M: Display>(input: I, message: M) -> Self {
        Self::Url { input: input.into(), message: message.to_string() }
    }

    /// Create a browser error from any driver failure
    pub fn browser<S: Into<String>>(message: S) -> Self {
        Self::Browser(message.into())
    }

    /// Create a compose error without captured output
    pub fn compose<S: Into<String>>(message: S) -> Self {
        Self::Compose { message: message.into(), stderr: None }
    }

    /// Create a compose error carrying the command's stderr
    pub fn compose_with_stderr<S: Into<String>, E: Into<String>>(message: S, stderr: E) -> Self {
        Self::Compose { message: message.into(), stderr: Some(stderr.into()) }
    }

    /// Create a timeout error
    pub fn timeout<S: Into<String>>(operation: S, duration: Duration) -> Self {
        Self::Timeout { operation: operation.into(), duration_ms: duration.as_millis() as u64 }
    }

    /// Create an assertion error
    pub fn assertion<W: Into<String>, E: Display, A: Display>(
        what: W,
        expected: E,
        actual: A,
    ) -> Self {
        Self::Assertion {
            what: what.into(),
            expected: expected.to_string(),
            actual: actual.to_string(),
        }
    }

    /// Create an I/O error with context
    pub fn io<S: Into<String>>(context: S, source: std::io::Error) -> Self {
        Self::Io { context: context.into(), source }
    }

    /// Whether this error is an expectation mismatch rather than an infrastructure failure
    pub fn is_assertion(&self) -> bool {
        matches!(self, Self::Assertion { .. })
    }
}

impl From<::config::ConfigError> for Error {
    fn from(err: ::config::ConfigError) -> Self {
        Self::Config(err.to_string())
    }
}

impl From<validator::ValidationErrors> for Error {
    fn from(err: validator::ValidationErrors) -> Self {
        Self::Config(err.to_string())
    }
}
