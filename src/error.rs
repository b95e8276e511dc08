//! Error types for dbgsh.
//!
//! `ShellError` covers host-level failures (startup, configuration, terminal
//! input). Failures that belong to a single command line live next to the
//! layer that produces them: see [`crate::commands::command`] and
//! [`crate::commands::dispatcher`].

use thiserror::Error;

/// Main error type for the shell host.
#[derive(Error, Debug)]
pub enum ShellError {
    /// Configuration errors (invalid config file, unreadable file, etc.)
    #[error("Configuration error: {0}")]
    Config(String),

    /// Debuggee session errors raised outside of a command (attach, startup).
    #[error("Session error: {0}")]
    Session(String),

    /// Terminal or input stream errors.
    #[error("Input error: {0}")]
    Input(String),

    /// Internal errors (unexpected states, bugs, etc.)
    #[error("Internal error: {0}")]
    Internal(String),
}

impl ShellError {
    /// Creates a configuration error with the given message.
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// Creates a session error with the given message.
    pub fn session(msg: impl Into<String>) -> Self {
        Self::Session(msg.into())
    }

    /// Creates an input error with the given message.
    pub fn input(msg: impl Into<String>) -> Self {
        Self::Input(msg.into())
    }

    /// Creates an internal error with the given message.
    pub fn internal(msg: impl Into<String>) -> Self {
        Self::Internal(msg.into())
    }

    /// Returns the error category as a string for display purposes.
    pub fn category(&self) -> &'static str {
        match self {
            Self::Config(_) => "Configuration Error",
            Self::Session(_) => "Session Error",
            Self::Input(_) => "Input Error",
            Self::Internal(_) => "Internal Error",
        }
    }
}

impl From<std::io::Error> for ShellError {
    fn from(err: std::io::Error) -> Self {
        Self::Input(err.to_string())
    }
}

/// Result type alias using ShellError.
pub type Result<T> = std::result::Result<T, ShellError>;
