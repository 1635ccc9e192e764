//! Base error types for moo
//!
//! This module provides the error kinds shared by every layer: validation
//! failures that trigger a re-prompt, aborts that end the current command,
//! configuration problems and failed external processes.

use thiserror::Error;

/// A rule rejected a candidate value
///
/// The message is shown to the user as-is before the question is asked again.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("{message}")]
pub struct ValidationError {
    /// Human readable reason
    pub message: String,
}

impl ValidationError {
    /// Create a validation error with the given reason
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

/// Base error type for shared functionality
#[derive(Error, Debug)]
pub enum Error {
    /// Input rejected by the validator chain
    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// Every answer for a field failed validation
    #[error("Too many invalid attempts for {field} ({attempts} attempts)")]
    TooManyAttempts {
        /// Field being resolved
        field: String,
        /// Number of answers rejected
        attempts: usize,
    },

    /// The user declined at a confirmation gate, or a precondition failed
    #[error("{0}")]
    Aborted(String),

    /// A configuration key is missing or invalid
    #[error("Configuration error ({key}): {message}")]
    Config {
        /// Dotted key of the offending entry (e.g. `commit.words`)
        key: String,
        /// What is wrong with it
        message: String,
    },

    /// The configured commit style does not name a known strategy
    #[error("Unable to find the commit style '{0}' (commit.style)")]
    UnknownStyle(String),

    /// A required argument has no value and no interactive fallback
    #[error("Not enough arguments (missing: \"{0}\")")]
    MissingArgument(String),

    /// An external process returned a non-zero exit status
    #[error("Command `{command}` failed with exit code {code}")]
    Process {
        /// Rendered command line
        command: String,
        /// Exit code, -1 when terminated by a signal
        code: i32,
        /// Captured output (stdout and stderr)
        output: String,
    },

    /// Terminal interaction failed
    #[error("Prompt error: {0}")]
    Prompt(String),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Generic error message
    #[error("{0}")]
    Message(String),
}

impl Error {
    /// Create a `Config` error for a dotted key
    pub fn config(key: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Config {
            key: key.into(),
            message: message.into(),
        }
    }

    /// Whether this is an expected failure mode of a command
    ///
    /// Handled errors end the command with exit code 1 and a single error
    /// line. Anything else is reported as a fatal defect.
    #[must_use]
    pub fn is_handled(&self) -> bool {
        !matches!(self, Self::Io(_) | Self::Prompt(_))
    }
}

/// Result type alias
pub type Result<T> = std::result::Result<T, Error>;
