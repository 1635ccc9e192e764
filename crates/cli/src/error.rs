//! Error types for CLI commands
//!
//! Commands fail with a [`CommandError`]. The dispatcher decides from
//! [`CommandError::is_handled`] whether a failure is reported as a single
//! error line with exit code 1, or propagated as a fatal error.

use thiserror::Error;

/// Errors that can occur during command execution
#[non_exhaustive]
#[derive(Error, Debug)]
pub enum CommandError {
    /// Error raised by the core layers (validation, prompts, processes)
    #[error(transparent)]
    Core(#[from] moo_core::Error),

    /// Option value that the command cannot work with
    #[error("Invalid value for --{option}: {message}")]
    InvalidOption {
        /// Long option name
        option: String,
        /// What is wrong with it
        message: String,
    },

    /// IO error
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    /// Generic error
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

/// Result type alias for command operations
pub type Result<T> = std::result::Result<T, CommandError>;

impl CommandError {
    /// Whether this is an expected failure reported as a plain error line
    ///
    /// Anything else (IO failures, a broken terminal, unexpected errors)
    /// propagates out of the dispatcher.
    #[must_use]
    pub fn is_handled(&self) -> bool {
        match self {
            Self::Core(err) => err.is_handled(),
            Self::InvalidOption { .. } => true,
            Self::IoError(_) | Self::Other(_) => false,
        }
    }

    /// Create an `InvalidOption` error
    pub fn invalid_option(option: impl Into<String>, message: impl Into<String>) -> Self {
        Self::InvalidOption {
            option: option.into(),
            message: message.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used, clippy::panic)]
    use super::*;
    use moo_core::Error as CoreError;
    use std::io;

    #[test]
    fn test_core_error_keeps_message() {
        let error: CommandError = CoreError::TooManyAttempts {
            field: "Message".into(),
            attempts: 10,
        }
        .into();

        assert_eq!(
            error.to_string(),
            "Too many invalid attempts for Message (10 attempts)"
        );
        assert!(error.is_handled());
    }

    #[test]
    fn test_aborted_is_handled() {
        let error: CommandError = CoreError::Aborted("Commit aborted by user.".into()).into();
        assert!(error.is_handled());
        assert_eq!(error.to_string(), "Commit aborted by user.");
    }

    #[test]
    fn test_prompt_failure_is_fatal() {
        let error: CommandError = CoreError::Prompt("not a terminal".into()).into();
        assert!(!error.is_handled());
    }

    #[test]
    fn test_io_error_conversion() {
        let io_error = io::Error::new(io::ErrorKind::NotFound, "file not found");
        let error: CommandError = io_error.into();

        assert!(error.to_string().contains("IO error"));
        assert!(!error.is_handled());
    }

    #[test]
    fn test_invalid_option() {
        let error = CommandError::invalid_option("format", "expected json");
        assert_eq!(error.to_string(), "Invalid value for --format: expected json");
        assert!(error.is_handled());
    }

    #[test]
    fn test_anyhow_error_conversion() {
        let error: CommandError = anyhow::anyhow!("something went wrong").into();
        assert!(error.to_string().contains("something went wrong"));
        assert!(!error.is_handled());
    }
}
