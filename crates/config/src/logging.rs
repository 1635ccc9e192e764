//! Logging configuration for the moo CLI
//!
//! Diagnostics go to stderr so they never mix with command output. An
//! optional log file receives everything at debug level.

use crate::{Error, Result};
use std::io::IsTerminal;
use std::path::Path;
use tracing_subscriber::{
    EnvFilter, Layer, Registry, fmt, layer::SubscriberExt, util::SubscriberInitExt,
};

/// Crates whose events are shown by default
const TARGETS: [&str; 4] = ["moo", "moo_core", "moo_config", "moo_engine"];

fn directives(level: &str) -> String {
    TARGETS
        .iter()
        .map(|target| format!("{target}={level}"))
        .collect::<Vec<_>>()
        .join(",")
}

/// Initialize the logging system
///
/// `RUST_LOG` overrides the default filter.
///
/// # Arguments
/// * `verbose` - Enable debug level logging with timestamps
/// * `log_file` - Optional path to append debug logs to
///
/// # Examples
/// ```ignore
/// // Basic usage with info level
/// init(false, None)?;
///
/// // Verbose mode, also writing to a file
/// init(true, Some(Path::new("moo.log")))?;
/// ```
pub fn init(verbose: bool, log_file: Option<&Path>) -> Result<()> {
    let level = if verbose { "debug" } else { "info" };

    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(directives(level)))
        .map_err(|e| Error::Message(format!("Invalid log filter: {e}")))?;

    let ansi = std::io::stderr().is_terminal();
    let stderr_layer: Box<dyn Layer<Registry> + Send + Sync> = if verbose {
        fmt::layer()
            .with_writer(std::io::stderr)
            .with_target(false)
            .with_file(false)
            .with_line_number(false)
            .compact()
            .with_ansi(ansi)
            .boxed()
    } else {
        fmt::layer()
            .with_writer(std::io::stderr)
            .with_target(false)
            .with_file(false)
            .with_line_number(false)
            .without_time() // No timestamps in normal mode
            .compact()
            .with_ansi(ansi)
            .boxed()
    };

    let file_layer = match log_file {
        Some(log_path) => {
            let file = std::fs::OpenOptions::new()
                .create(true)
                .append(true)
                .open(log_path)?;

            Some(
                fmt::layer()
                    .with_writer(file)
                    .with_ansi(false)
                    .with_target(true)
                    .with_file(true)
                    .with_line_number(true)
                    .with_filter(EnvFilter::new(directives("debug"))),
            )
        }
        None => None,
    };

    tracing_subscriber::registry()
        .with(stderr_layer.with_filter(env_filter))
        .with(file_layer)
        .try_init()
        .map_err(|e| Error::Message(format!("Failed to initialize logging: {e}")))
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used, clippy::panic)]
    use super::*;

    #[test]
    fn test_directives_cover_every_crate() {
        assert_eq!(
            directives("debug"),
            "moo=debug,moo_core=debug,moo_config=debug,moo_engine=debug"
        );
    }

    #[test]
    fn test_unwritable_log_file_is_an_error() {
        let dir = tempfile::TempDir::new().unwrap();
        // A directory cannot be opened for appending
        let err = init(false, Some(dir.path())).unwrap_err();
        assert!(matches!(err, Error::Io(_)));
    }
}
