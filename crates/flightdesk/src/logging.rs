//! Logging configuration for flightdesk.
//!
//! This module provides initialization and configuration for the tracing-based
//! logging system used throughout flightdesk. Console output goes to stderr
//! so that tables written to stdout stay clean; a per-database log file
//! records everything down to the configured level.

use std::fmt::Display;
use std::path::PathBuf;

use tracing::Level;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{fmt, prelude::*, EnvFilter, Layer, Registry};

use crate::error::{Error, Result};

/// Verbosity level for console logging output.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Verbosity {
    /// Suppress all output except errors.
    Quiet,
    /// Normal output level (warnings and above).
    #[default]
    Normal,
    /// Verbose output (debug and above).
    Verbose,
    /// Very verbose output (trace level).
    Trace,
}

impl Verbosity {
    /// Convert verbosity to tracing level filter.
    #[must_use]
    pub fn to_level_filter(&self) -> Level {
        match self {
            Self::Quiet => Level::ERROR,
            Self::Normal => Level::WARN,
            Self::Verbose => Level::DEBUG,
            Self::Trace => Level::TRACE,
        }
    }
}

/// Where and how verbosely to write the log file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogFile {
    /// Directory holding the file.
    pub directory: PathBuf,
    /// File name, e.g. `flight_management_flights.log`.
    pub file_name: String,
    /// Level filter directive, e.g. `debug`.
    pub level: String,
}

/// Initialize the logging system.
///
/// This should be called once at application startup. The console level can
/// be controlled via:
/// 1. The `verbosity` parameter
/// 2. The `RUST_LOG` environment variable (takes precedence)
///
/// When `file` is given, events are also appended to that file. The returned
/// guard flushes the file writer on drop and must be held until exit.
///
/// # Errors
///
/// Returns an error if the log directory cannot be created.
///
/// # Examples
///
/// ```no_run
/// use flightdesk::{init_logging, logging::Verbosity};
///
/// let _guard = init_logging(Verbosity::Normal, None).unwrap();
/// ```
pub fn init_logging(verbosity: Verbosity, file: Option<&LogFile>) -> Result<Option<WorkerGuard>> {
    let mut layers: Vec<Box<dyn Layer<Registry> + Send + Sync>> = Vec::new();

    let console_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(directive(verbosity.to_level_filter())));
    layers.push(
        fmt::layer()
            .with_writer(std::io::stderr)
            .with_target(true)
            .with_thread_ids(false)
            .with_file(false)
            .with_line_number(false)
            .with_filter(console_filter)
            .boxed(),
    );

    let guard = match file {
        Some(log_file) => {
            std::fs::create_dir_all(&log_file.directory).map_err(|source| Error::DirectoryCreate {
                path: log_file.directory.clone(),
                source,
            })?;
            let appender = tracing_appender::rolling::never(&log_file.directory, &log_file.file_name);
            let (writer, guard) = tracing_appender::non_blocking(appender);
            layers.push(
                fmt::layer()
                    .with_writer(writer)
                    .with_ansi(false)
                    .with_target(true)
                    .with_filter(EnvFilter::new(directive(&log_file.level)))
                    .boxed(),
            );
            Some(guard)
        }
        None => None,
    };

    // Install the subscriber (ignore error if already set)
    let _ = tracing_subscriber::registry().with(layers).try_init();
    Ok(guard)
}

/// Filter directive covering both the library and the `fdesk` binary.
fn directive(level: impl Display) -> String {
    format!("flightdesk={level},fdesk={level}")
}

/// Initialize logging for tests.
///
/// This sets up a minimal logging configuration suitable for tests.
/// It only logs warnings and errors by default to keep test output clean.
#[cfg(test)]
pub fn init_test_logging() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter("warn")
        .with_test_writer()
        .try_init();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_verbosity_to_level() {
        assert_eq!(Verbosity::Quiet.to_level_filter(), Level::ERROR);
        assert_eq!(Verbosity::Normal.to_level_filter(), Level::WARN);
        assert_eq!(Verbosity::Verbose.to_level_filter(), Level::DEBUG);
        assert_eq!(Verbosity::Trace.to_level_filter(), Level::TRACE);
    }

    #[test]
    fn test_verbosity_default() {
        assert_eq!(Verbosity::default(), Verbosity::Normal);
    }

    #[test]
    fn test_directive_covers_binary() {
        assert_eq!(directive(Level::DEBUG), "flightdesk=DEBUG,fdesk=DEBUG");
        assert_eq!(directive("info"), "flightdesk=info,fdesk=info");

        assert!(EnvFilter::try_new(directive(Verbosity::Verbose.to_level_filter())).is_ok());
    }

    #[test]
    fn test_init_logging_console_only() {
        let guard = init_logging(Verbosity::Normal, None).unwrap();
        assert!(guard.is_none());
    }

    #[test]
    fn test_init_logging_creates_log_dir() {
        let dir = tempfile::tempdir().unwrap();
        let log_file = LogFile {
            directory: dir.path().join("logs"),
            file_name: "flight_management_test.log".to_string(),
            level: "debug".to_string(),
        };

        let guard = init_logging(Verbosity::Quiet, Some(&log_file)).unwrap();
        assert!(guard.is_some());
        assert!(log_file.directory.is_dir());
    }

    #[test]
    fn test_init_test_logging_does_not_panic() {
        init_test_logging();
    }
}
