//! Tracing subscriber initialization.
//!
//! The library only emits `tracing` events; installing a subscriber is the
//! binary's job. Logs go to a file by default so report output on stdout stays
//! clean, or to stderr when asked.

use std::path::{Path, PathBuf};
use thiserror::Error;

/// Where log output goes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LogTarget {
    /// Append to the given file, creating parent directories.
    File(PathBuf),
    /// Write to stderr.
    Stderr,
}

/// Error type for logging initialization failures.
#[derive(Debug, Error)]
pub enum LoggingError {
    /// Failed to create log directory
    #[error("Failed to create log directory at {path:?}: {source}")]
    DirectoryCreation {
        /// The directory path that failed to be created
        path: PathBuf,
        /// The underlying I/O error
        #[source]
        source: std::io::Error,
    },

    /// Invalid log file path (no filename component)
    #[error("Invalid log file path: {0:?}")]
    InvalidPath(PathBuf),

    /// Tracing subscriber already initialized
    #[error("Tracing subscriber already initialized")]
    SubscriberAlreadySet,
}

fn env_filter() -> tracing_subscriber::EnvFilter {
    use tracing_subscriber::EnvFilter;

    // Respect RUST_LOG, default to "info"
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"))
}

/// Split a log path into (directory, file name), creating the directory.
fn prepare_log_file(log_path: &Path) -> Result<(PathBuf, String), LoggingError> {
    let file_name = log_path
        .file_name()
        .and_then(|n| n.to_str())
        .ok_or_else(|| LoggingError::InvalidPath(log_path.to_path_buf()))?;

    let directory = match log_path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
        _ => PathBuf::from("."),
    };

    std::fs::create_dir_all(&directory).map_err(|source| LoggingError::DirectoryCreation {
        path: directory.clone(),
        source,
    })?;

    Ok((directory, file_name.to_string()))
}

/// Initialize the global tracing subscriber.
///
/// Respects `RUST_LOG`, defaults to `info`.
///
/// # Errors
/// Directory creation failures, a path without a file name, or a subscriber
/// that is already installed.
pub fn init(target: &LogTarget) -> Result<(), LoggingError> {
    match target {
        LogTarget::File(log_path) => {
            let (directory, file_name) = prepare_log_file(log_path)?;
            let file_appender = tracing_appender::rolling::never(directory, file_name);

            tracing_subscriber::fmt()
                .with_env_filter(env_filter())
                .with_writer(file_appender)
                .with_ansi(false) // No ANSI colors in log files
                .try_init()
                .map_err(|_| LoggingError::SubscriberAlreadySet)
        }
        LogTarget::Stderr => tracing_subscriber::fmt()
            .with_env_filter(env_filter())
            .with_writer(std::io::stderr)
            .try_init()
            .map_err(|_| LoggingError::SubscriberAlreadySet),
    }
}
