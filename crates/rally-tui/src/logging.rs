//! Log output to a file.
//!
//! The terminal is owned by the UI in raw mode, so logs go to a file instead
//! of stderr.

use std::{fs::File, io, path::Path, sync::Mutex};

use thiserror::Error;
use tracing_subscriber::{EnvFilter, filter::ParseError};

/// Logging setup errors.
#[derive(Debug, Error)]
pub enum LoggingError {
    /// Log file could not be created.
    #[error("cannot open log file: {0}")]
    Io(#[from] io::Error),

    /// Filter directive did not parse.
    #[error("invalid log filter: {0}")]
    Filter(#[from] ParseError),

    /// A global subscriber is already installed.
    #[error("cannot install subscriber: {0}")]
    Install(String),
}

/// Install a `tracing` subscriber writing to `path` with the given filter.
pub fn init(path: &Path, filter: &str) -> Result<(), LoggingError> {
    let filter = EnvFilter::try_new(filter)?;
    let file = File::create(path)?;

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(Mutex::new(file))
        .with_ansi(false)
        .with_target(true)
        .try_init()
        .map_err(|e| LoggingError::Install(e.to_string()))
}
