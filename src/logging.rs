//! Logging setup for the viewer.
//!
//! Installs a global `tracing` subscriber writing to stderr. The level comes from
//! `RUST_LOG` and defaults to `info`.

use tracing_subscriber::{fmt, EnvFilter};

const DEFAULT_FILTER: &str = "info";

/// Errors that may occur while initializing logging.
#[derive(Debug, thiserror::Error)]
pub enum LoggingError {
    /// `RUST_LOG` could not be parsed.
    #[error("Invalid log filter: {0}")]
    Filter(#[from] tracing_subscriber::filter::ParseError),
    /// A global subscriber was already installed or could not be set.
    #[error("Failed to install global tracing subscriber: {0}")]
    SetGlobal(String),
}

/// Initialize the global subscriber.
///
/// Failures are returned so the caller can carry on without logs.
pub fn init() -> Result<(), LoggingError> {
    let filter = match std::env::var(EnvFilter::DEFAULT_ENV) {
        Ok(directives) if !directives.trim().is_empty() => EnvFilter::try_new(directives)?,
        _ => EnvFilter::new(DEFAULT_FILTER),
    };
    fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .try_init()
        .map_err(|err| LoggingError::SetGlobal(err.to_string()))
}
