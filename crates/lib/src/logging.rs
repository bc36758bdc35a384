//! Global `tracing` subscriber setup.
//!
//! Libraries embedding a build usually install their own subscriber; this is
//! for binaries and scripts that just want progress on the terminal.

use thiserror::Error;
use tracing_subscriber::EnvFilter;

#[derive(Debug, Error)]
pub enum LoggingError {
  #[error("failed to install tracing subscriber: {message}")]
  Init { message: String },
}

/// Install a fmt subscriber without timestamps.
///
/// With `verbose` everything down to `debug` is shown; otherwise `RUST_LOG`
/// decides, defaulting to `info`.
pub fn init_tracing(verbose: bool) -> Result<(), LoggingError> {
  let filter = if verbose {
    EnvFilter::new("debug")
  } else {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"))
  };

  tracing_subscriber::fmt()
    .with_env_filter(filter)
    .with_target(false)
    .without_time()
    .try_init()
    .map_err(|e| LoggingError::Init { message: e.to_string() })
}
