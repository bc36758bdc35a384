//! Scripts: domain layers that declare a build.
//!
//! A script turns some typed input into a [`Build`] with its root targets
//! registered. [`run_script`] then resolves everything, which is the whole
//! lifecycle of a single run.

use tracing::info;

use crate::build::{Build, BuildError};

/// Declares the targets of a build from an input.
pub trait Script {
  type Input;

  fn create_build(&self, input: &Self::Input) -> Result<Build, BuildError>;
}

/// Create the script's build and resolve every registered target.
///
/// Returns the resolved build so callers can read its artifacts.
pub fn run_script<S: Script>(script: &S, input: &S::Input) -> Result<Build, BuildError> {
  let mut build = script.create_build(input)?;
  info!(build = %build.id(), targets = build.len(), "running script");

  build.resolve_all()?;
  Ok(build)
}
