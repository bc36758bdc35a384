//! Identity and error types for builds.

use std::fmt;
use std::sync::Arc;

use thiserror::Error;

use crate::target::TargetId;

/// Unique identifier of one build run.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct BuildId(Arc<str>);

impl BuildId {
  pub fn new() -> Self {
    Self(nanoid::nanoid!().into())
  }

  pub fn from_string(id: impl Into<Arc<str>>) -> Self {
    Self(id.into())
  }

  pub fn as_str(&self) -> &str {
    &self.0
  }
}

impl Default for BuildId {
  fn default() -> Self {
    Self::new()
  }
}

impl fmt::Display for BuildId {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "{}", self.0)
  }
}

/// Errors that can occur while resolving targets.
#[derive(Debug, Error)]
pub enum BuildError {
  /// A target's compute callback failed.
  ///
  /// Created once, at the target that failed, and returned unchanged by every
  /// dependent whose resolution needed it.
  #[error("target \"{target}\" failed: {source}")]
  Compute {
    target: String,
    id: TargetId,
    #[source]
    source: anyhow::Error,
  },
}

impl BuildError {
  /// Name of the target whose compute callback failed.
  pub fn target(&self) -> &str {
    match self {
      BuildError::Compute { target, .. } => target,
    }
  }

  /// Identity of the target whose compute callback failed.
  pub fn target_id(&self) -> &TargetId {
    match self {
      BuildError::Compute { id, .. } => id,
    }
  }

  /// The error returned by the compute callback.
  pub fn compute_error(&self) -> &anyhow::Error {
    match self {
      BuildError::Compute { source, .. } => source,
    }
  }
}
