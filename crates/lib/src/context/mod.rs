//! Execution context threaded through every compute callback.
//!
//! The context tracks which target is currently being computed and turns log
//! calls into [`LogRecord`]s whose depth and style reflect that nesting. It is
//! passed explicitly to each target instead of being looked up from ambient
//! state.
//!
//! # States
//!
//! - **Idle**: no current target; records use [`LineStyle::Primary`]
//! - **InTarget**: at least one target scope is open; records are indented by
//!   the number of open scopes and use [`LineStyle::Nested`]
//!
//! Scopes are opened with [`BuildContext::with_current_target`] and closed when
//! the returned [`TargetScope`] is dropped, on every exit path.

pub mod log;

use std::fmt;
use std::ops::{Deref, DerefMut};
use std::sync::Arc;

use tracing::Level;

use crate::build::BuildId;
use crate::target::Target;

pub use log::{ConsoleSink, LineStyle, LogRecord, LogSink, MemorySink, TracingSink};

/// Presentation state derived from the open target scopes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContextState {
  Idle,
  InTarget { depth: usize },
}

/// Per-build, scope-tracked state used for progress output.
pub struct BuildContext {
  build_id: BuildId,
  stack: Vec<Target>,
  sink: Arc<dyn LogSink>,
}

impl BuildContext {
  pub fn new(build_id: BuildId, sink: Arc<dyn LogSink>) -> Self {
    Self {
      build_id,
      stack: Vec::new(),
      sink,
    }
  }

  /// A context that belongs to no build, logging through `tracing`.
  ///
  /// Useful for calling [`Target::compute`] directly.
  pub fn detached() -> Self {
    Self::new(BuildId::new(), Arc::new(TracingSink::default()))
  }

  pub fn build_id(&self) -> &BuildId {
    &self.build_id
  }

  /// The innermost target whose scope is open.
  pub fn current_target(&self) -> Option<&Target> {
    self.stack.last()
  }

  /// Number of open target scopes.
  pub fn depth(&self) -> usize {
    self.stack.len()
  }

  pub fn state(&self) -> ContextState {
    match self.stack.len() {
      0 => ContextState::Idle,
      depth => ContextState::InTarget { depth },
    }
  }

  pub fn line_style(&self) -> LineStyle {
    LineStyle::for_depth(self.depth())
  }

  /// Make `target` current until the returned scope is dropped.
  ///
  /// The scope dereferences to the context, so nested scopes and logging go
  /// through it while it is alive.
  pub fn with_current_target(&mut self, target: &Target) -> TargetScope<'_> {
    let restore_len = self.stack.len();
    self.stack.push(target.clone());
    TargetScope {
      ctx: self,
      restore_len,
    }
  }

  pub fn log(&self, level: Level, message: impl fmt::Display) {
    let depth = self.depth();
    self.sink.emit(&LogRecord {
      level,
      message: message.to_string(),
      target: self.current_target().map(|t| t.name().to_string()),
      depth,
      style: LineStyle::for_depth(depth),
    });
  }

  pub fn error(&self, message: impl fmt::Display) {
    self.log(Level::ERROR, message);
  }

  pub fn warn(&self, message: impl fmt::Display) {
    self.log(Level::WARN, message);
  }

  pub fn info(&self, message: impl fmt::Display) {
    self.log(Level::INFO, message);
  }

  pub fn debug(&self, message: impl fmt::Display) {
    self.log(Level::DEBUG, message);
  }
}

impl fmt::Debug for BuildContext {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.debug_struct("BuildContext")
      .field("build_id", &self.build_id)
      .field("current_target", &self.current_target().map(Target::name))
      .field("depth", &self.depth())
      .finish()
  }
}

/// Guard returned by [`BuildContext::with_current_target`].
///
/// Dropping it restores the previous current target and presentation state.
pub struct TargetScope<'a> {
  ctx: &'a mut BuildContext,
  restore_len: usize,
}

impl Deref for TargetScope<'_> {
  type Target = BuildContext;

  fn deref(&self) -> &BuildContext {
    &*self.ctx
  }
}

impl DerefMut for TargetScope<'_> {
  fn deref_mut(&mut self) -> &mut BuildContext {
    &mut *self.ctx
  }
}

impl Drop for TargetScope<'_> {
  fn drop(&mut self) {
    self.ctx.stack.truncate(self.restore_len);
  }
}
