//! Target registration and resolution.
//!
//! A [`Build`] owns the ordered list of registered targets, the memoized
//! artifacts and one [`BuildContext`].
//!
//! # Guarantees
//!
//! - **Topological**: registering a target registers its dependencies first, in
//!   their listed order, so every target appears after all of its dependencies
//! - **Idempotent**: registering an already registered target is a no-op
//! - **At most once**: a target's compute callback runs at most once per build;
//!   its artifact is cached by identity and never replaced
//! - **No negative caching**: a failed target stores nothing, so resolving it
//!   again runs it again
//!
//! Both traversals use an explicit stack, so deep dependency chains do not
//! grow the native call stack.

mod types;

use std::collections::{HashMap, HashSet};
use std::io::{self, Write};
use std::sync::Arc;

use tracing::debug;

use crate::artifact::Artifact;
use crate::config::BuildConfig;
use crate::context::{BuildContext, ConsoleSink, LogSink, TracingSink};
use crate::target::{Target, TargetId};

pub use types::{BuildError, BuildId};

/// A set of registered targets and their resolved artifacts.
pub struct Build {
  id: BuildId,
  targets: Vec<Target>,
  registered: HashSet<TargetId>,
  artifacts: HashMap<TargetId, Artifact>,
  context: BuildContext,
}

impl Build {
  /// Create a build that reports progress through `tracing`.
  pub fn new() -> Self {
    Self::with_sink(Arc::new(TracingSink::default()))
  }

  /// Create a build that prints progress to stdout, indented and colored as
  /// `config` says.
  pub fn with_config(config: &BuildConfig) -> Self {
    Self::with_writer(config, io::stdout())
  }

  /// Like [`Build::with_config`], printing to `writer`.
  pub fn with_writer<W: Write + Send + 'static>(config: &BuildConfig, writer: W) -> Self {
    Self::with_sink(Arc::new(ConsoleSink::with_writer(&config.log, writer)))
  }

  /// Create a build that reports progress to `sink`.
  pub fn with_sink(sink: Arc<dyn LogSink>) -> Self {
    let id = BuildId::new();
    Self {
      context: BuildContext::new(id.clone(), sink),
      id,
      targets: Vec::new(),
      registered: HashSet::new(),
      artifacts: HashMap::new(),
    }
  }

  pub fn id(&self) -> &BuildId {
    &self.id
  }

  pub fn context(&self) -> &BuildContext {
    &self.context
  }

  /// Registered targets, dependencies before dependents.
  pub fn targets(&self) -> &[Target] {
    &self.targets
  }

  pub fn len(&self) -> usize {
    self.targets.len()
  }

  pub fn is_empty(&self) -> bool {
    self.targets.is_empty()
  }

  pub fn contains(&self, target: &Target) -> bool {
    self.registered.contains(target.id())
  }

  /// Register `target` and, before it, everything it depends on.
  ///
  /// Targets already registered are skipped, so shared dependencies and
  /// repeated roots are fine. Existing entries are never reordered.
  pub fn register(&mut self, target: &Target) -> &mut Self {
    if self.contains(target) {
      return self;
    }

    // Each frame holds a target and the index of its next dependency to visit.
    let mut stack: Vec<(Target, usize)> = vec![(target.clone(), 0)];

    while let Some((current, next)) = stack.last_mut() {
      let dependency = current.dependencies().get(*next).cloned();
      *next += 1;

      match dependency {
        Some(dep) => {
          if !self.registered.contains(dep.id()) {
            stack.push((dep, 0));
          }
        }
        None => {
          if let Some((done, _)) = stack.pop()
            && self.registered.insert(done.id().clone())
          {
            debug!(build = %self.id, target_name = %done.name(), position = self.targets.len(), "registered target");
            self.targets.push(done);
          }
        }
      }
    }

    self
  }

  /// Register several roots in order.
  pub fn register_all<'a>(&mut self, targets: impl IntoIterator<Item = &'a Target>) -> &mut Self {
    for target in targets {
      self.register(target);
    }
    self
  }

  /// Resolve `target`, resolving its dependencies first.
  ///
  /// Already resolved targets are returned from the cache without running
  /// anything. The target does not need to be registered.
  ///
  /// # Errors
  ///
  /// Returns the [`BuildError::Compute`] of the first target whose compute
  /// callback fails. Its dependents are not computed.
  pub fn resolve(&mut self, target: &Target) -> Result<Artifact, BuildError> {
    if let Some(artifact) = self.artifacts.get(target.id()) {
      return Ok(artifact.clone());
    }

    let mut stack: Vec<(Target, usize)> = vec![(target.clone(), 0)];

    while let Some((current, next)) = stack.last_mut() {
      let dependency = current.dependencies().get(*next).cloned();
      *next += 1;

      match dependency {
        Some(dep) => {
          if !self.artifacts.contains_key(dep.id()) {
            stack.push((dep, 0));
          }
        }
        None => {
          if let Some((ready, _)) = stack.pop()
            && !self.artifacts.contains_key(ready.id())
          {
            self.compute(&ready)?;
          }
        }
      }
    }

    // The root is always the last frame popped.
    Ok(self.artifacts[target.id()].clone())
  }

  /// Resolve every registered target in registration order.
  ///
  /// Stops at the first failure.
  pub fn resolve_all(&mut self) -> Result<(), BuildError> {
    let targets = self.targets.clone();
    for target in &targets {
      self.resolve(target)?;
    }

    self
      .context
      .debug(format_args!("Resolved {} of {} target(s)", self.resolved_count(), self.targets.len()));
    Ok(())
  }

  /// The cached artifact of `target`, if it has been resolved.
  pub fn artifact(&self, target: &Target) -> Option<&Artifact> {
    self.artifacts.get(target.id())
  }

  /// The cached artifact of `target` as a `T`.
  pub fn artifact_as<T: std::any::Any>(&self, target: &Target) -> Option<&T> {
    self.artifact(target).and_then(Artifact::downcast_ref::<T>)
  }

  pub fn is_resolved(&self, target: &Target) -> bool {
    self.artifacts.contains_key(target.id())
  }

  /// Number of cached artifacts.
  pub fn resolved_count(&self) -> usize {
    self.artifacts.len()
  }

  /// Registered targets in order, each with its artifact if resolved.
  pub fn artifacts(&self) -> impl Iterator<Item = (&Target, Option<&Artifact>)> {
    self.targets.iter().map(|t| (t, self.artifacts.get(t.id())))
  }

  /// Compute a target whose dependencies are all cached.
  fn compute(&mut self, target: &Target) -> Result<Artifact, BuildError> {
    let inputs: Vec<Artifact> = target
      .dependencies()
      .iter()
      .map(|dep| self.artifacts[dep.id()].clone())
      .collect();

    self.context.info(format_args!("Resolving target: \"{}\"", target.name()));

    let result = {
      let scope = self.context.with_current_target(target);
      target.compute(&scope, &inputs)
    };

    match result {
      Ok(artifact) => {
        self.artifacts.insert(target.id().clone(), artifact.clone());
        Ok(artifact)
      }
      Err(source) => {
        self
          .context
          .error(format_args!("Target \"{}\" failed: {:#}", target.name(), source));
        Err(BuildError::Compute {
          target: target.name().to_string(),
          id: target.id().clone(),
          source,
        })
      }
    }
  }
}

impl Default for Build {
  fn default() -> Self {
    Self::new()
  }
}

impl std::fmt::Debug for Build {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    f.debug_struct("Build")
      .field("id", &self.id)
      .field("targets", &self.targets.iter().map(Target::name).collect::<Vec<_>>())
      .field("resolved", &self.artifacts.len())
      .finish()
  }
}
