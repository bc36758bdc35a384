//! Target definitions.
//!
//! A target is one unit of work: a name, a generated identity, the targets it
//! depends on and a compute callback. Targets are immutable once created and are
//! handed around as cheap [`Target`] handles, so several dependents can share the
//! same dependency instance.
//!
//! Identity, not structure, defines "the same unit of work": two targets built
//! from identical names and dependencies are still distinct nodes.

use std::any::Any;
use std::fmt;
use std::sync::Arc;

use thiserror::Error;

use crate::artifact::Artifact;
use crate::context::BuildContext;

/// Signature of a target's compute callback.
///
/// The artifact slice is aligned with [`Target::dependencies`]: same order,
/// same length.
pub type ComputeFn = dyn Fn(&BuildContext, &[Artifact]) -> anyhow::Result<Artifact> + Send + Sync;

/// Globally unique identity of a target, assigned once at construction.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct TargetId(Arc<str>);

impl TargetId {
  /// Generate a fresh identity.
  pub fn new() -> Self {
    Self(nanoid::nanoid!().into())
  }

  /// Use a caller-provided identity (tests, restored graphs).
  pub fn from_string(id: impl Into<Arc<str>>) -> Self {
    Self(id.into())
  }

  pub fn as_str(&self) -> &str {
    &self.0
  }
}

impl Default for TargetId {
  fn default() -> Self {
    Self::new()
  }
}

impl fmt::Display for TargetId {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "{}", self.0)
  }
}

/// A dependency artifact could not be handed to a typed compute callback.
#[derive(Debug, Error)]
pub enum ArtifactError {
  #[error("dependency artifact {index} is missing")]
  Missing { index: usize },

  #[error("dependency {index} (\"{dependency}\") produced {found}, expected {expected}")]
  Type {
    index: usize,
    dependency: String,
    expected: &'static str,
    found: &'static str,
  },
}

struct TargetDef {
  id: TargetId,
  name: String,
  dependencies: Vec<Target>,
  compute: Box<ComputeFn>,
}

/// Shared handle to an immutable target definition.
///
/// Equality and hashing use [`TargetId`] only.
#[derive(Clone)]
pub struct Target(Arc<TargetDef>);

impl Target {
  /// Create a target from an untyped compute callback.
  pub fn new<F>(name: impl Into<String>, dependencies: Vec<Target>, compute: F) -> Self
  where
    F: Fn(&BuildContext, &[Artifact]) -> anyhow::Result<Artifact> + Send + Sync + 'static,
  {
    Self::with_id(TargetId::new(), name, dependencies, compute)
  }

  /// Create a target with an explicit identity.
  pub fn with_id<F>(id: TargetId, name: impl Into<String>, dependencies: Vec<Target>, compute: F) -> Self
  where
    F: Fn(&BuildContext, &[Artifact]) -> anyhow::Result<Artifact> + Send + Sync + 'static,
  {
    Self(Arc::new(TargetDef {
      id,
      name: name.into(),
      dependencies,
      compute: Box::new(compute),
    }))
  }

  /// A target without dependencies producing a `T`.
  pub fn source<T, F>(name: impl Into<String>, compute: F) -> Self
  where
    T: Any + Send + Sync,
    F: Fn(&BuildContext) -> anyhow::Result<T> + Send + Sync + 'static,
  {
    Self::new(name, Vec::new(), move |ctx, _| compute(ctx).map(Artifact::new))
  }

  /// A target deriving a `T` from one dependency's `A`.
  pub fn map<A, T, F>(name: impl Into<String>, dependency: &Target, compute: F) -> Self
  where
    A: Any,
    T: Any + Send + Sync,
    F: Fn(&BuildContext, &A) -> anyhow::Result<T> + Send + Sync + 'static,
  {
    let dep_name = dependency.name().to_string();
    Self::new(name, vec![dependency.clone()], move |ctx, deps| {
      let a = typed_dependency::<A>(deps, 0, &dep_name)?;
      compute(ctx, a).map(Artifact::new)
    })
  }

  /// A target combining the artifacts of two dependencies, in that order.
  pub fn zip<A, B, T, F>(name: impl Into<String>, first: &Target, second: &Target, compute: F) -> Self
  where
    A: Any,
    B: Any,
    T: Any + Send + Sync,
    F: Fn(&BuildContext, &A, &B) -> anyhow::Result<T> + Send + Sync + 'static,
  {
    let first_name = first.name().to_string();
    let second_name = second.name().to_string();
    Self::new(name, vec![first.clone(), second.clone()], move |ctx, deps| {
      let a = typed_dependency::<A>(deps, 0, &first_name)?;
      let b = typed_dependency::<B>(deps, 1, &second_name)?;
      compute(ctx, a, b).map(Artifact::new)
    })
  }

  pub fn id(&self) -> &TargetId {
    &self.0.id
  }

  pub fn name(&self) -> &str {
    &self.0.name
  }

  pub fn dependencies(&self) -> &[Target] {
    &self.0.dependencies
  }

  /// Run the compute callback.
  ///
  /// `dependency_artifacts` should be aligned with [`Target::dependencies`].
  /// Typed targets report a missing position as [`ArtifactError::Missing`].
  /// The build calls this at most once per target.
  pub fn compute(&self, ctx: &BuildContext, dependency_artifacts: &[Artifact]) -> anyhow::Result<Artifact> {
    (self.0.compute)(ctx, dependency_artifacts)
  }
}

fn typed_dependency<'a, T: Any>(deps: &'a [Artifact], index: usize, dependency: &str) -> Result<&'a T, ArtifactError> {
  let artifact = deps.get(index).ok_or(ArtifactError::Missing { index })?;
  artifact.downcast_ref::<T>().ok_or_else(|| ArtifactError::Type {
    index,
    dependency: dependency.to_string(),
    expected: std::any::type_name::<T>(),
    found: artifact.type_name(),
  })
}

impl PartialEq for Target {
  fn eq(&self, other: &Self) -> bool {
    self.0.id == other.0.id
  }
}

impl Eq for Target {}

impl std::hash::Hash for Target {
  fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
    self.0.id.hash(state);
  }
}

impl fmt::Debug for Target {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.debug_struct("Target")
      .field("id", &self.0.id)
      .field("name", &self.0.name)
      .field(
        "dependencies",
        &self.0.dependencies.iter().map(Target::name).collect::<Vec<_>>(),
      )
      .finish()
  }
}

impl fmt::Display for Target {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "\"{}\"", self.0.name)
  }
}
