//! Type-erased values produced by targets.
//!
//! Each target computes its own kind of value (an arrangement, an assembly, a
//! file path...), so the build stores them behind a shared `Any` handle.
//! Cloning an [`Artifact`] only bumps a reference count, which is what lets two
//! dependents of one shared dependency observe the same instance.

use std::any::Any;
use std::fmt;
use std::sync::Arc;

/// The value produced by successfully computing a target.
#[derive(Clone)]
pub struct Artifact {
  value: Arc<dyn Any + Send + Sync>,
  type_name: &'static str,
}

impl Artifact {
  /// Wrap a value as an artifact.
  pub fn new<T: Any + Send + Sync>(value: T) -> Self {
    Self {
      value: Arc::new(value),
      type_name: std::any::type_name::<T>(),
    }
  }

  /// Wrap an already shared value without re-allocating it.
  pub fn from_arc<T: Any + Send + Sync>(value: Arc<T>) -> Self {
    Self {
      value,
      type_name: std::any::type_name::<T>(),
    }
  }

  /// Borrow the value as `T`, if that is what it holds.
  pub fn downcast_ref<T: Any>(&self) -> Option<&T> {
    self.value.downcast_ref::<T>()
  }

  /// Get a shared handle to the value as `T`.
  pub fn downcast<T: Any + Send + Sync>(&self) -> Option<Arc<T>> {
    Arc::clone(&self.value).downcast::<T>().ok()
  }

  /// Check whether the value is a `T`.
  pub fn is<T: Any>(&self) -> bool {
    self.value.is::<T>()
  }

  /// Name of the wrapped type, for diagnostics only.
  pub fn type_name(&self) -> &'static str {
    self.type_name
  }

  /// Returns true if both artifacts point at the same instance.
  pub fn ptr_eq(a: &Artifact, b: &Artifact) -> bool {
    Arc::ptr_eq(&a.value, &b.value)
  }
}

impl fmt::Debug for Artifact {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.debug_struct("Artifact").field("type", &self.type_name).finish()
  }
}
