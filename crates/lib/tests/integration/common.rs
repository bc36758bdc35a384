//! Shared test helpers for integration tests.

use std::io::{self, Write};
use std::sync::Arc;

use parking_lot::Mutex;
use wisp_lib::context::MemorySink;
use wisp_lib::{Artifact, Build, Target};

/// Records the names of targets in the order their compute callbacks ran.
#[derive(Clone, Default)]
pub struct Calls(Arc<Mutex<Vec<String>>>);

impl Calls {
  pub fn new() -> Self {
    Self::default()
  }

  pub fn names(&self) -> Vec<String> {
    self.0.lock().clone()
  }

  pub fn count(&self, name: &str) -> usize {
    self.0.lock().iter().filter(|n| *n == name).count()
  }

  fn push(&self, name: &str) {
    self.0.lock().push(name.to_string());
  }
}

/// A target whose artifact is its name followed by its inputs, e.g. `c(a,b)`.
pub fn traced(name: &str, deps: &[&Target], calls: &Calls) -> Target {
  let calls = calls.clone();
  let label = name.to_string();
  Target::new(name, deps.iter().map(|t| (*t).clone()).collect(), move |_, inputs| {
    calls.push(&label);
    let parts: Vec<String> = inputs
      .iter()
      .map(|a| a.downcast_ref::<String>().cloned().unwrap_or_default())
      .collect();
    if parts.is_empty() {
      Ok(Artifact::new(label.clone()))
    } else {
      Ok(Artifact::new(format!("{}({})", label, parts.join(","))))
    }
  })
}

/// A target that always fails with `message`.
pub fn failing(name: &str, deps: &[&Target], calls: &Calls, message: &'static str) -> Target {
  let calls = calls.clone();
  let label = name.to_string();
  Target::new(name, deps.iter().map(|t| (*t).clone()).collect(), move |_, _| {
    calls.push(&label);
    Err(anyhow::Error::new(PlateError(message)))
  })
}

/// Domain error used to check that failures reach the caller intact.
#[derive(Debug, thiserror::Error)]
#[error("{0}")]
pub struct PlateError(pub &'static str);

/// A writer whose bytes can be read back after a build has printed to it.
#[derive(Clone, Default)]
pub struct SharedBuffer(Arc<Mutex<Vec<u8>>>);

impl SharedBuffer {
  pub fn text(&self) -> String {
    String::from_utf8_lossy(&self.0.lock()).into_owned()
  }
}

impl Write for SharedBuffer {
  fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
    self.0.lock().extend_from_slice(buf);
    Ok(buf.len())
  }

  fn flush(&mut self) -> io::Result<()> {
    Ok(())
  }
}

/// A build whose progress output is captured in memory.
pub fn memory_build() -> (Build, MemorySink) {
  let sink = MemorySink::new();
  (Build::with_sink(Arc::new(sink.clone())), sink)
}

pub fn registered_names(build: &Build) -> Vec<String> {
  build.targets().iter().map(|t| t.name().to_string()).collect()
}

pub fn string_artifact(build: &Build, target: &Target) -> Option<String> {
  build.artifact_as::<String>(target).cloned()
}

/// Every dependency appears before its dependent.
pub fn assert_topological(build: &Build) {
  let targets = build.targets();
  for (index, target) in targets.iter().enumerate() {
    for dep in target.dependencies() {
      let dep_index = targets
        .iter()
        .position(|t| t == dep)
        .unwrap_or_else(|| panic!("dependency {} of {} is not registered", dep, target));
      assert!(
        dep_index < index,
        "dependency {} (at {}) must come before {} (at {})",
        dep,
        dep_index,
        target,
        index
      );
    }
  }
}
