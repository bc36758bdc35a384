//! wisp-lib: dependency-driven target resolution
//!
//! This crate turns a set of named, interdependent computation steps into
//! resolved artifacts, each computed at most once and in dependency order:
//! - `Target`: an immutable unit of work with dependencies and a compute callback
//! - `Build`: registers targets in topological order and memoizes their artifacts
//! - `BuildContext`: scope-tracked state threaded through every compute call
//! - `Script`: a domain layer that declares the targets of a build

pub mod artifact;
pub mod build;
pub mod config;
pub mod context;
pub mod logging;
pub mod script;
pub mod target;

pub use artifact::Artifact;
pub use build::{Build, BuildError, BuildId};
pub use config::{BuildConfig, ColorMode, ConfigError, LogConfig};
pub use context::{BuildContext, ContextState, LogRecord, LogSink, TargetScope};
pub use script::{Script, run_script};
pub use target::{ArtifactError, Target, TargetId};
