//! Progress records and the sinks that receive them.
//!
//! A [`LogRecord`] carries the nesting depth of the context that emitted it;
//! sinks decide how to present it. Lines emitted while no target is current use
//! the primary style, lines emitted from inside a target are indented and use
//! the nested style.

use std::fmt;
use std::io::{self, Write};
use std::sync::Arc;

use owo_colors::{OwoColorize, Stream, Style};
use parking_lot::Mutex;
use tracing::{Level, debug, error, field, info, trace, warn};

use crate::config::{ColorMode, LogConfig};

/// Visual style of a progress line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineStyle {
  /// Emitted with no current target.
  Primary,
  /// Emitted while a target is current.
  Nested,
}

impl LineStyle {
  pub fn for_depth(depth: usize) -> Self {
    if depth == 0 { LineStyle::Primary } else { LineStyle::Nested }
  }
}

/// A single progress notification.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogRecord {
  pub level: Level,
  pub message: String,
  /// Name of the target that was current when the record was emitted.
  pub target: Option<String>,
  pub depth: usize,
  pub style: LineStyle,
}

impl LogRecord {
  /// Render as `indent + message`, optionally colored for stdout.
  pub fn render(&self, indent: usize, color: ColorMode) -> String {
    let line = format!("{}{}", " ".repeat(indent * self.depth), self.message);
    let style = self.color_style();

    match color {
      ColorMode::Never => line,
      ColorMode::Always => line.style(style).to_string(),
      ColorMode::Auto => line.if_supports_color(Stream::Stdout, |l| l.style(style)).to_string(),
    }
  }

  fn color_style(&self) -> Style {
    match (self.level, self.style) {
      (Level::ERROR, _) => Style::new().red().bold(),
      (Level::WARN, _) => Style::new().yellow(),
      (_, LineStyle::Primary) => Style::new().blue().bold(),
      (_, LineStyle::Nested) => Style::new().bright_black(),
    }
  }
}

/// Receives progress records from a [`BuildContext`](super::BuildContext).
pub trait LogSink: Send + Sync {
  fn emit(&self, record: &LogRecord);
}

/// Forwards records as `tracing` events.
///
/// The message is indented by depth; the target name and depth are attached as
/// structured fields.
#[derive(Debug, Clone)]
pub struct TracingSink {
  indent: usize,
}

impl TracingSink {
  pub fn new(indent: usize) -> Self {
    Self { indent }
  }
}

impl Default for TracingSink {
  fn default() -> Self {
    Self::new(LogConfig::default().indent)
  }
}

impl LogSink for TracingSink {
  fn emit(&self, record: &LogRecord) {
    let line = record.render(self.indent, ColorMode::Never);
    // Recorded only when a target is current.
    let target_name = record.target.as_deref().map(field::display);
    let depth = record.depth;

    match record.level {
      Level::ERROR => error!(target_name, depth, "{}", line),
      Level::WARN => warn!(target_name, depth, "{}", line),
      Level::INFO => info!(target_name, depth, "{}", line),
      Level::DEBUG => debug!(target_name, depth, "{}", line),
      _ => trace!(target_name, depth, "{}", line),
    }
  }
}

/// Prints rendered records, one per line, to stdout or another writer.
#[derive(Clone)]
pub struct ConsoleSink {
  indent: usize,
  color: ColorMode,
  min_level: Level,
  out: Arc<Mutex<Box<dyn Write + Send>>>,
}

impl ConsoleSink {
  pub fn new(config: &LogConfig) -> Self {
    Self::with_writer(config, io::stdout())
  }

  /// Print to `writer` instead of stdout, with the same indent and color rules.
  pub fn with_writer<W: Write + Send + 'static>(config: &LogConfig, writer: W) -> Self {
    Self {
      indent: config.indent,
      color: config.color,
      min_level: Level::INFO,
      out: Arc::new(Mutex::new(Box::new(writer))),
    }
  }

  /// Also print records down to `level` (e.g. `Level::DEBUG`).
  pub fn with_min_level(mut self, level: Level) -> Self {
    self.min_level = level;
    self
  }

  /// Returns true if a record at `level` would be printed.
  pub fn enabled(&self, level: Level) -> bool {
    // `Level` orders TRACE as the greatest, so "at least as severe" is `<=`.
    level <= self.min_level
  }
}

impl LogSink for ConsoleSink {
  fn emit(&self, record: &LogRecord) {
    if self.enabled(record.level) {
      let line = record.render(self.indent, self.color);
      // Progress output is best effort; a closed pipe must not fail the build.
      let _ = writeln!(self.out.lock(), "{line}");
    }
  }
}

impl fmt::Debug for ConsoleSink {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.debug_struct("ConsoleSink")
      .field("indent", &self.indent)
      .field("color", &self.color)
      .field("min_level", &self.min_level)
      .finish_non_exhaustive()
  }
}

/// Keeps every record in memory.
///
/// Clones share the same buffer, so a clone can be handed to a build and the
/// original inspected afterwards.
#[derive(Debug, Clone, Default)]
pub struct MemorySink {
  records: Arc<Mutex<Vec<LogRecord>>>,
}

impl MemorySink {
  pub fn new() -> Self {
    Self::default()
  }

  pub fn records(&self) -> Vec<LogRecord> {
    self.records.lock().clone()
  }

  /// Messages in emission order.
  pub fn messages(&self) -> Vec<String> {
    self.records.lock().iter().map(|r| r.message.clone()).collect()
  }

  /// Lines rendered without color, as a console would show them.
  pub fn lines(&self, indent: usize) -> Vec<String> {
    self
      .records
      .lock()
      .iter()
      .map(|r| r.render(indent, ColorMode::Never))
      .collect()
  }

  pub fn clear(&self) {
    self.records.lock().clear();
  }
}

impl LogSink for MemorySink {
  fn emit(&self, record: &LogRecord) {
    self.records.lock().push(record.clone());
  }
}
