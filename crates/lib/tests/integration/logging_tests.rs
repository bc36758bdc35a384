//! Progress output of a build and subscriber setup.

use std::sync::Arc;

use serial_test::serial;
use tracing::Level;
use wisp_lib::context::{ConsoleSink, LineStyle};
use wisp_lib::logging::{LoggingError, init_tracing};
use wisp_lib::{Build, BuildConfig, ColorMode, LogConfig, Target};

use super::common::{SharedBuffer, memory_build};

#[test]
fn nested_logs_are_indented_under_their_target() {
  let prepare = Target::source("Prepare", |ctx| {
    ctx.info("Prepare plate");
    ctx.warn("Hook row is short");
    Ok(3_u32)
  });
  let make = Target::map("Make", &prepare, |ctx, rows: &u32| {
    ctx.info(format_args!("Making {rows} rows"));
    Ok(rows * 10)
  });

  let (mut build, sink) = memory_build();
  build.register(&make).resolve_all().unwrap();

  assert_eq!(
    sink.lines(2),
    vec![
      "Resolving target: \"Prepare\"",
      "  Prepare plate",
      "  Hook row is short",
      "Resolving target: \"Make\"",
      "  Making 3 rows",
      "Resolved 2 of 2 target(s)",
    ]
  );
}

#[test]
fn records_carry_target_and_style() {
  let step = Target::source("Export", |ctx| {
    ctx.debug("writing file");
    Ok(())
  });

  let (mut build, sink) = memory_build();
  build.resolve(&step).unwrap();

  let records = sink.records();
  assert_eq!(records.len(), 2);

  assert_eq!(records[0].style, LineStyle::Primary);
  assert_eq!(records[0].target, None);
  assert_eq!(records[0].level, Level::INFO);

  assert_eq!(records[1].style, LineStyle::Nested);
  assert_eq!(records[1].target.as_deref(), Some("Export"));
  assert_eq!(records[1].level, Level::DEBUG);
}

#[test]
fn memory_lines_respect_configured_indent() {
  let step = Target::source("Step", |ctx| {
    ctx.info("inside");
    Ok(())
  });

  let (mut build, sink) = memory_build();
  build.resolve(&step).unwrap();

  assert_eq!(sink.lines(4), vec!["Resolving target: \"Step\"", "    inside"]);
}

#[test]
fn console_sink_can_drive_a_build() {
  let config = LogConfig {
    color: ColorMode::Never,
    indent: 2,
  };
  let sink = ConsoleSink::new(&config).with_min_level(Level::DEBUG);
  let step = Target::source("Step", |ctx| {
    ctx.info("printing to stdout");
    Ok(1_u8)
  });

  let mut build = Build::with_sink(Arc::new(sink));
  build.register(&step).resolve_all().unwrap();

  assert_eq!(build.artifact_as::<u8>(&step), Some(&1));
}

#[test]
fn build_from_default_config_resolves() {
  let step = Target::source("Step", |_| Ok("done".to_string()));

  let mut build = Build::with_config(&BuildConfig::default());
  let artifact = build.resolve(&step).unwrap();

  assert_eq!(artifact.downcast_ref::<String>().map(String::as_str), Some("done"));
}

#[test]
fn build_from_config_applies_indent_and_color() {
  let step = Target::source("Step", |ctx| {
    ctx.info("inside");
    Ok(())
  });

  let mut plain = BuildConfig::default();
  plain.log.color = ColorMode::Never;
  plain.log.indent = 4;
  let buffer = SharedBuffer::default();
  Build::with_writer(&plain, buffer.clone()).resolve(&step).unwrap();
  assert_eq!(buffer.text(), "Resolving target: \"Step\"\n    inside\n");

  let mut colored = plain.clone();
  colored.log.color = ColorMode::Always;
  let buffer = SharedBuffer::default();
  Build::with_writer(&colored, buffer.clone()).resolve(&step).unwrap();
  let text = buffer.text();
  assert!(text.contains('\u{1b}'), "expected escape codes in {text:?}");
  assert!(text.contains("    inside"));
}

#[test]
#[serial]
fn init_tracing_installs_once() {
  // Only the first install in a process can succeed.
  let _ = init_tracing(false);

  assert!(matches!(init_tracing(true), Err(LoggingError::Init { .. })));
}
