//! Build configuration.
//!
//! Only presentation is configurable: whether progress lines are colored and how
//! far each nesting level is indented. Values come from code, from a serialized
//! config, or from the environment.

use std::env;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Environment variable selecting the color mode (`auto`, `always`, `never`).
pub const LOG_COLOR_ENV: &str = "WISP_LOG_COLOR";

/// Environment variable setting spaces per nesting level.
pub const LOG_INDENT_ENV: &str = "WISP_LOG_INDENT";

/// Conventional opt-out honored by [`ColorMode::Auto`].
pub const NO_COLOR_ENV: &str = "NO_COLOR";

const DEFAULT_INDENT: usize = 2;

/// Errors raised while reading configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
  #[error("invalid value for {var}: {value:?} (expected one of: auto, always, never)")]
  InvalidColor { var: &'static str, value: String },

  #[error("invalid value for {var}: {value:?} (expected a number of spaces)")]
  InvalidIndent { var: &'static str, value: String },
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ColorMode {
  /// Color when the output stream supports it.
  #[default]
  Auto,
  Always,
  Never,
}

impl std::str::FromStr for ColorMode {
  type Err = ConfigError;

  fn from_str(s: &str) -> Result<Self, Self::Err> {
    match s.trim().to_ascii_lowercase().as_str() {
      "auto" => Ok(ColorMode::Auto),
      "always" => Ok(ColorMode::Always),
      "never" => Ok(ColorMode::Never),
      _ => Err(ConfigError::InvalidColor {
        var: LOG_COLOR_ENV,
        value: s.to_string(),
      }),
    }
  }
}

/// Presentation of progress output.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LogConfig {
  pub color: ColorMode,

  /// Spaces added per nesting level.
  pub indent: usize,
}

impl Default for LogConfig {
  fn default() -> Self {
    Self {
      color: ColorMode::Auto,
      indent: DEFAULT_INDENT,
    }
  }
}

/// Configuration for a [`Build`](crate::build::Build).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BuildConfig {
  pub log: LogConfig,
}

impl BuildConfig {
  /// Read configuration from the environment, falling back to defaults.
  ///
  /// `NO_COLOR` (any non-empty value) turns `auto` into `never`.
  pub fn from_env() -> Result<Self, ConfigError> {
    let mut config = Self::default();

    if let Some(value) = read_var(LOG_COLOR_ENV) {
      config.log.color = value.parse()?;
    }

    if let Some(value) = read_var(LOG_INDENT_ENV) {
      config.log.indent = value.trim().parse().map_err(|_| ConfigError::InvalidIndent {
        var: LOG_INDENT_ENV,
        value: value.clone(),
      })?;
    }

    if config.log.color == ColorMode::Auto && read_var(NO_COLOR_ENV).is_some() {
      config.log.color = ColorMode::Never;
    }

    Ok(config)
  }
}

fn read_var(name: &str) -> Option<String> {
  env::var(name).ok().filter(|v| !v.is_empty())
}
