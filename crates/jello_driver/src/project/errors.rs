//! Error types for configuration loading.

use std::fmt;
use std::path::PathBuf;

#[derive(Debug)]
pub enum ConfigError {
  /// I/O error while reading a file.
  Io { path: PathBuf, source: std::io::Error },

  /// Failed to parse a configuration file as JSON.
  Json { path: PathBuf, message: String },

  /// A field carried a value outside its closed set.
  InvalidValue { field: &'static str, value: String },
}

impl fmt::Display for ConfigError {
  fn fmt(
    &self,
    f: &mut fmt::Formatter<'_>,
  ) -> fmt::Result {
    match self {
      ConfigError::Io { path, source } => {
        write!(f, "failed to read '{}': {}", path.display(), source)
      },

      ConfigError::Json { path, message } => {
        write!(f, "failed to parse '{}': {}", path.display(), message)
      },

      ConfigError::InvalidValue { field, value } => {
        write!(f, "invalid value '{}' for config field '{}'", value, field)
      },
    }
  }
}

impl std::error::Error for ConfigError {
  fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
    match self {
      ConfigError::Io { source, .. } => Some(source),
      _ => None,
    }
  }
}
