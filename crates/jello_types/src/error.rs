//! Error taxonomy for the link pipeline.

use std::fmt;
use std::path::PathBuf;

/// Errors raised by pipeline phases. Each phase owns one variant;
/// `Multiple` composes sub-errors for batched contexts such as
/// several unresolved libraries.
#[derive(Debug, Clone, PartialEq)]
pub enum LinkError {
  Parse(String),
  Normalize(String),
  Discovery(String),
  Resolve { lib: String, searched: Vec<PathBuf> },
  Symbol(String),
  Reorder(String),
  Plan(String),
  Exec { exit_code: i32, stderr: String },
  Multiple(Vec<LinkError>),
}

impl fmt::Display for LinkError {
  fn fmt(
    &self,
    f: &mut fmt::Formatter<'_>,
  ) -> fmt::Result {
    match self {
      LinkError::Parse(message) => write!(f, "parse error: {}", message),

      LinkError::Normalize(message) => write!(f, "normalize error: {}", message),

      LinkError::Discovery(message) => write!(f, "discovery error: {}", message),

      LinkError::Resolve { lib, searched } => {
        let dirs: Vec<String> = searched.iter().map(|p| p.display().to_string()).collect();
        write!(f, "cannot resolve library '{}' (searched: {})", lib, dirs.join(", "))
      },

      LinkError::Symbol(message) => write!(f, "symbol extraction error: {}", message),

      LinkError::Reorder(message) => write!(f, "reorder error: {}", message),

      LinkError::Plan(message) => write!(f, "plan error: {}", message),

      LinkError::Exec { exit_code, stderr } => {
        write!(f, "backend failed with exit code {}: {}", exit_code, stderr.trim())
      },

      LinkError::Multiple(errors) => {
        let parts: Vec<String> = errors.iter().map(|e| e.to_string()).collect();
        write!(f, "{}", parts.join("; "))
      },
    }
  }
}

impl std::error::Error for LinkError {}
