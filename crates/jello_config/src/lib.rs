//! Resolved configuration for the jello linker driver.
//!
//! Precedence (highest first): environment variables, project file,
//! user file, built-in defaults. File loading and the layered merge
//! live in the driver's `project` module; this crate holds the
//! resolved record, its enums, and the environment overlay.

use std::fmt;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use jello_types::Backend;

/// Environment variable prefix for the deployment.
pub const ENV_PREFIX: &str = "JELLO_";

/// Policy controlling what happens to suggested fixes.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FixMode {
  /// Apply safe fixes and record them in the plan.
  Auto,
  /// Report fixes without mutating the plan.
  Suggest,
  /// Fail the run when any error diagnostic is produced.
  Strict,
}

impl FixMode {
  pub fn as_str(&self) -> &'static str {
    match self {
      FixMode::Auto => "auto",
      FixMode::Suggest => "suggest",
      FixMode::Strict => "strict",
    }
  }

  pub fn from_str(s: &str) -> Option<FixMode> {
    match s {
      "auto" => Some(FixMode::Auto),
      "suggest" => Some(FixMode::Suggest),
      "strict" => Some(FixMode::Strict),
      _ => None,
    }
  }
}

impl fmt::Display for FixMode {
  fn fmt(
    &self,
    f: &mut fmt::Formatter<'_>,
  ) -> fmt::Result {
    f.write_str(self.as_str())
  }
}

#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
  Quiet,
  Error,
  Warning,
  Info,
  Debug,
}

impl LogLevel {
  pub fn as_str(&self) -> &'static str {
    match self {
      LogLevel::Quiet => "quiet",
      LogLevel::Error => "error",
      LogLevel::Warning => "warning",
      LogLevel::Info => "info",
      LogLevel::Debug => "debug",
    }
  }

  pub fn from_str(s: &str) -> Option<LogLevel> {
    match s {
      "quiet" => Some(LogLevel::Quiet),
      "error" => Some(LogLevel::Error),
      "warning" => Some(LogLevel::Warning),
      "info" => Some(LogLevel::Info),
      "debug" => Some(LogLevel::Debug),
      _ => None,
    }
  }
}

/// The fully resolved driver configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JelloConfig {
  /// Forced backend; `None` means probe the preference list.
  pub backend: Option<Backend>,
  pub backend_preference: Vec<Backend>,
  pub fix_mode: FixMode,
  pub emit_plan: bool,
  pub plan_dir: PathBuf,
  pub explain: bool,
  pub dry_run: bool,
  /// Extra search paths prepended to the invocation's explicit paths.
  pub search_paths: Vec<PathBuf>,
  /// Override for the `nm`-equivalent tool.
  pub nm: Option<String>,
  pub log_level: LogLevel,
  pub silent: bool,
}

impl Default for JelloConfig {
  fn default() -> Self {
    Self {
      backend: None,
      backend_preference: Backend::DEFAULT_PREFERENCE.to_vec(),
      fix_mode: FixMode::Suggest,
      emit_plan: true,
      plan_dir: PathBuf::from(".jello"),
      explain: false,
      dry_run: false,
      search_paths: Vec::new(),
      nm: None,
      log_level: LogLevel::Warning,
      silent: false,
    }
  }
}

impl JelloConfig {
  /// Overlay `JELLO_*` environment variables onto this configuration.
  pub fn apply_env(&mut self) {
    self.apply_env_with(|name| std::env::var(name).ok());
  }

  /// Overlay environment variables provided by `get`. Invalid values
  /// are ignored so a stray variable cannot break the driver.
  pub fn apply_env_with<F>(
    &mut self,
    get: F,
  ) where
    F: Fn(&str) -> Option<String>,
  {
    let var = |name: &str| get(&format!("{}{}", ENV_PREFIX, name));

    if let Some(v) = var("BACKEND")
      && let Some(backend) = Backend::from_str(&v)
    {
      self.backend = Some(backend);
    }

    if let Some(v) = var("BACKEND_PREFERENCE") {
      let parsed = parse_backend_list(&v);
      if !parsed.is_empty() {
        self.backend_preference = parsed;
      }
    }

    if let Some(v) = var("FIX_MODE")
      && let Some(mode) = FixMode::from_str(&v)
    {
      self.fix_mode = mode;
    }

    if let Some(v) = var("EMIT_PLAN")
      && let Some(b) = parse_bool(&v)
    {
      self.emit_plan = b;
    }

    if let Some(v) = var("PLAN_DIR") {
      self.plan_dir = PathBuf::from(v);
    }

    if let Some(v) = var("EXPLAIN")
      && let Some(b) = parse_bool(&v)
    {
      self.explain = b;
    }

    if let Some(v) = var("DRY_RUN")
      && let Some(b) = parse_bool(&v)
    {
      self.dry_run = b;
    }

    if let Some(v) = var("SEARCH_PATHS") {
      self.search_paths = v.split(':').filter(|s| !s.is_empty()).map(PathBuf::from).collect();
    }

    if let Some(v) = var("NM")
      && !v.is_empty()
    {
      self.nm = Some(v);
    }

    if let Some(v) = var("LOG_LEVEL")
      && let Some(level) = LogLevel::from_str(&v)
    {
      self.log_level = level;
    }

    if let Some(v) = var("SILENT")
      && let Some(b) = parse_bool(&v)
    {
      self.silent = b;
    }
  }
}

/// Parse a boolean: accepts `true`/`1`/`yes` and `false`/`0`/`no`.
pub fn parse_bool(s: &str) -> Option<bool> {
  match s.trim().to_ascii_lowercase().as_str() {
    "true" | "1" | "yes" => Some(true),
    "false" | "0" | "no" => Some(false),
    _ => None,
  }
}

/// Parse a colon- or comma-separated backend list. Unknown names are
/// skipped.
pub fn parse_backend_list(s: &str) -> Vec<Backend> {
  s.split(|ch| ch == ':' || ch == ',')
    .filter_map(Backend::from_str)
    .collect()
}

#[cfg(test)]
mod tests {
  use super::*;
  use std::collections::HashMap;

  fn env_of(pairs: &[(&str, &str)]) -> HashMap<String, String> {
    pairs.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect()
  }

  #[test]
  fn test_fix_mode_round_trip() {
    for mode in [FixMode::Auto, FixMode::Suggest, FixMode::Strict] {
      assert_eq!(FixMode::from_str(mode.as_str()), Some(mode));
    }
  }

  #[test]
  fn test_log_level_round_trip() {
    let all = [
      LogLevel::Quiet,
      LogLevel::Error,
      LogLevel::Warning,
      LogLevel::Info,
      LogLevel::Debug,
    ];

    for level in all {
      assert_eq!(LogLevel::from_str(level.as_str()), Some(level));
    }
  }

  #[test]
  fn test_parse_bool() {
    assert_eq!(parse_bool("true"), Some(true));
    assert_eq!(parse_bool("1"), Some(true));
    assert_eq!(parse_bool("yes"), Some(true));
    assert_eq!(parse_bool("false"), Some(false));
    assert_eq!(parse_bool("0"), Some(false));
    assert_eq!(parse_bool("no"), Some(false));
    assert_eq!(parse_bool("maybe"), None);
  }

  #[test]
  fn test_parse_backend_list_colon_and_comma() {
    assert_eq!(parse_backend_list("mold:lld"), vec![Backend::Mold, Backend::Lld]);
    assert_eq!(parse_backend_list("gold,bfd"), vec![Backend::Gold, Backend::Bfd]);
    assert_eq!(parse_backend_list("mold:nonsense:system"), vec![Backend::Mold, Backend::System]);
  }

  #[test]
  fn test_env_overlay() {
    let env = env_of(&[
      ("JELLO_BACKEND", "lld"),
      ("JELLO_FIX_MODE", "auto"),
      ("JELLO_EMIT_PLAN", "no"),
      ("JELLO_PLAN_DIR", "/tmp/plans"),
      ("JELLO_SEARCH_PATHS", "/opt/lib:/usr/local/lib"),
      ("JELLO_LOG_LEVEL", "debug"),
      ("JELLO_SILENT", "1"),
    ]);

    let mut config = JelloConfig::default();
    config.apply_env_with(|name| env.get(name).cloned());

    assert_eq!(config.backend, Some(Backend::Lld));
    assert_eq!(config.fix_mode, FixMode::Auto);
    assert!(!config.emit_plan);
    assert_eq!(config.plan_dir, PathBuf::from("/tmp/plans"));
    assert_eq!(
      config.search_paths,
      vec![PathBuf::from("/opt/lib"), PathBuf::from("/usr/local/lib")]
    );
    assert_eq!(config.log_level, LogLevel::Debug);
    assert!(config.silent);
  }

  #[test]
  fn test_env_overlay_ignores_invalid_values() {
    let env = env_of(&[("JELLO_BACKEND", "turbolinker"), ("JELLO_EMIT_PLAN", "perhaps")]);

    let mut config = JelloConfig::default();
    config.apply_env_with(|name| env.get(name).cloned());

    assert_eq!(config.backend, None);
    assert!(config.emit_plan);
  }
}
