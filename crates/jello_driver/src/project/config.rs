//! Raw configuration file schema (`.jello.json` / `.gel.json` and the
//! user-level `config.json`).
//!
//! Fields are all optional; `apply` overlays the present ones onto a
//! resolved [`JelloConfig`], validating closed-set values.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use jello_config::{FixMode, JelloConfig, LogLevel};
use jello_types::Backend;

use crate::project::errors::ConfigError;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ConfigFile {
  #[serde(skip_serializing_if = "Option::is_none")]
  pub backend: Option<String>,

  #[serde(skip_serializing_if = "Option::is_none")]
  pub backend_preference: Option<Vec<String>>,

  #[serde(skip_serializing_if = "Option::is_none")]
  pub fix_mode: Option<String>,

  #[serde(skip_serializing_if = "Option::is_none")]
  pub emit_plan: Option<bool>,

  #[serde(skip_serializing_if = "Option::is_none")]
  pub plan_dir: Option<String>,

  #[serde(skip_serializing_if = "Option::is_none")]
  pub explain: Option<bool>,

  #[serde(skip_serializing_if = "Option::is_none")]
  pub dry_run: Option<bool>,

  #[serde(skip_serializing_if = "Option::is_none")]
  pub search_paths: Option<Vec<String>>,

  #[serde(skip_serializing_if = "Option::is_none")]
  pub nm: Option<String>,

  #[serde(skip_serializing_if = "Option::is_none")]
  pub log_level: Option<String>,

  #[serde(skip_serializing_if = "Option::is_none")]
  pub silent: Option<bool>,
}

/// Read and parse a configuration file.
pub fn load_config_file(path: &Path) -> Result<ConfigFile, ConfigError> {
  let content = std::fs::read_to_string(path).map_err(|e| ConfigError::Io {
    path: path.to_path_buf(),
    source: e,
  })?;

  serde_json::from_str(&content).map_err(|e| ConfigError::Json {
    path: path.to_path_buf(),
    message: e.to_string(),
  })
}

impl ConfigFile {
  /// Overlay the present fields onto `config`.
  pub fn apply(
    &self,
    config: &mut JelloConfig,
  ) -> Result<(), ConfigError> {
    if let Some(backend) = &self.backend {
      config.backend = Some(Backend::from_str(backend).ok_or(ConfigError::InvalidValue {
        field: "backend",
        value: backend.clone(),
      })?);
    }

    if let Some(preference) = &self.backend_preference {
      let mut backends = Vec::new();
      for name in preference {
        backends.push(Backend::from_str(name).ok_or(ConfigError::InvalidValue {
          field: "backend_preference",
          value: name.clone(),
        })?);
      }
      config.backend_preference = backends;
    }

    if let Some(mode) = &self.fix_mode {
      config.fix_mode = FixMode::from_str(mode).ok_or(ConfigError::InvalidValue {
        field: "fix_mode",
        value: mode.clone(),
      })?;
    }

    if let Some(emit_plan) = self.emit_plan {
      config.emit_plan = emit_plan;
    }

    if let Some(plan_dir) = &self.plan_dir {
      config.plan_dir = PathBuf::from(plan_dir);
    }

    if let Some(explain) = self.explain {
      config.explain = explain;
    }

    if let Some(dry_run) = self.dry_run {
      config.dry_run = dry_run;
    }

    if let Some(paths) = &self.search_paths {
      config.search_paths = paths.iter().map(PathBuf::from).collect();
    }

    if let Some(nm) = &self.nm {
      config.nm = Some(nm.clone());
    }

    if let Some(level) = &self.log_level {
      config.log_level = LogLevel::from_str(level).ok_or(ConfigError::InvalidValue {
        field: "log_level",
        value: level.clone(),
      })?;
    }

    if let Some(silent) = self.silent {
      config.silent = silent;
    }

    Ok(())
  }
}
