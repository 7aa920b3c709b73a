//! Layered configuration loading.
//!
//! Precedence (highest first): `JELLO_*` environment variables, the
//! project file found by walking upward from the working directory, the
//! user file under the XDG config directory, built-in defaults.

pub mod config;
pub mod errors;
pub mod find;

use std::path::PathBuf;

use jello_config::JelloConfig;

use crate::project::config::load_config_file;
use crate::project::errors::ConfigError;
use crate::project::find::{find_project_file, user_config_file};

/// A resolved configuration plus the files that contributed to it.
#[derive(Debug, Clone)]
pub struct LoadedConfig {
  pub config: JelloConfig,
  pub project_file: Option<PathBuf>,
  pub user_file: Option<PathBuf>,
}

/// Load the layered configuration starting from the current directory.
pub fn load() -> Result<LoadedConfig, ConfigError> {
  let cwd = std::env::current_dir().map_err(|e| ConfigError::Io {
    path: PathBuf::from("."),
    source: e,
  })?;

  load_from(&cwd)
}

pub fn load_from(start: &std::path::Path) -> Result<LoadedConfig, ConfigError> {
  let mut config = JelloConfig::default();

  let user_file = user_config_file();
  if let Some(path) = &user_file {
    load_config_file(path)?.apply(&mut config)?;
  }

  let project_file = find_project_file(start);
  if let Some(path) = &project_file {
    load_config_file(path)?.apply(&mut config)?;
  }

  config.apply_env();

  Ok(LoadedConfig {
    config,
    project_file,
    user_file,
  })
}
