//! The normalized model of a single link invocation.

use std::fmt;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::flag::Flag;
use crate::input::Input;

#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LinkMode {
  Executable,
  Shared,
  Static,
  Pie,
  Relocatable,
}

impl LinkMode {
  pub fn as_str(&self) -> &'static str {
    match self {
      LinkMode::Executable => "executable",
      LinkMode::Shared => "shared",
      LinkMode::Static => "static",
      LinkMode::Pie => "pie",
      LinkMode::Relocatable => "relocatable",
    }
  }

  pub fn from_str(s: &str) -> Option<LinkMode> {
    match s {
      "executable" => Some(LinkMode::Executable),
      "shared" => Some(LinkMode::Shared),
      "static" => Some(LinkMode::Static),
      "pie" => Some(LinkMode::Pie),
      "relocatable" => Some(LinkMode::Relocatable),
      _ => None,
    }
  }
}

impl fmt::Display for LinkMode {
  fn fmt(
    &self,
    f: &mut fmt::Formatter<'_>,
  ) -> fmt::Result {
    f.write_str(self.as_str())
  }
}

impl Default for LinkMode {
  fn default() -> Self {
    LinkMode::Executable
  }
}

/// A parsed invocation. Built once by parsing, adjusted once by
/// normalization, read-only afterwards.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Invocation {
  pub raw_args: Vec<String>,
  pub flags: Vec<Flag>,
  pub inputs: Vec<Input>,
  pub output: Option<PathBuf>,
  pub link_mode: LinkMode,
  /// `-L` paths in command-line order.
  pub explicit_search_paths: Vec<PathBuf>,
}
