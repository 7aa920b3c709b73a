//! Link inputs and library references.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::triple::Arch;

/// A reference to a library that has not yet been resolved to a file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum LibRef {
  /// `-lfoo`
  Named(String),
  /// An explicit path to a library file.
  Path(PathBuf),
  /// `-framework Foo` (macOS).
  Framework(String),
}

#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LibKind {
  Static,
  Shared,
}

/// A library reference resolved to a concrete on-disk artifact.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResolvedLib {
  pub reference: LibRef,
  pub path: PathBuf,
  pub kind: LibKind,
  /// Advisory; populated when the platform `file` tool recognizes the
  /// artifact, `None` otherwise.
  pub detected_arch: Option<Arch>,
}

/// A positional input on the link line.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Input {
  Object(PathBuf),
  Archive(PathBuf),
  SharedObject(PathBuf),
  LinkerScript(PathBuf),
  ResponseFile(PathBuf),
  Lib(LibRef),
  RawInput(PathBuf),
}

impl Input {
  /// Classify a positional argument by extension.
  pub fn classify(path: &str) -> Input {
    let p = PathBuf::from(path);
    let name = p.file_name().and_then(|n| n.to_str()).unwrap_or(path);

    match p.extension().and_then(|e| e.to_str()) {
      Some("o") | Some("obj") => Input::Object(p),
      Some("a") => Input::Archive(p),
      Some("so") | Some("dylib") | Some("dll") => Input::SharedObject(p),
      Some("ld") | Some("lds") => Input::LinkerScript(p),
      // Versioned shared objects: libfoo.so.6, libfoo.so.6.0.1
      _ if name.contains(".so.") => Input::SharedObject(p),
      _ => Input::RawInput(p),
    }
  }

  /// The on-disk path of this input, when it has one.
  pub fn path(&self) -> Option<&Path> {
    match self {
      Input::Object(p)
      | Input::Archive(p)
      | Input::SharedObject(p)
      | Input::LinkerScript(p)
      | Input::ResponseFile(p)
      | Input::RawInput(p) => Some(p),
      Input::Lib(LibRef::Path(p)) => Some(p),
      Input::Lib(_) => None,
    }
  }
}
