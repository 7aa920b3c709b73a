//! Library resolution: mapping references to concrete artifacts.

use std::path::{Path, PathBuf};
use std::process::Command;

use jello_types::{Arch, Flag, Input, Invocation, LibKind, LibRef, LinkError, ResolvedLib};

/// Framework roots probed for `-framework` references (macOS).
const FRAMEWORK_DIRS: &[&str] = &["/System/Library/Frameworks", "/Library/Frameworks"];

/// Collect library references from flags and inputs, in order.
pub fn collect_lib_refs(inv: &Invocation) -> Vec<LibRef> {
  let mut refs = Vec::new();

  for flag in &inv.flags {
    if let Flag::LinkLib(reference) = flag {
      refs.push(reference.clone());
    }
  }

  for input in &inv.inputs {
    if let Input::Lib(reference) = input {
      refs.push(reference.clone());
    }
  }

  refs
}

/// Whether static libraries are preferred at the end of the flag
/// stream: the last of `-Bstatic`/`-static` (true) and `-Bdynamic`
/// (false) wins.
pub fn static_preference(inv: &Invocation) -> bool {
  let mut prefer_static = false;

  for flag in &inv.flags {
    match flag {
      Flag::Bstatic | Flag::Static => prefer_static = true,
      Flag::Bdynamic => prefer_static = false,
      _ => {},
    }
  }

  prefer_static
}

/// Combine explicit and system search paths, dropping duplicates while
/// preserving first occurrence.
pub fn search_paths(
  explicit: &[PathBuf],
  system: &[PathBuf],
) -> Vec<PathBuf> {
  let mut combined = Vec::new();

  for path in explicit.iter().chain(system.iter()) {
    if !combined.contains(path) {
      combined.push(path.clone());
    }
  }

  combined
}

/// Resolve every reference. Missing libraries compose into a single
/// `Multiple` error; a lone failure surfaces directly.
pub fn resolve_refs(
  refs: &[LibRef],
  paths: &[PathBuf],
  prefer_static: bool,
) -> Result<Vec<ResolvedLib>, LinkError> {
  let mut resolved = Vec::new();
  let mut errors = Vec::new();

  for reference in refs {
    match resolve_one(reference, paths, prefer_static) {
      Ok(mut lib) => {
        lib.detected_arch = detect_arch(&lib.path);
        resolved.push(lib);
      },
      Err(error) => errors.push(error),
    }
  }

  if errors.is_empty() {
    Ok(resolved)
  } else if errors.len() == 1 {
    Err(errors.remove(0))
  } else {
    Err(LinkError::Multiple(errors))
  }
}

fn resolve_one(
  reference: &LibRef,
  paths: &[PathBuf],
  prefer_static: bool,
) -> Result<ResolvedLib, LinkError> {
  match reference {
    LibRef::Path(path) => {
      if path.is_file() {
        Ok(ResolvedLib {
          reference: reference.clone(),
          path: path.clone(),
          kind: kind_from_extension(path),
          detected_arch: None,
        })
      } else {
        Err(LinkError::Resolve {
          lib: path.display().to_string(),
          searched: Vec::new(),
        })
      }
    },

    LibRef::Named(name) => {
      for dir in paths {
        if let Some(lib) = probe_named(reference, dir, name, prefer_static) {
          return Ok(lib);
        }
      }

      Err(LinkError::Resolve {
        lib: name.clone(),
        searched: paths.to_vec(),
      })
    },

    LibRef::Framework(name) => {
      for root in FRAMEWORK_DIRS {
        let candidate = Path::new(root).join(format!("{}.framework", name)).join(name);
        if candidate.is_file() {
          return Ok(ResolvedLib {
            reference: reference.clone(),
            path: candidate,
            kind: LibKind::Shared,
            detected_arch: None,
          });
        }
      }

      Err(LinkError::Resolve {
        lib: name.clone(),
        searched: FRAMEWORK_DIRS.iter().map(|dir| PathBuf::from(*dir)).collect(),
      })
    },
  }
}

fn probe_named(
  reference: &LibRef,
  dir: &Path,
  name: &str,
  prefer_static: bool,
) -> Option<ResolvedLib> {
  let static_candidate = dir.join(format!("lib{}.a", name));
  let shared_candidates = [dir.join(format!("lib{}.so", name)), dir.join(format!("lib{}.dylib", name))];

  let found = if prefer_static {
    probe_file(&static_candidate, LibKind::Static)
      .or_else(|| shared_candidates.iter().find_map(|c| probe_file(c, LibKind::Shared)))
  } else {
    shared_candidates
      .iter()
      .find_map(|c| probe_file(c, LibKind::Shared))
      .or_else(|| probe_file(&static_candidate, LibKind::Static))
  };

  found.map(|(path, kind)| ResolvedLib {
    reference: reference.clone(),
    path,
    kind,
    detected_arch: None,
  })
}

fn probe_file(
  path: &Path,
  kind: LibKind,
) -> Option<(PathBuf, LibKind)> {
  path.is_file().then(|| (path.to_path_buf(), kind))
}

fn kind_from_extension(path: &Path) -> LibKind {
  match path.extension().and_then(|e| e.to_str()) {
    Some("a") => LibKind::Static,
    _ => LibKind::Shared,
  }
}

/// Ask the platform `file` tool what architecture an artifact targets.
/// Advisory only: any failure yields `None`.
pub fn detect_arch(path: &Path) -> Option<Arch> {
  let output = Command::new("file").arg(path).output().ok()?;

  if !output.status.success() {
    return None;
  }

  parse_file_arch(&String::from_utf8_lossy(&output.stdout))
}

/// Keyword scan over `file` output.
pub fn parse_file_arch(text: &str) -> Option<Arch> {
  let lower = text.to_ascii_lowercase();

  if lower.contains("x86-64") || lower.contains("x86_64") {
    Some(Arch::X86_64)
  } else if lower.contains("aarch64") || lower.contains("arm64") {
    Some(Arch::Aarch64)
  } else if lower.contains("80386") {
    Some(Arch::I686)
  } else if lower.contains("arm") {
    Some(Arch::Armv7)
  } else {
    None
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::parse::parse_args;

  fn args(list: &[&str]) -> Vec<String> {
    list.iter().map(|s| s.to_string()).collect()
  }

  fn touch(path: &Path) {
    std::fs::write(path, "").unwrap();
  }

  #[test]
  fn test_collect_refs_from_flags() {
    let inv = parse_args(&args(&["-lfoo", "foo.o", "-lbar"])).unwrap();
    let refs = collect_lib_refs(&inv);

    assert_eq!(
      refs,
      vec![LibRef::Named("foo".to_string()), LibRef::Named("bar".to_string())]
    );
  }

  #[test]
  fn test_static_preference_last_wins() {
    let inv = parse_args(&args(&["-Bstatic", "-la", "-Bdynamic", "-lb"])).unwrap();
    assert!(!static_preference(&inv));

    let inv = parse_args(&args(&["-Bdynamic", "-la", "-Bstatic", "-lb"])).unwrap();
    assert!(static_preference(&inv));

    let inv = parse_args(&args(&["-static", "-la"])).unwrap();
    assert!(static_preference(&inv));
  }

  #[test]
  fn test_search_paths_explicit_before_system() {
    let combined = search_paths(
      &[PathBuf::from("/explicit"), PathBuf::from("/usr/lib")],
      &[PathBuf::from("/usr/lib"), PathBuf::from("/lib")],
    );

    assert_eq!(
      combined,
      vec![PathBuf::from("/explicit"), PathBuf::from("/usr/lib"), PathBuf::from("/lib")]
    );
  }

  #[test]
  fn test_resolve_named_prefers_shared_by_default() {
    let dir = std::env::temp_dir().join("jello_resolve_test_shared");
    let _ = std::fs::remove_dir_all(&dir);
    std::fs::create_dir_all(&dir).unwrap();
    touch(&dir.join("libfoo.a"));
    touch(&dir.join("libfoo.so"));

    let lib = resolve_one(&LibRef::Named("foo".to_string()), &[dir.clone()], false).unwrap();
    assert_eq!(lib.path, dir.join("libfoo.so"));
    assert_eq!(lib.kind, LibKind::Shared);

    let lib = resolve_one(&LibRef::Named("foo".to_string()), &[dir.clone()], true).unwrap();
    assert_eq!(lib.path, dir.join("libfoo.a"));
    assert_eq!(lib.kind, LibKind::Static);

    std::fs::remove_dir_all(&dir).unwrap();
  }

  #[test]
  fn test_resolve_named_falls_back_across_kinds() {
    let dir = std::env::temp_dir().join("jello_resolve_test_fallback");
    let _ = std::fs::remove_dir_all(&dir);
    std::fs::create_dir_all(&dir).unwrap();
    touch(&dir.join("libonly_static.a"));

    let lib = resolve_one(&LibRef::Named("only_static".to_string()), &[dir.clone()], false).unwrap();
    assert_eq!(lib.kind, LibKind::Static);

    std::fs::remove_dir_all(&dir).unwrap();
  }

  #[test]
  fn test_resolve_path_reference() {
    let dir = std::env::temp_dir().join("jello_resolve_test_path");
    let _ = std::fs::remove_dir_all(&dir);
    std::fs::create_dir_all(&dir).unwrap();
    let archive = dir.join("libx.a");
    touch(&archive);

    let lib = resolve_one(&LibRef::Path(archive.clone()), &[], false).unwrap();
    assert_eq!(lib.path, archive);
    assert_eq!(lib.kind, LibKind::Static);

    std::fs::remove_dir_all(&dir).unwrap();
  }

  #[test]
  fn test_missing_lib_reports_searched_paths() {
    let dirs = vec![PathBuf::from("/nonexistent/a"), PathBuf::from("/nonexistent/b")];
    let err = resolve_one(&LibRef::Named("ghost".to_string()), &dirs, false).unwrap_err();

    match err {
      LinkError::Resolve { lib, searched } => {
        assert_eq!(lib, "ghost");
        assert_eq!(searched, dirs);
      },
      other => panic!("expected resolve error, got {:?}", other),
    }
  }

  #[test]
  fn test_multiple_missing_libs_compose() {
    let inv = parse_args(&args(&["-lghost1", "-lghost2"])).unwrap();
    let refs = collect_lib_refs(&inv);
    let err = resolve_refs(&refs, &[PathBuf::from("/nonexistent")], false).unwrap_err();

    match err {
      LinkError::Multiple(errors) => assert_eq!(errors.len(), 2),
      other => panic!("expected multiple errors, got {:?}", other),
    }
  }

  #[test]
  fn test_parse_file_arch_keywords() {
    assert_eq!(
      parse_file_arch("ELF 64-bit LSB relocatable, x86-64, version 1 (SYSV)"),
      Some(Arch::X86_64)
    );
    assert_eq!(
      parse_file_arch("ELF 64-bit LSB shared object, ARM aarch64"),
      Some(Arch::Aarch64)
    );
    assert_eq!(
      parse_file_arch("ELF 32-bit LSB relocatable, Intel 80386"),
      Some(Arch::I686)
    );
    assert_eq!(parse_file_arch("ELF 32-bit LSB relocatable, ARM, EABI5"), Some(Arch::Armv7));
    assert_eq!(parse_file_arch("ASCII text"), None);
  }
}
