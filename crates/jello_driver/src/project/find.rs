//! Locating project and user configuration files.

use std::path::{Path, PathBuf};

/// Project config filenames, probed in order in each directory.
pub const PROJECT_FILES: &[&str] = &[".jello.json", ".gel.json"];

/// Search upward from `start` for a project configuration file.
///
/// Returns the file path itself, or `None` when no candidate exists
/// before the filesystem root.
pub fn find_project_file(start: &Path) -> Option<PathBuf> {
  let mut current = if start.is_file() {
    start.parent()?.to_path_buf()
  } else {
    start.to_path_buf()
  };

  loop {
    for name in PROJECT_FILES {
      let candidate = current.join(name);
      if candidate.is_file() {
        return Some(candidate);
      }
    }

    if !current.pop() {
      return None;
    }
  }
}

/// The user-level configuration file, if it exists:
/// `$XDG_CONFIG_HOME/jello/config.json` with a `$HOME/.config` fallback.
pub fn user_config_file() -> Option<PathBuf> {
  let base = std::env::var("XDG_CONFIG_HOME")
    .ok()
    .filter(|v| !v.is_empty())
    .map(PathBuf::from)
    .or_else(|| std::env::var("HOME").ok().map(|home| PathBuf::from(home).join(".config")))?;

  let candidate = base.join("jello").join("config.json");
  candidate.is_file().then_some(candidate)
}

#[cfg(test)]
mod tests {
  use super::*;
  use std::fs;

  #[test]
  fn test_find_project_file_in_current_dir() {
    let temp_dir = std::env::temp_dir().join("jello_find_test_current");
    let _ = fs::remove_dir_all(&temp_dir);
    fs::create_dir_all(&temp_dir).unwrap();

    let config_path = temp_dir.join(".jello.json");
    fs::write(&config_path, "{}").unwrap();

    let result = find_project_file(&temp_dir);
    assert_eq!(result, Some(config_path));

    fs::remove_dir_all(&temp_dir).unwrap();
  }

  #[test]
  fn test_find_project_file_in_parent() {
    let temp_dir = std::env::temp_dir().join("jello_find_test_parent");
    let _ = fs::remove_dir_all(&temp_dir);
    let sub_dir = temp_dir.join("src").join("nested");
    fs::create_dir_all(&sub_dir).unwrap();

    let config_path = temp_dir.join(".jello.json");
    fs::write(&config_path, "{}").unwrap();

    let result = find_project_file(&sub_dir);
    assert_eq!(result, Some(config_path));

    fs::remove_dir_all(&temp_dir).unwrap();
  }

  #[test]
  fn test_find_project_file_accepts_gel_alias() {
    let temp_dir = std::env::temp_dir().join("jello_find_test_gel");
    let _ = fs::remove_dir_all(&temp_dir);
    fs::create_dir_all(&temp_dir).unwrap();

    let config_path = temp_dir.join(".gel.json");
    fs::write(&config_path, "{}").unwrap();

    let result = find_project_file(&temp_dir);
    assert_eq!(result, Some(config_path));

    fs::remove_dir_all(&temp_dir).unwrap();
  }

  #[test]
  fn test_find_project_file_not_found() {
    let temp_dir = std::env::temp_dir().join("jello_find_test_notfound");
    let _ = fs::remove_dir_all(&temp_dir);
    fs::create_dir_all(&temp_dir).unwrap();

    let result = find_project_file(&temp_dir);
    assert!(result.is_none());

    fs::remove_dir_all(&temp_dir).unwrap();
  }
}
