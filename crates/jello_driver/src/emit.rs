//! Artifact emission: plan serialization and the replay script.
//!
//! Files are written atomically (write-temp-then-rename) so a crashed
//! run never leaves a truncated artifact behind.

use std::path::Path;

use jello_diagnostics::Diagnostic;

use crate::execute;
use crate::plan::LinkPlan;

pub const PLAN_FILE: &str = "linkplan.json";
pub const REPLAY_FILE: &str = "linkplan.sh";
pub const DIAGNOSTICS_FILE: &str = "diagnostics.json";

/// Write `linkplan.json`, `linkplan.sh` and `diagnostics.json` into
/// `dir`, creating it if missing.
pub fn write_artifacts(
  dir: &Path,
  plan: &LinkPlan,
  diagnostics: &[Diagnostic],
) -> Result<(), String> {
  std::fs::create_dir_all(dir).map_err(|e| format!("failed to create '{}': {}", dir.display(), e))?;

  let plan_json =
    serde_json::to_string_pretty(plan).map_err(|e| format!("failed to serialize plan: {}", e))?;
  write_atomic(&dir.join(PLAN_FILE), &with_newline(plan_json))?;

  write_atomic(&dir.join(REPLAY_FILE), &replay_script(plan))?;
  make_executable(&dir.join(REPLAY_FILE));

  let diag_json = serde_json::to_string_pretty(diagnostics)
    .map_err(|e| format!("failed to serialize diagnostics: {}", e))?;
  write_atomic(&dir.join(DIAGNOSTICS_FILE), &with_newline(diag_json))?;

  Ok(())
}

/// A shell script replaying the exact backend command.
pub fn replay_script(plan: &LinkPlan) -> String {
  format!(
    "#!/bin/sh\n# replay script for {} (backend: {})\nexec {}\n",
    plan.output.display(),
    plan.backend,
    execute::dry_run(plan)
  )
}

fn with_newline(mut s: String) -> String {
  if !s.ends_with('\n') {
    s.push('\n');
  }
  s
}

fn write_atomic(
  path: &Path,
  content: &str,
) -> Result<(), String> {
  let tmp = path.with_extension("tmp");

  std::fs::write(&tmp, content).map_err(|e| format!("failed to write '{}': {}", tmp.display(), e))?;
  std::fs::rename(&tmp, path).map_err(|e| format!("failed to rename '{}': {}", path.display(), e))
}

#[cfg(unix)]
fn make_executable(path: &Path) {
  use std::os::unix::fs::PermissionsExt;

  let _ = std::fs::set_permissions(path, std::fs::Permissions::from_mode(0o755));
}

#[cfg(not(unix))]
fn make_executable(_path: &Path) {}
