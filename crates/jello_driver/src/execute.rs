//! Backend execution and the passthrough runner.

use std::path::Path;
use std::process::{Command, ExitStatus};

use jello_diagnostics::Diagnostic;
use jello_types::LinkError;

use crate::plan::LinkPlan;

/// The outcome of running a plan's backend. Wraps the plan unchanged;
/// diagnosis re-wraps the result rather than mutating it.
#[derive(Debug, Clone)]
pub struct ExecResult {
  pub plan: LinkPlan,
  pub exit_code: i32,
  pub stdout: String,
  pub stderr: String,
  pub post_diagnostics: Vec<Diagnostic>,
}

impl ExecResult {
  pub fn with_post_diagnostics(
    self,
    post_diagnostics: Vec<Diagnostic>,
  ) -> ExecResult {
    ExecResult {
      post_diagnostics,
      ..self
    }
  }
}

/// Spawn the backend and capture its output.
pub fn run(plan: &LinkPlan) -> Result<ExecResult, LinkError> {
  let output = Command::new(&plan.backend_path)
    .args(&plan.backend_args)
    .output()
    .map_err(|e| LinkError::Exec {
      exit_code: 1,
      stderr: format!("failed to spawn {}: {}", plan.backend_path.display(), e),
    })?;

  Ok(ExecResult {
    plan: plan.clone(),
    exit_code: exit_code_of(&output.status),
    stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
    stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
    post_diagnostics: Vec::new(),
  })
}

/// The shell command a plan would run, quoted safely, without spawning.
pub fn dry_run(plan: &LinkPlan) -> String {
  let mut parts = vec![shell_quote(&plan.backend_path.display().to_string())];
  parts.extend(plan.backend_args.iter().map(|arg| shell_quote(arg)));

  parts.join(" ")
}

/// Run an arbitrary command with inherited stdio, returning its exit
/// code. Used by the passthrough path.
pub fn run_cmd(
  program: &Path,
  args: &[String],
) -> Result<i32, LinkError> {
  let status = Command::new(program).args(args).status().map_err(|e| LinkError::Exec {
    exit_code: 1,
    stderr: format!("failed to spawn {}: {}", program.display(), e),
  })?;

  Ok(exit_code_of(&status))
}

/// Normal exit yields the code; termination by signal `s` yields
/// `128 + s`.
fn exit_code_of(status: &ExitStatus) -> i32 {
  if let Some(code) = status.code() {
    return code;
  }

  #[cfg(unix)]
  {
    use std::os::unix::process::ExitStatusExt;

    if let Some(signal) = status.signal() {
      return 128 + signal;
    }
  }

  1
}

pub fn shell_quote(arg: &str) -> String {
  let safe = !arg.is_empty()
    && arg
      .chars()
      .all(|ch| ch.is_ascii_alphanumeric() || "@%+=:,./-_".contains(ch));

  if safe {
    arg.to_string()
  } else {
    format!("'{}'", arg.replace('\'', "'\\''"))
  }
}
