mod common;

use jello_config::{FixMode, JelloConfig};
use jello_diagnostics::{FixAction, Severity, classify};
use jello_driver::ExecResult;
use jello_driver::effective_exit_code;
use jello_types::{Flag, LibRef};

const CXX_FAILURE: &str = "\
/usr/bin/ld: main.o: in function `main':\n\
main.c:(.text+0x1a): undefined reference to `std::cout@@GLIBCXX_3.4'\n\
main.c:(.text+0x2b): undefined reference to `std::cout@@GLIBCXX_3.4'\n\
collect2: error: ld returned 1 exit status\n";

fn failed_result(stderr: &str) -> ExecResult {
  let plan = common::plan_for(&["main.o", "-o", "app"]);

  ExecResult {
    plan,
    exit_code: 1,
    stdout: String::new(),
    stderr: stderr.to_string(),
    post_diagnostics: Vec::new(),
  }
}

#[test]
fn e2e_cxx_failure_classifies_once() {
  let result = failed_result(CXX_FAILURE);
  let diagnostics = classify(&result.stderr);

  // Two identical reference lines dedup to one diagnostic.
  assert_eq!(diagnostics.len(), 1);

  let diag = &diagnostics[0];
  assert_eq!(diag.code, "E001");
  assert_eq!(diag.severity, Severity::Error);
  assert_eq!(diag.evidence, vec!["std::cout@@GLIBCXX_3.4"]);
  assert!(diag.fixes.iter().any(|f| f.action == FixAction::UseCxxDriver));
  assert!(
    diag
      .fixes
      .iter()
      .any(|f| f.action == FixAction::AddFlag(Flag::LinkLib(LibRef::Named("stdc++".to_string()))))
  );
}

#[test]
fn e2e_diagnosed_result_is_rewrapped_not_mutated() {
  let result = failed_result(CXX_FAILURE);
  let diagnostics = classify(&result.stderr);

  let wrapped = result.with_post_diagnostics(diagnostics);
  assert_eq!(wrapped.exit_code, 1);
  assert_eq!(wrapped.post_diagnostics.len(), 1);
}

#[test]
fn e2e_strict_mode_forces_failure_on_clean_exit() {
  let mut config = JelloConfig::default();
  config.fix_mode = FixMode::Strict;

  let mut result = failed_result("ld: warning: creating DT_TEXTREL in a PIE\n");
  result.exit_code = 0;

  // A warning alone does not fail the run.
  let warnings = classify(&result.stderr);
  let result = result.with_post_diagnostics(warnings);
  assert_eq!(effective_exit_code(&config, &result), 0);

  // An error diagnostic does, even with a clean backend exit.
  let mut result = failed_result("undefined reference to `frobnicate'\n");
  result.exit_code = 0;
  let errors = classify(&result.stderr);
  let result = result.with_post_diagnostics(errors);
  assert_eq!(effective_exit_code(&config, &result), 1);
}

#[test]
fn e2e_suggest_mode_reports_backend_code() {
  let config = JelloConfig::default();

  let result = failed_result(CXX_FAILURE);
  let diagnostics = classify(&result.stderr);
  let result = result.with_post_diagnostics(diagnostics);

  assert_eq!(effective_exit_code(&config, &result), 1);
}
