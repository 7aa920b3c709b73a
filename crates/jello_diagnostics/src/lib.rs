//! Structured diagnostics for backend link failures.
//!
//! The rule table in [`rules`] classifies raw backend output into
//! [`Diagnostic`] values carrying evidence and suggested [`Fix`]es.

pub mod rules;

use std::collections::HashSet;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use jello_types::Flag;

pub use rules::{classify, classify_line};

#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
  Error,
  Warning,
  Info,
  Hint,
}

#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Confidence {
  High,
  Medium,
  Low,
}

/// A concrete remediation a user (or the driver in auto mode) can apply.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum FixAction {
  AddFlag(Flag),
  RemoveFlag(Flag),
  ReorderLibs,
  /// Wrap the named static libraries in `--start-group`/`--end-group`.
  AddGroup(Vec<PathBuf>),
  SuggestPackage(String),
  /// `file` may be empty to mean "unknown file".
  SuggestRecompile { file: String, flags: Vec<String> },
  UseCxxDriver,
  AddSearchPath(String),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Fix {
  pub description: String,
  pub confidence: Confidence,
  pub action: FixAction,
}

impl Fix {
  pub fn new(
    description: impl Into<String>,
    confidence: Confidence,
    action: FixAction,
  ) -> Self {
    Self {
      description: description.into(),
      confidence,
      action,
    }
  }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Diagnostic {
  pub severity: Severity,
  /// Stable code, e.g. "E001".
  pub code: String,
  pub message: String,
  pub evidence: Vec<String>,
  pub fixes: Vec<Fix>,
}

impl Diagnostic {
  pub fn new(
    severity: Severity,
    code: impl Into<String>,
    message: impl Into<String>,
  ) -> Self {
    Self {
      severity,
      code: code.into(),
      message: message.into(),
      evidence: Vec::new(),
      fixes: Vec::new(),
    }
  }

  pub fn with_evidence(
    mut self,
    evidence: impl Into<String>,
  ) -> Self {
    self.evidence.push(evidence.into());
    self
  }

  pub fn with_fix(
    mut self,
    fix: Fix,
  ) -> Self {
    self.fixes.push(fix);
    self
  }

  fn dedup_key(&self) -> (String, String) {
    (self.code.clone(), self.evidence.join("\u{1f}"))
  }
}

/// Remove duplicate diagnostics, keyed by `(code, evidence)`, keeping
/// the first occurrence of each key.
pub fn dedup(diagnostics: Vec<Diagnostic>) -> Vec<Diagnostic> {
  let mut seen = HashSet::new();
  let mut result = Vec::new();

  for diag in diagnostics {
    if seen.insert(diag.dedup_key()) {
      result.push(diag);
    }
  }

  result
}

/// Diagnostics carrying at least one high-confidence fix.
pub fn auto_fixable(diagnostics: &[Diagnostic]) -> Vec<&Diagnostic> {
  diagnostics
    .iter()
    .filter(|d| d.fixes.iter().any(|f| f.confidence == Confidence::High))
    .collect()
}

#[cfg(test)]
mod tests {
  use super::*;

  fn diag(
    code: &str,
    evidence: &str,
  ) -> Diagnostic {
    Diagnostic::new(Severity::Error, code, "message").with_evidence(evidence)
  }

  #[test]
  fn test_dedup_keeps_first_occurrence() {
    let diags = vec![diag("E001", "foo"), diag("E001", "bar"), diag("E001", "foo")];

    let deduped = dedup(diags);
    assert_eq!(deduped.len(), 2);
    assert_eq!(deduped[0].evidence, vec!["foo"]);
    assert_eq!(deduped[1].evidence, vec!["bar"]);
  }

  #[test]
  fn test_dedup_is_idempotent() {
    let diags = vec![diag("E001", "foo"), diag("E002", "foo"), diag("E001", "foo")];

    let once = dedup(diags);
    let twice = dedup(once.clone());
    assert_eq!(once, twice);
  }

  #[test]
  fn test_auto_fixable_requires_high_confidence() {
    let low = diag("E006", "x").with_fix(Fix::new(
      "advice",
      Confidence::Low,
      FixAction::SuggestRecompile {
        file: String::new(),
        flags: vec![],
      },
    ));
    let high = diag("E001", "y").with_fix(Fix::new("link libm", Confidence::High, FixAction::UseCxxDriver));
    let none = diag("E015", "z");

    let diags = vec![low, high, none];
    let fixable = auto_fixable(&diags);

    assert_eq!(fixable.len(), 1);
    assert_eq!(fixable[0].code, "E001");
  }
}
