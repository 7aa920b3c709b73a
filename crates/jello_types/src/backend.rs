//! Backend linker identities and executable name candidates.

use std::fmt;

use serde::{Deserialize, Serialize};

#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Backend {
  Mold,
  Lld,
  Gold,
  Bfd,
  System,
}

impl Backend {
  pub fn as_str(&self) -> &'static str {
    match self {
      Backend::Mold => "mold",
      Backend::Lld => "lld",
      Backend::Gold => "gold",
      Backend::Bfd => "bfd",
      Backend::System => "system",
    }
  }

  pub fn from_str(s: &str) -> Option<Backend> {
    match s {
      "mold" => Some(Backend::Mold),
      "lld" => Some(Backend::Lld),
      "gold" => Some(Backend::Gold),
      "bfd" => Some(Backend::Bfd),
      "system" => Some(Backend::System),
      _ => None,
    }
  }

  /// Executable names to probe on PATH, in preference order.
  pub fn candidate_names(&self) -> &'static [&'static str] {
    match self {
      Backend::Mold => &["mold", "ld.mold"],
      Backend::Lld => &["ld.lld", "lld"],
      Backend::Gold => &["ld.gold"],
      Backend::Bfd => &["ld.bfd"],
      Backend::System => &["ld"],
    }
  }

  /// The default probe order when neither an override nor a preference
  /// list is configured.
  pub const DEFAULT_PREFERENCE: &'static [Backend] = &[
    Backend::Mold,
    Backend::Lld,
    Backend::Gold,
    Backend::Bfd,
    Backend::System,
  ];
}

impl fmt::Display for Backend {
  fn fmt(
    &self,
    f: &mut fmt::Formatter<'_>,
  ) -> fmt::Result {
    f.write_str(self.as_str())
  }
}
