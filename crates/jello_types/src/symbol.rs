//! Symbol table entries as reported by an `nm`-equivalent tool.

use serde::{Deserialize, Serialize};

#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SymbolKind {
  Text,
  Data,
  Bss,
  Rodata,
  Undefined,
  Weak,
  Common,
  Other,
}

impl SymbolKind {
  /// Map an `nm -P` type character to a kind.
  pub fn from_nm_char(ch: char) -> SymbolKind {
    match ch {
      'T' | 't' => SymbolKind::Text,
      'D' | 'd' => SymbolKind::Data,
      'B' | 'b' => SymbolKind::Bss,
      'R' | 'r' => SymbolKind::Rodata,
      'U' => SymbolKind::Undefined,
      'W' | 'w' | 'V' | 'v' => SymbolKind::Weak,
      'C' | 'c' => SymbolKind::Common,
      _ => SymbolKind::Other,
    }
  }
}

#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SymbolScope {
  Global,
  Local,
}

impl SymbolScope {
  pub fn from_nm_char(ch: char) -> SymbolScope {
    if ch.is_ascii_uppercase() {
      SymbolScope::Global
    } else {
      SymbolScope::Local
    }
  }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Symbol {
  pub name: String,
  pub kind: SymbolKind,
  pub scope: SymbolScope,
}

impl Symbol {
  /// A symbol counts as defined when it is global and not undefined or
  /// of unknown kind.
  pub fn is_defined(&self) -> bool {
    self.scope == SymbolScope::Global && !matches!(self.kind, SymbolKind::Undefined | SymbolKind::Other)
  }
}
