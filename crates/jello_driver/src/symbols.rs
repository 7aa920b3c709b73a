//! Symbol extraction via `nm -P -g` and the derived provider and
//! requirement maps.
//!
//! All derived maps use ordered containers so downstream graph
//! construction iterates deterministically.

use std::collections::{BTreeMap, BTreeSet};
use std::path::{Path, PathBuf};
use std::process::Command;

use jello_types::{LinkError, Symbol, SymbolKind, SymbolScope};

/// Run `nm -P -g` on an object or archive and parse its symbol table.
pub fn extract(
  nm: &Path,
  object: &Path,
) -> Result<Vec<Symbol>, LinkError> {
  let output = Command::new(nm)
    .arg("-P")
    .arg("-g")
    .arg(object)
    .output()
    .map_err(|e| LinkError::Symbol(format!("failed to run {}: {}", nm.display(), e)))?;

  if !output.status.success() {
    let stderr = String::from_utf8_lossy(&output.stderr);
    return Err(LinkError::Symbol(format!(
      "{} failed on {}: {}",
      nm.display(),
      object.display(),
      stderr.trim()
    )));
  }

  Ok(parse_nm_output(&String::from_utf8_lossy(&output.stdout)))
}

/// Parse `nm -P` portable output: one `name type [value [size]]` record
/// per line. Archive member headers and blank lines are skipped.
pub fn parse_nm_output(text: &str) -> Vec<Symbol> {
  let mut symbols = Vec::new();

  for line in text.lines() {
    let mut parts = line.split_whitespace();

    let (Some(name), Some(ty)) = (parts.next(), parts.next()) else {
      continue;
    };

    if ty.len() != 1 {
      continue;
    }

    let ch = ty.chars().next().unwrap_or('?');

    symbols.push(Symbol {
      name: name.to_string(),
      kind: SymbolKind::from_nm_char(ch),
      scope: SymbolScope::from_nm_char(ch),
    });
  }

  symbols
}

/// All symbols the file requires from elsewhere.
pub fn undefined(symbols: &[Symbol]) -> Vec<Symbol> {
  symbols
    .iter()
    .filter(|s| s.kind == SymbolKind::Undefined)
    .cloned()
    .collect()
}

/// All symbols the file provides to others.
pub fn defined(symbols: &[Symbol]) -> Vec<Symbol> {
  symbols.iter().filter(|s| s.is_defined()).cloned().collect()
}

/// Map each symbol name to the set of files that define it.
pub fn providers(files: &BTreeMap<PathBuf, Vec<Symbol>>) -> BTreeMap<String, BTreeSet<PathBuf>> {
  let mut map: BTreeMap<String, BTreeSet<PathBuf>> = BTreeMap::new();

  for (path, symbols) in files {
    for symbol in defined(symbols) {
      map.entry(symbol.name).or_default().insert(path.clone());
    }
  }

  map
}

/// Map each file to the list of symbol names it requires.
pub fn requirements(files: &BTreeMap<PathBuf, Vec<Symbol>>) -> BTreeMap<PathBuf, Vec<String>> {
  files
    .iter()
    .map(|(path, symbols)| {
      let needs: Vec<String> = undefined(symbols).into_iter().map(|s| s.name).collect();
      (path.clone(), needs)
    })
    .collect()
}
