//! Invocation normalization: conflict resolution, dedup, defaults.

use std::collections::HashSet;
use std::path::PathBuf;

use jello_types::{Flag, Invocation, LinkError};

/// Normalize an invocation. Idempotent: normalizing twice yields the
/// same value.
pub fn normalize(mut inv: Invocation) -> Result<Invocation, LinkError> {
  let mut seen_paths = HashSet::new();
  inv.explicit_search_paths.retain(|p| seen_paths.insert(p.clone()));

  resolve_pie_conflict(&mut inv.flags);

  inv.flags = dedup_flags(inv.flags);

  if inv.output.is_none() {
    inv.output = Some(PathBuf::from("a.out"));
  }

  Ok(inv)
}

/// `-pie` vs `-no-pie` is last-wins: every occurrence of the losing
/// kind precedes the final winner, so the losing kind is dropped
/// entirely.
fn resolve_pie_conflict(flags: &mut Vec<Flag>) {
  let last_pie = flags.iter().rposition(|f| matches!(f, Flag::Pie));
  let last_no_pie = flags.iter().rposition(|f| matches!(f, Flag::NoPie));

  match (last_pie, last_no_pie) {
    (Some(pie), Some(no_pie)) if no_pie > pie => flags.retain(|f| !matches!(f, Flag::Pie)),
    (Some(_), Some(_)) => flags.retain(|f| !matches!(f, Flag::NoPie)),
    _ => {},
  }
}

/// Drop structurally equal duplicate flags, keeping the first
/// occurrence. Position-sensitive flags are never deduplicated.
fn dedup_flags(flags: Vec<Flag>) -> Vec<Flag> {
  let mut result: Vec<Flag> = Vec::new();

  for flag in flags {
    if flag.is_positional() || !result.contains(&flag) {
      result.push(flag);
    }
  }

  result
}
