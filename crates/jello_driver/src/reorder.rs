//! Static-archive reordering by symbol dependencies.
//!
//! An edge `A -> B` means archive A requires a symbol that archive B
//! defines, so B must appear after A on the link line. Acyclic graphs
//! are topologically sorted; cycles keep the original order and produce
//! a single group-wrapping fix.

use std::collections::{BTreeMap, BTreeSet};
use std::path::{Path, PathBuf};

use jello_config::JelloConfig;
use jello_diagnostics::{Confidence, Fix, FixAction};
use jello_log::log_dbg;
use jello_types::Symbol;

use crate::symbols;

#[derive(Debug, Clone, PartialEq)]
pub struct ReorderOutcome {
  pub order: Vec<PathBuf>,
  pub fixes: Vec<Fix>,
}

impl ReorderOutcome {
  pub fn unchanged(archives: &[PathBuf]) -> Self {
    Self {
      order: archives.to_vec(),
      fixes: Vec::new(),
    }
  }
}

/// Reorder static archives by extracting their symbol tables. Archives
/// whose symbols cannot be read are kept in place with no edges; if
/// none are readable the input order is returned untouched.
pub fn reorder_archives(
  config: &JelloConfig,
  nm: &Path,
  archives: &[PathBuf],
) -> ReorderOutcome {
  if archives.len() < 2 {
    return ReorderOutcome::unchanged(archives);
  }

  let mut tables: BTreeMap<PathBuf, Vec<Symbol>> = BTreeMap::new();
  let mut readable = 0usize;

  for path in archives {
    match symbols::extract(nm, path) {
      Ok(syms) => {
        readable += 1;
        tables.insert(path.clone(), syms);
      },
      Err(error) => {
        log_dbg!(config, "skipping unreadable archive {}: {}", path.display(), error);
        tables.insert(path.clone(), Vec::new());
      },
    }
  }

  if readable == 0 {
    log_dbg!(config, "symbol extraction failed for all archives; keeping original order");
    return ReorderOutcome::unchanged(archives);
  }

  let providers = symbols::providers(&tables);
  let requirements = symbols::requirements(&tables);
  let edges = build_edges(archives, &providers, &requirements);

  sort_archives(archives, &edges)
}

/// Build the dependency edges `A -> B` (A needs a symbol B defines).
pub fn build_edges(
  archives: &[PathBuf],
  providers: &BTreeMap<String, BTreeSet<PathBuf>>,
  requirements: &BTreeMap<PathBuf, Vec<String>>,
) -> BTreeMap<PathBuf, Vec<PathBuf>> {
  let mut edges: BTreeMap<PathBuf, Vec<PathBuf>> = BTreeMap::new();

  for archive in archives {
    let deps = edges.entry(archive.clone()).or_default();

    let Some(needs) = requirements.get(archive) else {
      continue;
    };

    for symbol in needs {
      let Some(defining) = providers.get(symbol) else {
        continue;
      };

      for provider in defining {
        if provider != archive && !deps.contains(provider) {
          deps.push(provider.clone());
        }
      }
    }
  }

  edges
}

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
enum Mark {
  White,
  Gray,
  Black,
}

/// Depth-first topological sort with gray/black marking. A back edge
/// records every node on the current DFS stack as a cycle member;
/// multiple disjoint cycles accumulate into one member set.
pub fn sort_archives(
  archives: &[PathBuf],
  edges: &BTreeMap<PathBuf, Vec<PathBuf>>,
) -> ReorderOutcome {
  let mut marks: BTreeMap<PathBuf, Mark> = archives.iter().map(|a| (a.clone(), Mark::White)).collect();
  let mut stack: Vec<PathBuf> = Vec::new();
  let mut post: Vec<PathBuf> = Vec::new();
  let mut cycle: BTreeSet<PathBuf> = BTreeSet::new();

  // Seed in reverse input order so independent archives keep their
  // command-line order after the final reversal.
  for archive in archives.iter().rev() {
    visit(archive, edges, &mut marks, &mut stack, &mut post, &mut cycle);
  }

  if cycle.is_empty() {
    post.reverse();
    return ReorderOutcome {
      order: post,
      fixes: Vec::new(),
    };
  }

  let members: Vec<PathBuf> = archives.iter().filter(|a| cycle.contains(*a)).cloned().collect();
  let names: Vec<String> = members.iter().map(|p| basename(p)).collect();

  let fix = Fix::new(
    format!(
      "wrap {} in --start-group/--end-group to resolve the circular dependency",
      names.join(", ")
    ),
    Confidence::High,
    FixAction::AddGroup(members),
  );

  ReorderOutcome {
    order: archives.to_vec(),
    fixes: vec![fix],
  }
}

fn visit(
  node: &PathBuf,
  edges: &BTreeMap<PathBuf, Vec<PathBuf>>,
  marks: &mut BTreeMap<PathBuf, Mark>,
  stack: &mut Vec<PathBuf>,
  post: &mut Vec<PathBuf>,
  cycle: &mut BTreeSet<PathBuf>,
) {
  match marks.get(node) {
    Some(Mark::Black) => return,
    Some(Mark::Gray) => {
      for member in stack.iter() {
        cycle.insert(member.clone());
      }
      return;
    },
    Some(Mark::White) => {},
    // Edges may point at paths outside the archive set; ignore them.
    None => return,
  }

  marks.insert(node.clone(), Mark::Gray);
  stack.push(node.clone());

  if let Some(deps) = edges.get(node) {
    for dep in deps {
      visit(dep, edges, marks, stack, post, cycle);
    }
  }

  stack.pop();
  marks.insert(node.clone(), Mark::Black);
  post.push(node.clone());
}

fn basename(path: &Path) -> String {
  path
    .file_name()
    .map(|n| n.to_string_lossy().into_owned())
    .unwrap_or_else(|| path.display().to_string())
}
