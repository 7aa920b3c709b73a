//! Pipeline orchestration: the nine phases from raw argv to an
//! executed, diagnosed link.

use std::path::PathBuf;

use colored::*;

use jello_config::{FixMode, JelloConfig};
use jello_diagnostics::{Confidence, Diagnostic, Severity};
use jello_log::{log_dbg, log_warn, phase_log, phase_warn};
use jello_types::{Flag, Input, LibKind, LinkError};

use crate::discovery::{self, Lang};
use crate::execute::{self, ExecResult};
use crate::normalize;
use crate::parse;
use crate::plan::LinkPlan;
use crate::reorder::{self, ReorderOutcome};
use crate::resolve;

/// Run a link invocation end to end and return the process exit code.
///
/// Compile-only invocations bridge straight into passthrough: there is
/// nothing to link, so the real compiler handles them untouched.
pub fn run(
  config: &JelloConfig,
  args: &[String],
) -> Result<i32, LinkError> {
  if parse::is_compile_only(args) {
    log_dbg!(config, "compile-only invocation, forwarding to the real compiler");
    return run_passthrough(config, Lang::C, args);
  }

  let result = run_link(config, args)?;
  Ok(effective_exit_code(config, &result))
}

/// Forward an invocation verbatim to a discovered real compiler.
pub fn run_passthrough(
  config: &JelloConfig,
  lang: Lang,
  args: &[String],
) -> Result<i32, LinkError> {
  let compiler = discovery::find_real_compiler(lang)
    .ok_or_else(|| LinkError::Discovery("no real compiler found on PATH".to_string()))?;

  log_dbg!(config, "passthrough to {}", compiler.display());

  execute::run_cmd(&compiler, args)
}

/// Phases 1-7: parse, normalize, discover, resolve, reorder, plan.
pub fn build_plan(
  config: &JelloConfig,
  args: &[String],
) -> Result<LinkPlan, LinkError> {
  phase_log!(config, "Parsing {} arguments", args.len());
  let inv = parse::parse_args(args)?;
  let inv = normalize::normalize(inv)?;

  let compiler = discovery::find_compiler(Lang::C);
  let triple = discovery::detect_triple(compiler.as_deref());
  log_dbg!(config, "target triple {}", triple);

  let preferred = inv.flags.iter().find_map(|f| match f {
    Flag::UseLinker(name) => Some(name.clone()),
    _ => None,
  });

  let (backend, backend_path) = discovery::find_backend(config.backend, preferred.as_deref(), &config.backend_preference)?;
  phase_log!(config, "Selected backend {} at {}", backend, backend_path.display());

  // Resolution failures are downgraded: the backend re-reports missing
  // libraries with better context.
  let system_paths = discovery::system_search_paths();
  let mut explicit = config.search_paths.clone();
  explicit.extend(inv.explicit_search_paths.iter().cloned());
  let search_paths = resolve::search_paths(&explicit, &system_paths);

  let refs = resolve::collect_lib_refs(&inv);
  let prefer_static = resolve::static_preference(&inv);

  let resolved = match resolve::resolve_refs(&refs, &search_paths, prefer_static) {
    Ok(resolved) => resolved,
    Err(error) => {
      log_warn!(config, "library resolution incomplete: {}", error);
      Vec::new()
    },
  };
  phase_log!(config, "Resolved {} of {} libraries", resolved.len(), refs.len());

  let mut archives: Vec<PathBuf> = inv
    .inputs
    .iter()
    .filter_map(|input| match input {
      Input::Archive(path) => Some(path.clone()),
      _ => None,
    })
    .collect();

  for lib in &resolved {
    if lib.kind == LibKind::Static && !archives.contains(&lib.path) {
      archives.push(lib.path.clone());
    }
  }

  // The reordered sequence covers positional archives and resolved
  // static named libraries alike; rendering re-emits each at its own
  // section of the link line.
  let ReorderOutcome {
    order: archive_order,
    fixes,
  } = match discovery::find_nm(config.nm.as_deref()) {
    Ok(nm) => reorder::reorder_archives(config, &nm, &archives),
    Err(error) => {
      log_dbg!(config, "nm unavailable, keeping archive order: {}", error);
      ReorderOutcome::unchanged(&archives)
    },
  };

  let fixes_applied = match config.fix_mode {
    FixMode::Auto => fixes,
    _ => {
      for fix in &fixes {
        phase_warn!(config, "suggested fix: {}", fix.description);
      }
      Vec::new()
    },
  };

  let pre_diagnostics = arch_mismatch_diagnostics(&resolved, &triple);

  Ok(LinkPlan::build(
    &inv,
    triple,
    backend,
    backend_path,
    resolved,
    search_paths,
    &archive_order,
    fixes_applied,
    pre_diagnostics,
  ))
}

/// Advisory warnings for libraries whose detected architecture differs
/// from the link target.
fn arch_mismatch_diagnostics(
  resolved: &[jello_types::ResolvedLib],
  triple: &jello_types::Triple,
) -> Vec<Diagnostic> {
  let mut diagnostics = Vec::new();

  for lib in resolved {
    if let Some(arch) = lib.detected_arch
      && arch != triple.arch
    {
      diagnostics.push(
        Diagnostic::new(
          Severity::Warning,
          "E005",
          format!(
            "{} targets {} but the link targets {}",
            lib.path.display(),
            arch,
            triple.arch
          ),
        )
        .with_evidence(lib.path.display().to_string()),
      );
    }
  }

  jello_diagnostics::dedup(diagnostics)
}

/// Phases 1-9 plus execution and diagnosis.
pub fn run_link(
  config: &JelloConfig,
  args: &[String],
) -> Result<ExecResult, LinkError> {
  let plan = build_plan(config, args)?;

  if config.explain {
    write_explain(&plan);
  }

  if config.emit_plan {
    if let Err(error) = crate::emit::write_artifacts(&config.plan_dir, &plan, &plan.diagnostics) {
      log_warn!(config, "failed to write plan artifacts: {}", error);
    }
  }

  if config.dry_run {
    println!("{}", execute::dry_run(&plan));
    return Ok(ExecResult {
      plan,
      exit_code: 0,
      stdout: String::new(),
      stderr: String::new(),
      post_diagnostics: Vec::new(),
    });
  }

  phase_log!(config, "Executing {}", plan.backend_path.display());
  let result = execute::run(&plan)?;

  let result = if result.exit_code != 0 {
    let combined = format!("{}\n{}", result.stderr, result.stdout);
    let diagnostics = jello_diagnostics::classify(&combined);
    result.with_post_diagnostics(diagnostics)
  } else {
    result
  };

  if !config.silent {
    print_diagnostics(&result.post_diagnostics);

    if config.fix_mode == FixMode::Auto {
      for diag in jello_diagnostics::auto_fixable(&result.post_diagnostics) {
        for fix in diag.fixes.iter().filter(|f| f.confidence == Confidence::High) {
          phase_warn!(config, "auto-fix available for {}: {}", diag.code, fix.description);
        }
      }
    }
  }

  Ok(result)
}

/// The exit code the driver process should report. Strict mode turns
/// error diagnostics into failure even when the backend succeeded.
pub fn effective_exit_code(
  config: &JelloConfig,
  result: &ExecResult,
) -> i32 {
  if config.fix_mode == FixMode::Strict && result.exit_code == 0 {
    let has_error = result
      .post_diagnostics
      .iter()
      .chain(result.plan.diagnostics.iter())
      .any(|d| d.severity == Severity::Error);

    if has_error {
      return 1;
    }
  }

  result.exit_code
}

/// Print structured diagnostics to stderr with styled severities.
pub fn print_diagnostics(diagnostics: &[Diagnostic]) {
  for diag in diagnostics {
    let prefix = match diag.severity {
      Severity::Error => "Error:".red().bold(),
      Severity::Warning => "Warning:".yellow().bold(),
      Severity::Info => "Info:".cyan().bold(),
      Severity::Hint => "Hint:".green().bold(),
    };

    eprintln!("{} [{}] {}", prefix, diag.code, diag.message);

    for fix in &diag.fixes {
      eprintln!("  fix ({}): {}", confidence_label(fix.confidence), fix.description);
    }
  }
}

fn confidence_label(confidence: Confidence) -> &'static str {
  match confidence {
    Confidence::High => "high",
    Confidence::Medium => "medium",
    Confidence::Low => "low",
  }
}

/// Human-readable reasoning trace, written to stderr.
fn write_explain(plan: &LinkPlan) {
  eprintln!("{} link plan", "\u{2022}".bright_cyan().bold());
  eprintln!("  backend: {} ({})", plan.backend, plan.backend_path.display());
  eprintln!("  target: {}", plan.triple);
  eprintln!("  mode: {}", plan.link_mode);
  eprintln!("  output: {}", plan.output.display());

  if !plan.search_paths.is_empty() {
    eprintln!("{} search paths", "\u{2022}".bright_cyan().bold());
    for path in &plan.search_paths {
      eprintln!("  {}", path.display());
    }
  }

  if !plan.resolved_libs.is_empty() {
    eprintln!("{} resolved libraries", "\u{2022}".bright_cyan().bold());
    for lib in &plan.resolved_libs {
      let kind = match lib.kind {
        LibKind::Static => "static",
        LibKind::Shared => "shared",
      };
      eprintln!("  {} ({})", lib.path.display(), kind);
    }
  }

  if !plan.fixes_applied.is_empty() {
    eprintln!("{} fixes applied", "\u{2022}".bright_cyan().bold());
    for fix in &plan.fixes_applied {
      eprintln!("  {}", fix.description);
    }
  }

  eprintln!("{} command", "\u{2022}".bright_cyan().bold());
  eprintln!("  {}", execute::dry_run(plan));
}

#[cfg(test)]
mod tests {
  use super::*;
  use jello_types::{Arch, Backend, EnvAbi, Invocation, Os, Triple};

  fn minimal_result(
    exit_code: i32,
    diagnostics: Vec<Diagnostic>,
  ) -> ExecResult {
    let plan = LinkPlan::build(
      &Invocation::default(),
      Triple {
        arch: Arch::X86_64,
        vendor: None,
        os: Os::Linux,
        env: Some(EnvAbi::Gnu),
      },
      Backend::System,
      PathBuf::from("/usr/bin/ld"),
      Vec::new(),
      Vec::new(),
      &[],
      Vec::new(),
      Vec::new(),
    );

    ExecResult {
      plan,
      exit_code,
      stdout: String::new(),
      stderr: String::new(),
      post_diagnostics: diagnostics,
    }
  }

  #[test]
  fn test_effective_exit_code_passes_backend_code() {
    let config = JelloConfig::default();

    assert_eq!(effective_exit_code(&config, &minimal_result(0, Vec::new())), 0);
    assert_eq!(effective_exit_code(&config, &minimal_result(7, Vec::new())), 7);
  }

  #[test]
  fn test_strict_mode_fails_on_error_diagnostics() {
    let mut config = JelloConfig::default();
    config.fix_mode = FixMode::Strict;

    let diag = Diagnostic::new(Severity::Error, "E001", "undefined reference");
    assert_eq!(effective_exit_code(&config, &minimal_result(0, vec![diag])), 1);

    let warning = Diagnostic::new(Severity::Warning, "E008", "entry symbol");
    assert_eq!(effective_exit_code(&config, &minimal_result(0, vec![warning])), 0);
  }

  #[test]
  fn test_arch_mismatch_produces_warning() {
    let triple = Triple {
      arch: Arch::X86_64,
      vendor: None,
      os: Os::Linux,
      env: Some(EnvAbi::Gnu),
    };

    let lib = jello_types::ResolvedLib {
      reference: jello_types::LibRef::Named("foo".to_string()),
      path: PathBuf::from("/lib/libfoo.so"),
      kind: LibKind::Shared,
      detected_arch: Some(Arch::Aarch64),
    };

    let diagnostics = arch_mismatch_diagnostics(&[lib], &triple);
    assert_eq!(diagnostics.len(), 1);
    assert_eq!(diagnostics[0].severity, Severity::Warning);
    assert_eq!(diagnostics[0].code, "E005");
  }
}
