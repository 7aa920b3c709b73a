//! LinkPlan construction and deterministic backend argument rendering.
//!
//! The plan is immutable once built: execution and emission take it by
//! shared reference and never change it. `backend_args` is a pure
//! function of the other fields, so identical plans always render the
//! same argument vector.

use std::collections::BTreeSet;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use jello_diagnostics::{Diagnostic, Fix, FixAction};
use jello_types::{Backend, Flag, Input, Invocation, LibKind, LibRef, LinkMode, ResolvedLib, Triple};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LinkPlan {
  pub backend: Backend,
  pub backend_path: PathBuf,
  pub triple: Triple,
  pub link_mode: LinkMode,
  pub output: PathBuf,
  pub inputs: Vec<Input>,
  pub flags: Vec<Flag>,
  pub search_paths: Vec<PathBuf>,
  pub resolved_libs: Vec<ResolvedLib>,
  pub sysroot: Option<String>,
  pub dynamic_linker: Option<String>,
  pub fixes_applied: Vec<Fix>,
  pub diagnostics: Vec<Diagnostic>,
  pub raw_args: Vec<String>,
  pub backend_args: Vec<String>,
}

impl LinkPlan {
  /// Assemble a plan. `archive_order` is the reordered static-archive
  /// sequence from the reorder phase, covering both positional archive
  /// inputs and resolved static named libraries; an empty slice keeps
  /// every library at its original position.
  pub fn build(
    inv: &Invocation,
    triple: Triple,
    backend: Backend,
    backend_path: PathBuf,
    resolved_libs: Vec<ResolvedLib>,
    search_paths: Vec<PathBuf>,
    archive_order: &[PathBuf],
    fixes_applied: Vec<Fix>,
    diagnostics: Vec<Diagnostic>,
  ) -> LinkPlan {
    let output = inv.output.clone().unwrap_or_else(|| PathBuf::from("a.out"));

    let sysroot = inv.flags.iter().find_map(|f| match f {
      Flag::Sysroot(s) => Some(s.clone()),
      _ => None,
    });

    let dynamic_linker = inv.flags.iter().find_map(|f| match f {
      Flag::DynamicLinker(d) => Some(d.clone()),
      _ => None,
    });

    let backend_args = render_backend_args(
      inv,
      &output,
      &search_paths,
      sysroot.as_deref(),
      dynamic_linker.as_deref(),
      &resolved_libs,
      archive_order,
      &fixes_applied,
    );

    LinkPlan {
      backend,
      backend_path,
      triple,
      link_mode: inv.link_mode,
      output,
      inputs: inv.inputs.clone(),
      flags: inv.flags.clone(),
      search_paths,
      resolved_libs,
      sysroot,
      dynamic_linker,
      fixes_applied,
      diagnostics,
      raw_args: inv.raw_args.clone(),
      backend_args,
    }
  }
}

/// Flags re-emitted verbatim in the flag section. Everything already
/// covered by the canonical sections (output, search paths, link mode,
/// sysroot, dynamic linker) and every compiler-driver-only flag is
/// excluded.
fn rendered_in_flag_section(flag: &Flag) -> bool {
  !matches!(
    flag,
    Flag::Output(_)
      | Flag::SearchPath(_)
      | Flag::Shared
      | Flag::Pie
      | Flag::NoPie
      | Flag::Static
      | Flag::Sysroot(_)
      | Flag::DynamicLinker(_)
      | Flag::UseLinker(_)
      | Flag::Target(_)
      | Flag::TargetArch(_)
      | Flag::M32
      | Flag::M64
      | Flag::Lto(_)
      | Flag::Nostdlib
      | Flag::Nostartfiles
      | Flag::Nodefaultlibs
      | Flag::Stdlib(_)
      | Flag::DebugInfo(_)
  )
}

fn render_backend_args(
  inv: &Invocation,
  output: &PathBuf,
  search_paths: &[PathBuf],
  sysroot: Option<&str>,
  dynamic_linker: Option<&str>,
  resolved_libs: &[ResolvedLib],
  archive_order: &[PathBuf],
  fixes_applied: &[Fix],
) -> Vec<String> {
  let mut args = vec!["-o".to_string(), output.display().to_string()];

  match inv.link_mode {
    LinkMode::Shared => args.push("-shared".to_string()),
    LinkMode::Pie => args.push("-pie".to_string()),
    LinkMode::Static => args.push("-static".to_string()),
    LinkMode::Relocatable => args.push("-r".to_string()),
    LinkMode::Executable => {},
  }

  for path in search_paths {
    args.push("-L".to_string());
    args.push(path.display().to_string());
  }

  if let Some(sysroot) = sysroot {
    args.push(format!("--sysroot={}", sysroot));
  }

  if let Some(dl) = dynamic_linker {
    args.push("--dynamic-linker".to_string());
    args.push(dl.to_string());
  }

  // Applied group fixes wrap the cyclic members wherever they sit on
  // the link line: positional archives in the input section, resolved
  // static named libraries at their -l/-framework flag positions.
  let group: BTreeSet<PathBuf> = fixes_applied
    .iter()
    .filter_map(|fix| match &fix.action {
      FixAction::AddGroup(members) => Some(members.iter()),
      _ => None,
    })
    .flatten()
    .cloned()
    .collect();

  // The reordered sequence splits by emission site: paths that are
  // positional archive inputs re-emit at input positions, everything
  // else re-emits through library flags.
  let input_archives: BTreeSet<&PathBuf> = inv
    .inputs
    .iter()
    .filter_map(|input| match input {
      Input::Archive(path) => Some(path),
      _ => None,
    })
    .collect();

  let mut archive_seq = archive_order.iter().filter(|p| input_archives.contains(p));
  let mut named_seq = archive_order.iter().filter(|p| !input_archives.contains(p));

  // Each unit is (tokens, group member). Flags render before inputs,
  // so member positions across both sections decide where the group
  // markers land.
  let mut emit_lib = |reference: &LibRef| -> (Vec<String>, bool) {
    let lib = resolved_for(resolved_libs, reference);

    if lib.is_some_and(|l| l.kind == LibKind::Static)
      && let Some(path) = named_seq.next()
    {
      let emitted = resolved_at(resolved_libs, path)
        .map(|l| l.reference.clone())
        .unwrap_or_else(|| reference.clone());
      return (Flag::LinkLib(emitted).render(), group.contains(path));
    }

    let member = lib.is_some_and(|l| group.contains(&l.path));
    (Flag::LinkLib(reference.clone()).render(), member)
  };

  let mut units: Vec<(Vec<String>, bool)> = Vec::new();

  for flag in &inv.flags {
    if !rendered_in_flag_section(flag) {
      continue;
    }

    match flag {
      Flag::LinkLib(reference) => units.push(emit_lib(reference)),
      _ => units.push((flag.render(), false)),
    }
  }

  for input in &inv.inputs {
    match input {
      Input::Archive(path) => {
        let emitted = archive_seq.next().unwrap_or(path);
        units.push((vec![emitted.display().to_string()], group.contains(emitted.as_path())));
      },
      Input::Object(path)
      | Input::SharedObject(path)
      | Input::LinkerScript(path)
      | Input::RawInput(path) => units.push((vec![path.display().to_string()], false)),
      Input::ResponseFile(path) => units.push((vec![format!("@{}", path.display())], false)),
      Input::Lib(reference) => units.push(emit_lib(reference)),
    }
  }

  let first_member = units.iter().position(|(_, member)| *member);
  let last_member = units.iter().rposition(|(_, member)| *member);

  for (index, (tokens, _)) in units.into_iter().enumerate() {
    if first_member == Some(index) {
      args.push("--start-group".to_string());
    }

    args.extend(tokens);

    if last_member == Some(index) {
      args.push("--end-group".to_string());
    }
  }

  args
}

fn resolved_for<'a>(
  libs: &'a [ResolvedLib],
  reference: &LibRef,
) -> Option<&'a ResolvedLib> {
  libs.iter().find(|lib| &lib.reference == reference)
}

fn resolved_at<'a>(
  libs: &'a [ResolvedLib],
  path: &Path,
) -> Option<&'a ResolvedLib> {
  libs.iter().find(|lib| lib.path.as_path() == path)
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::normalize::normalize;
  use crate::parse::parse_args;
  use jello_diagnostics::Confidence;
  use jello_types::{Arch, EnvAbi, Os};

  fn args(list: &[&str]) -> Vec<String> {
    list.iter().map(|s| s.to_string()).collect()
  }

  fn test_triple() -> Triple {
    Triple {
      arch: Arch::X86_64,
      vendor: Some("unknown".to_string()),
      os: Os::Linux,
      env: Some(EnvAbi::Gnu),
    }
  }

  fn static_lib(
    name: &str,
    path: &str,
  ) -> ResolvedLib {
    ResolvedLib {
      reference: LibRef::Named(name.to_string()),
      path: PathBuf::from(path),
      kind: LibKind::Static,
      detected_arch: None,
    }
  }

  fn group_fix(members: &[&str]) -> Fix {
    Fix::new(
      "wrap the cyclic libraries in --start-group/--end-group",
      Confidence::High,
      FixAction::AddGroup(members.iter().map(|m| PathBuf::from(*m)).collect()),
    )
  }

  fn plan_for(argv: &[&str]) -> LinkPlan {
    let inv = normalize(parse_args(&args(argv)).unwrap()).unwrap();

    LinkPlan::build(
      &inv,
      test_triple(),
      Backend::Mold,
      PathBuf::from("/usr/bin/mold"),
      Vec::new(),
      vec![PathBuf::from("/usr/lib")],
      &[],
      Vec::new(),
      Vec::new(),
    )
  }

  #[test]
  fn test_canonical_arg_order() {
    let plan = plan_for(&["foo.o", "-o", "app", "-lm", "--as-needed"]);

    assert_eq!(
      plan.backend_args,
      vec!["-o", "app", "-L", "/usr/lib", "-lm", "--as-needed", "foo.o"]
    );
  }

  #[test]
  fn test_link_mode_rendering() {
    assert!(plan_for(&["-shared", "foo.o"]).backend_args.contains(&"-shared".to_string()));
    assert!(plan_for(&["-pie", "foo.o"]).backend_args.contains(&"-pie".to_string()));
    assert!(plan_for(&["-r", "foo.o"]).backend_args.contains(&"-r".to_string()));
    assert!(!plan_for(&["foo.o"]).backend_args.contains(&"-static".to_string()));
  }

  #[test]
  fn test_default_output() {
    let plan = plan_for(&["foo.o"]);

    assert_eq!(plan.output, PathBuf::from("a.out"));
    assert_eq!(&plan.backend_args[..2], &["-o".to_string(), "a.out".to_string()]);
  }

  #[test]
  fn test_sysroot_and_dynamic_linker_extracted() {
    let plan = plan_for(&["--sysroot=/opt/sdk", "--dynamic-linker", "/lib/ld-linux.so.2", "foo.o"]);

    assert_eq!(plan.sysroot, Some("/opt/sdk".to_string()));
    assert_eq!(plan.dynamic_linker, Some("/lib/ld-linux.so.2".to_string()));
    assert!(plan.backend_args.contains(&"--sysroot=/opt/sdk".to_string()));

    // Not re-emitted in the flag section.
    let sysroot_count = plan.backend_args.iter().filter(|a| a.contains("--sysroot")).count();
    assert_eq!(sysroot_count, 1);
  }

  #[test]
  fn test_compiler_only_flags_not_rendered() {
    let plan = plan_for(&["-fuse-ld=mold", "-flto", "-m64", "foo.o", "-g"]);

    assert!(!plan.backend_args.iter().any(|a| a.contains("fuse-ld")));
    assert!(!plan.backend_args.contains(&"-flto".to_string()));
    assert!(!plan.backend_args.contains(&"-m64".to_string()));
    assert!(!plan.backend_args.contains(&"-g".to_string()));
  }

  #[test]
  fn test_rendering_is_deterministic() {
    let a = plan_for(&["foo.o", "bar.o", "-lm", "-L/x", "-o", "app"]);
    let b = plan_for(&["foo.o", "bar.o", "-lm", "-L/x", "-o", "app"]);

    assert_eq!(a.backend_args, b.backend_args);
    assert_eq!(a, b);
  }

  #[test]
  fn test_group_fix_wraps_archives() {
    let inv = normalize(parse_args(&args(&["main.o", "libA.a", "libB.a", "-o", "app"])).unwrap()).unwrap();

    let plan = LinkPlan::build(
      &inv,
      test_triple(),
      Backend::Mold,
      PathBuf::from("/usr/bin/mold"),
      Vec::new(),
      Vec::new(),
      &[],
      vec![group_fix(&["libA.a", "libB.a"])],
      Vec::new(),
    );

    assert_eq!(
      plan.backend_args,
      vec!["-o", "app", "main.o", "--start-group", "libA.a", "libB.a", "--end-group"]
    );
  }

  #[test]
  fn test_group_fix_wraps_named_static_libs() {
    let inv = normalize(parse_args(&args(&["-lA", "-lB", "main.o", "-o", "app"])).unwrap()).unwrap();

    let resolved = vec![static_lib("A", "/libs/libA.a"), static_lib("B", "/libs/libB.a")];

    let plan = LinkPlan::build(
      &inv,
      test_triple(),
      Backend::Mold,
      PathBuf::from("/usr/bin/mold"),
      resolved,
      Vec::new(),
      &[PathBuf::from("/libs/libA.a"), PathBuf::from("/libs/libB.a")],
      vec![group_fix(&["/libs/libA.a", "/libs/libB.a"])],
      Vec::new(),
    );

    assert_eq!(
      plan.backend_args,
      vec!["-o", "app", "--start-group", "-lA", "-lB", "--end-group", "main.o"]
    );
  }

  #[test]
  fn test_group_fix_spans_flags_and_inputs() {
    let inv = normalize(parse_args(&args(&["-lA", "libB.a", "-o", "app"])).unwrap()).unwrap();

    let resolved = vec![static_lib("A", "/libs/libA.a")];

    let plan = LinkPlan::build(
      &inv,
      test_triple(),
      Backend::Mold,
      PathBuf::from("/usr/bin/mold"),
      resolved,
      Vec::new(),
      &[PathBuf::from("libB.a"), PathBuf::from("/libs/libA.a")],
      vec![group_fix(&["/libs/libA.a", "libB.a"])],
      Vec::new(),
    );

    assert_eq!(
      plan.backend_args,
      vec!["-o", "app", "--start-group", "-lA", "libB.a", "--end-group"]
    );
  }

  #[test]
  fn test_archive_order_applied() {
    let inv = normalize(parse_args(&args(&["libmain.a", "libutil.a", "-o", "app"])).unwrap()).unwrap();

    let plan = LinkPlan::build(
      &inv,
      test_triple(),
      Backend::Mold,
      PathBuf::from("/usr/bin/mold"),
      Vec::new(),
      Vec::new(),
      &[PathBuf::from("libutil.a"), PathBuf::from("libmain.a")],
      Vec::new(),
      Vec::new(),
    );

    assert_eq!(plan.backend_args, vec!["-o", "app", "libutil.a", "libmain.a"]);
  }

  #[test]
  fn test_named_static_libs_follow_archive_order() {
    // The invocation names util before main, but main depends on util,
    // so the reordered sequence emits -lmain first.
    let inv = normalize(parse_args(&args(&["-lutil", "-lmain", "main.o", "-o", "app"])).unwrap()).unwrap();

    let resolved = vec![
      static_lib("util", "/libs/libutil.a"),
      static_lib("main", "/libs/libmain.a"),
    ];

    let plan = LinkPlan::build(
      &inv,
      test_triple(),
      Backend::Mold,
      PathBuf::from("/usr/bin/mold"),
      resolved,
      Vec::new(),
      &[PathBuf::from("/libs/libmain.a"), PathBuf::from("/libs/libutil.a")],
      Vec::new(),
      Vec::new(),
    );

    assert_eq!(plan.backend_args, vec!["-o", "app", "-lmain", "-lutil", "main.o"]);
  }

  #[test]
  fn test_shared_named_libs_keep_their_position() {
    let inv = normalize(parse_args(&args(&["-lA", "-lz", "main.o", "-o", "app"])).unwrap()).unwrap();

    let resolved = vec![
      static_lib("A", "/libs/libA.a"),
      ResolvedLib {
        reference: LibRef::Named("z".to_string()),
        path: PathBuf::from("/usr/lib/libz.so"),
        kind: LibKind::Shared,
        detected_arch: None,
      },
    ];

    let plan = LinkPlan::build(
      &inv,
      test_triple(),
      Backend::Mold,
      PathBuf::from("/usr/bin/mold"),
      resolved,
      Vec::new(),
      &[PathBuf::from("/libs/libA.a")],
      Vec::new(),
      Vec::new(),
    );

    assert_eq!(plan.backend_args, vec!["-o", "app", "-lA", "-lz", "main.o"]);
  }

  #[test]
  fn test_json_round_trip_is_byte_identical() {
    let plan = plan_for(&["foo.o", "-o", "app", "-lm", "--as-needed", "-L/x"]);

    let json = serde_json::to_string_pretty(&plan).unwrap();
    let reparsed: LinkPlan = serde_json::from_str(&json).unwrap();
    let rejson = serde_json::to_string_pretty(&reparsed).unwrap();

    assert_eq!(plan, reparsed);
    assert_eq!(json, rejson);
  }
}
