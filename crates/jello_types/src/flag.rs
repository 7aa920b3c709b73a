//! The closed algebra of linker flags the driver understands.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::input::LibRef;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Flag {
  Output(PathBuf),
  SearchPath(PathBuf),
  LinkLib(LibRef),
  Sysroot(String),
  DynamicLinker(String),
  Rpath(String),
  RpathLink(String),
  WholeArchive,
  NoWholeArchive,
  StartGroup,
  EndGroup,
  AsNeeded,
  NoAsNeeded,
  Bstatic,
  Bdynamic,
  PushState,
  PopState,
  GcSections,
  NoGcSections,
  Icf(String),
  ExportDynamic,
  Pie,
  NoPie,
  Shared,
  Static,
  Nostdlib,
  Nostartfiles,
  Nodefaultlibs,
  Stdlib(String),
  Target(String),
  TargetArch(String),
  M32,
  M64,
  Lto(Option<String>),
  UseLinker(String),
  ZKeyword(String),
  Soname(String),
  VersionScript(PathBuf),
  LinkerScript(PathBuf),
  MapFile(PathBuf),
  Verbose,
  Trace,
  PrintMap,
  DebugInfo(String),
  StripAll,
  StripDebug,
  /// Unknown flags are preserved verbatim.
  Passthrough(String),
}

impl Flag {
  /// Position-sensitive flags act on the inputs that follow them and are
  /// therefore never deduplicated.
  pub fn is_positional(&self) -> bool {
    matches!(
      self,
      Flag::Bstatic
        | Flag::Bdynamic
        | Flag::WholeArchive
        | Flag::NoWholeArchive
        | Flag::PushState
        | Flag::PopState
        | Flag::StartGroup
        | Flag::EndGroup
    )
  }

  /// Render the canonical textual form of this flag as backend argv tokens.
  pub fn render(&self) -> Vec<String> {
    match self {
      Flag::Output(p) => vec!["-o".into(), p.display().to_string()],
      Flag::SearchPath(p) => vec!["-L".into(), p.display().to_string()],
      Flag::LinkLib(LibRef::Named(n)) => vec![format!("-l{}", n)],
      Flag::LinkLib(LibRef::Path(p)) => vec![p.display().to_string()],
      Flag::LinkLib(LibRef::Framework(f)) => vec!["-framework".into(), f.clone()],
      Flag::Sysroot(s) => vec![format!("--sysroot={}", s)],
      Flag::DynamicLinker(d) => vec!["--dynamic-linker".into(), d.clone()],
      Flag::Rpath(p) => vec!["-rpath".into(), p.clone()],
      Flag::RpathLink(p) => vec!["--rpath-link".into(), p.clone()],
      Flag::WholeArchive => vec!["--whole-archive".into()],
      Flag::NoWholeArchive => vec!["--no-whole-archive".into()],
      Flag::StartGroup => vec!["--start-group".into()],
      Flag::EndGroup => vec!["--end-group".into()],
      Flag::AsNeeded => vec!["--as-needed".into()],
      Flag::NoAsNeeded => vec!["--no-as-needed".into()],
      Flag::Bstatic => vec!["-Bstatic".into()],
      Flag::Bdynamic => vec!["-Bdynamic".into()],
      Flag::PushState => vec!["--push-state".into()],
      Flag::PopState => vec!["--pop-state".into()],
      Flag::GcSections => vec!["--gc-sections".into()],
      Flag::NoGcSections => vec!["--no-gc-sections".into()],
      Flag::Icf(level) => vec![format!("--icf={}", level)],
      Flag::ExportDynamic => vec!["--export-dynamic".into()],
      Flag::Pie => vec!["-pie".into()],
      Flag::NoPie => vec!["-no-pie".into()],
      Flag::Shared => vec!["-shared".into()],
      Flag::Static => vec!["-static".into()],
      Flag::Nostdlib => vec!["-nostdlib".into()],
      Flag::Nostartfiles => vec!["-nostartfiles".into()],
      Flag::Nodefaultlibs => vec!["-nodefaultlibs".into()],
      Flag::Stdlib(v) => vec![format!("-stdlib={}", v)],
      Flag::Target(t) => vec![format!("--target={}", t)],
      Flag::TargetArch(a) => vec!["-arch".into(), a.clone()],
      Flag::M32 => vec!["-m32".into()],
      Flag::M64 => vec!["-m64".into()],
      Flag::Lto(None) => vec!["-flto".into()],
      Flag::Lto(Some(v)) => vec![format!("-flto={}", v)],
      Flag::UseLinker(l) => vec![format!("-fuse-ld={}", l)],
      Flag::ZKeyword(v) => vec!["-z".into(), v.clone()],
      Flag::Soname(v) => vec!["-soname".into(), v.clone()],
      Flag::VersionScript(p) => vec!["--version-script".into(), p.display().to_string()],
      Flag::LinkerScript(p) => vec!["-T".into(), p.display().to_string()],
      Flag::MapFile(p) => vec![format!("-Map={}", p.display())],
      Flag::Verbose => vec!["--verbose".into()],
      Flag::Trace => vec!["--trace".into()],
      Flag::PrintMap => vec!["--print-map".into()],
      Flag::DebugInfo(raw) => vec![raw.clone()],
      Flag::StripAll => vec!["--strip-all".into()],
      Flag::StripDebug => vec!["--strip-debug".into()],
      Flag::Passthrough(s) => vec![s.clone()],
    }
  }
}
