//! Toolchain discovery: backends, nm, compilers, search paths, sysroot.
//!
//! Every function here is a lookup over the process environment and the
//! filesystem, plus short synchronous subprocess probes. Nothing in
//! this module mutates state.

use std::ffi::OsStr;
use std::path::{Path, PathBuf};
use std::process::Command;

use jello_types::{Arch, Backend, EnvAbi, LinkError, Os, Triple};

/// Basenames under which the driver itself may be installed. The real
/// compiler lookup filters these out so a `CC=gelcc` installation can
/// never recurse into itself.
pub const WRAPPER_BASENAMES: &[&str] = &["gelcc", "gelc++", "geld", "jello"];

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum Lang {
  C,
  Cxx,
}

impl Lang {
  fn env_var(&self) -> &'static str {
    match self {
      Lang::C => "CC",
      Lang::Cxx => "CXX",
    }
  }

  fn candidates(&self) -> &'static [&'static str] {
    match self {
      Lang::C => &["cc", "gcc", "clang"],
      Lang::Cxx => &["c++", "g++", "clang++"],
    }
  }
}

/// Locate an executable on PATH. Absolute paths are checked directly.
pub fn which(name: &str) -> Option<PathBuf> {
  let as_path = Path::new(name);

  if as_path.is_absolute() {
    return as_path.is_file().then(|| as_path.to_path_buf());
  }

  let path_var = std::env::var("PATH").ok()?;
  let dirs: Vec<PathBuf> = path_var.split(':').filter(|d| !d.is_empty()).map(PathBuf::from).collect();

  which_in(name, &dirs)
}

pub fn which_in(
  name: &str,
  dirs: &[PathBuf],
) -> Option<PathBuf> {
  for dir in dirs {
    let candidate = dir.join(name);
    if candidate.is_file() {
      return Some(candidate);
    }
  }

  None
}

/// Select a backend linker and locate its executable.
///
/// Priority: explicit override, then a `-fuse-ld=` preference, then the
/// configured probe order.
pub fn find_backend(
  override_backend: Option<Backend>,
  preferred: Option<&str>,
  preference: &[Backend],
) -> Result<(Backend, PathBuf), LinkError> {
  if let Some(backend) = override_backend {
    return locate_backend(backend)
      .ok_or_else(|| LinkError::Discovery(format!("requested backend '{}' not found on PATH", backend)));
  }

  if let Some(pref) = preferred {
    if let Some(backend) = Backend::from_str(pref)
      && backend != Backend::System
      && let Some(found) = locate_backend(backend)
    {
      return Ok(found);
    }

    let as_path = Path::new(pref);
    if as_path.is_absolute() && as_path.is_file() {
      return Ok((Backend::System, as_path.to_path_buf()));
    }
  }

  for backend in preference {
    if let Some(found) = locate_backend(*backend) {
      return Ok(found);
    }
  }

  Err(LinkError::Discovery("no linker backend found".to_string()))
}

fn locate_backend(backend: Backend) -> Option<(Backend, PathBuf)> {
  backend
    .candidate_names()
    .iter()
    .find_map(|name| which(name))
    .map(|path| (backend, path))
}

/// Locate the `nm`-equivalent tool.
pub fn find_nm(override_nm: Option<&str>) -> Result<PathBuf, LinkError> {
  if let Some(name) = override_nm
    && let Some(path) = which(name)
  {
    return Ok(path);
  }

  ["llvm-nm", "nm"]
    .iter()
    .find_map(|name| which(name))
    .ok_or_else(|| LinkError::Discovery("no nm tool found on PATH".to_string()))
}

/// Locate a compiler for `lang`, honoring `CC`/`CXX` first.
pub fn find_compiler(lang: Lang) -> Option<PathBuf> {
  if let Ok(value) = std::env::var(lang.env_var())
    && !value.is_empty()
    && let Some(path) = which(value.split_whitespace().next().unwrap_or(value.as_str()))
  {
    return Some(path);
  }

  lang.candidates().iter().find_map(|name| which(name))
}

/// Locate a real compiler, skipping `CC`/`CXX` and any candidate that
/// resolves to the driver's own wrapper names.
pub fn find_real_compiler(lang: Lang) -> Option<PathBuf> {
  lang
    .candidates()
    .iter()
    .filter_map(|name| which(name))
    .find(|path| !is_wrapper(path))
}

fn is_wrapper(path: &Path) -> bool {
  let resolved = std::fs::canonicalize(path).unwrap_or_else(|_| path.to_path_buf());

  for candidate in [path, resolved.as_path()] {
    if let Some(name) = candidate.file_name().and_then(|n| n.to_str())
      && WRAPPER_BASENAMES.contains(&name)
    {
      return true;
    }
  }

  false
}

/// System library search paths, parsed from `ld --verbose` with a
/// platform fallback.
pub fn system_search_paths() -> Vec<PathBuf> {
  if let Some(output) = run_capture("ld", &["--verbose"]) {
    let dirs = parse_search_dirs(&output);
    if !dirs.is_empty() {
      return dirs;
    }
  }

  let mut fallback = vec![
    PathBuf::from("/usr/local/lib"),
    PathBuf::from("/usr/lib"),
    PathBuf::from("/lib"),
  ];

  if cfg!(target_os = "macos") {
    fallback.push(PathBuf::from(
      "/Library/Developer/CommandLineTools/SDKs/MacOSX.sdk/usr/lib",
    ));
  }

  fallback
}

/// Extract `SEARCH_DIR("=?<path>")` directives from `ld --verbose`
/// output.
pub fn parse_search_dirs(output: &str) -> Vec<PathBuf> {
  let mut dirs = Vec::new();

  for chunk in output.split("SEARCH_DIR(\"").skip(1) {
    if let Some(end) = chunk.find("\")") {
      let dir = chunk[..end].trim_start_matches('=');
      if !dir.is_empty() {
        dirs.push(PathBuf::from(dir));
      }
    }
  }

  dirs
}

/// Query the compiler's sysroot. Empty output means none.
pub fn find_sysroot(compiler: &Path) -> Option<String> {
  let output = run_capture(compiler, &["--print-sysroot"])?;
  let trimmed = output.trim();

  if trimmed.is_empty() {
    None
  } else {
    Some(trimmed.to_string())
  }
}

/// First line of `<path> --version`.
pub fn linker_version(path: &Path) -> Option<String> {
  let output = run_capture(path, &["--version"])?;
  output.lines().next().map(|line| line.trim().to_string())
}

/// Detect the target triple: compiler probes first, host fallback last.
pub fn detect_triple(compiler: Option<&Path>) -> Triple {
  if let Some(cc) = compiler {
    for probe in ["--print-effective-triple", "-dumpmachine"] {
      if let Some(output) = run_capture(cc, &[probe])
        && let Some(line) = output.lines().next()
        && let Some(triple) = Triple::parse(line.trim())
      {
        return triple;
      }
    }
  }

  host_triple()
}

/// Synthesize a triple from `uname`. Unknown machines map to x86_64 and
/// unknown systems to linux.
fn host_triple() -> Triple {
  let machine = run_capture("uname", &["-m"]).map(|s| s.trim().to_string()).unwrap_or_default();
  let sysname = run_capture("uname", &["-s"])
    .map(|s| s.trim().to_ascii_lowercase())
    .unwrap_or_default();

  let arch = Arch::from_str(&machine).unwrap_or(Arch::X86_64);
  let os = Os::from_str(&sysname).unwrap_or(Os::Linux);

  let env = match os {
    Os::Linux => Some(EnvAbi::Gnu),
    Os::Darwin => Some(EnvAbi::Macho),
    _ => None,
  };

  Triple {
    arch,
    vendor: None,
    os,
    env,
  }
}

fn run_capture(
  program: impl AsRef<OsStr>,
  args: &[&str],
) -> Option<String> {
  let output = Command::new(program).args(args).output().ok()?;

  if !output.status.success() {
    return None;
  }

  Some(String::from_utf8_lossy(&output.stdout).into_owned())
}
