//! Raw argument parsing: argv to a structured [`Invocation`].
//!
//! A single left-to-right sweep over the token stream. Macro forms
//! (`@file`, `-Wl,…`, `-Xlinker`) expand into fresh tokens that are
//! pushed back onto the front of the stream, so nested forms work
//! without special cases.

use std::collections::VecDeque;
use std::path::PathBuf;

use jello_types::{Flag, Input, Invocation, LibRef, LinkError, LinkMode};

/// Cheap pre-scan: does this invocation only compile (no link step)?
///
/// Used to bridge into passthrough mode before the pipeline starts.
pub fn is_compile_only(args: &[String]) -> bool {
  args.iter().any(|a| a == "-c" || a == "-S" || a == "-E")
}

/// Parse an argument list into an [`Invocation`].
pub fn parse_args(args: &[String]) -> Result<Invocation, LinkError> {
  let mut inv = Invocation {
    raw_args: args.to_vec(),
    ..Invocation::default()
  };

  let mut tokens: VecDeque<String> = args.iter().cloned().collect();
  let mut relocatable = false;

  while let Some(token) = tokens.pop_front() {
    // Macro forms expand and re-feed the stream.
    if let Some(path) = token.strip_prefix('@') {
      let content = std::fs::read_to_string(path)
        .map_err(|e| LinkError::Parse(format!("cannot read response file '{}': {}", path, e)))?;

      for expanded in content.split_whitespace().collect::<Vec<_>>().into_iter().rev() {
        tokens.push_front(expanded.to_string());
      }
      continue;
    }

    if let Some(rest) = token.strip_prefix("-Wl,") {
      for expanded in rest.split(',').filter(|t| !t.is_empty()).collect::<Vec<_>>().into_iter().rev() {
        tokens.push_front(expanded.to_string());
      }
      continue;
    }

    if token == "-Xlinker" {
      let value = take_value(&token, &mut tokens)?;
      tokens.push_front(value);
      continue;
    }

    // Spaced value flags and exact aliases.
    match token.as_str() {
      "-o" => {
        let value = take_value(&token, &mut tokens)?;
        inv.output = Some(PathBuf::from(&value));
        inv.flags.push(Flag::Output(PathBuf::from(value)));
        continue;
      },
      "-L" => {
        let value = take_value(&token, &mut tokens)?;
        push_search_path(&mut inv, value);
        continue;
      },
      "-l" => {
        let value = take_value(&token, &mut tokens)?;
        inv.flags.push(Flag::LinkLib(LibRef::Named(value)));
        continue;
      },
      "--sysroot" => {
        let value = take_value(&token, &mut tokens)?;
        inv.flags.push(Flag::Sysroot(value));
        continue;
      },
      "--dynamic-linker" | "-dynamic-linker" => {
        let value = take_value(&token, &mut tokens)?;
        inv.flags.push(Flag::DynamicLinker(value));
        continue;
      },
      "--rpath" | "-rpath" => {
        let value = take_value(&token, &mut tokens)?;
        inv.flags.push(Flag::Rpath(value));
        continue;
      },
      "--rpath-link" | "-rpath-link" => {
        let value = take_value(&token, &mut tokens)?;
        inv.flags.push(Flag::RpathLink(value));
        continue;
      },
      "-Map" | "--Map" => {
        let value = take_value(&token, &mut tokens)?;
        inv.flags.push(Flag::MapFile(PathBuf::from(value)));
        continue;
      },
      "-T" => {
        let value = take_value(&token, &mut tokens)?;
        inv.flags.push(Flag::LinkerScript(PathBuf::from(value)));
        continue;
      },
      "--target" | "-target" => {
        let value = take_value(&token, &mut tokens)?;
        inv.flags.push(Flag::Target(value));
        continue;
      },
      "--version-script" => {
        let value = take_value(&token, &mut tokens)?;
        inv.flags.push(Flag::VersionScript(PathBuf::from(value)));
        continue;
      },
      "-soname" | "-h" => {
        let value = take_value(&token, &mut tokens)?;
        inv.flags.push(Flag::Soname(value));
        continue;
      },
      "-framework" => {
        let value = take_value(&token, &mut tokens)?;
        inv.flags.push(Flag::LinkLib(LibRef::Framework(value)));
        continue;
      },
      "-arch" => {
        let value = take_value(&token, &mut tokens)?;
        inv.flags.push(Flag::TargetArch(value));
        continue;
      },
      "-z" => {
        let value = take_value(&token, &mut tokens)?;
        inv.flags.push(Flag::ZKeyword(value));
        continue;
      },
      "-(" | "--start-group" | "-start-group" => {
        inv.flags.push(Flag::StartGroup);
        continue;
      },
      "-)" | "--end-group" | "-end-group" => {
        inv.flags.push(Flag::EndGroup);
        continue;
      },
      "-E" | "--export-dynamic" | "-export-dynamic" => {
        inv.flags.push(Flag::ExportDynamic);
        continue;
      },
      "--whole-archive" | "-whole-archive" => {
        inv.flags.push(Flag::WholeArchive);
        continue;
      },
      "--no-whole-archive" | "-no-whole-archive" => {
        inv.flags.push(Flag::NoWholeArchive);
        continue;
      },
      "--as-needed" | "-as-needed" => {
        inv.flags.push(Flag::AsNeeded);
        continue;
      },
      "--no-as-needed" | "-no-as-needed" => {
        inv.flags.push(Flag::NoAsNeeded);
        continue;
      },
      "-Bstatic" | "--Bstatic" => {
        inv.flags.push(Flag::Bstatic);
        continue;
      },
      "-Bdynamic" | "--Bdynamic" => {
        inv.flags.push(Flag::Bdynamic);
        continue;
      },
      "--push-state" => {
        inv.flags.push(Flag::PushState);
        continue;
      },
      "--pop-state" => {
        inv.flags.push(Flag::PopState);
        continue;
      },
      "--gc-sections" => {
        inv.flags.push(Flag::GcSections);
        continue;
      },
      "--no-gc-sections" => {
        inv.flags.push(Flag::NoGcSections);
        continue;
      },
      "-pie" => {
        inv.flags.push(Flag::Pie);
        continue;
      },
      "-no-pie" | "-nopie" => {
        inv.flags.push(Flag::NoPie);
        continue;
      },
      "-shared" => {
        inv.flags.push(Flag::Shared);
        continue;
      },
      "-static" => {
        inv.flags.push(Flag::Static);
        continue;
      },
      "-r" | "--relocatable" | "-relocatable" => {
        relocatable = true;
        continue;
      },
      "-nostdlib" => {
        inv.flags.push(Flag::Nostdlib);
        continue;
      },
      "-nostartfiles" => {
        inv.flags.push(Flag::Nostartfiles);
        continue;
      },
      "-nodefaultlibs" => {
        inv.flags.push(Flag::Nodefaultlibs);
        continue;
      },
      "-m32" => {
        inv.flags.push(Flag::M32);
        continue;
      },
      "-m64" => {
        inv.flags.push(Flag::M64);
        continue;
      },
      "-flto" => {
        inv.flags.push(Flag::Lto(None));
        continue;
      },
      "-v" | "--verbose" => {
        inv.flags.push(Flag::Verbose);
        continue;
      },
      "-t" | "--trace" => {
        inv.flags.push(Flag::Trace);
        continue;
      },
      "-M" | "--print-map" => {
        inv.flags.push(Flag::PrintMap);
        continue;
      },
      "-s" | "--strip-all" => {
        inv.flags.push(Flag::StripAll);
        continue;
      },
      "-S" | "--strip-debug" => {
        inv.flags.push(Flag::StripDebug);
        continue;
      },
      // Compile-only frontend flags that cannot affect linking.
      "-c" | "-pipe" => continue,
      _ => {},
    }

    // Glued value flags.
    if let Some(rest) = token.strip_prefix("-l")
      && !token.starts_with("--")
      && !rest.is_empty()
    {
      inv.flags.push(Flag::LinkLib(LibRef::Named(rest.to_string())));
      continue;
    }

    if let Some(rest) = token.strip_prefix("-L")
      && !token.starts_with("--")
      && !rest.is_empty()
    {
      push_search_path(&mut inv, rest.to_string());
      continue;
    }

    if let Some(rest) = token.strip_prefix("--sysroot=") {
      inv.flags.push(Flag::Sysroot(rest.to_string()));
      continue;
    }

    if let Some(rest) = token.strip_prefix("--dynamic-linker=") {
      inv.flags.push(Flag::DynamicLinker(rest.to_string()));
      continue;
    }

    if let Some(rest) = token.strip_prefix("--rpath-link=") {
      inv.flags.push(Flag::RpathLink(rest.to_string()));
      continue;
    }

    if let Some(rest) = token.strip_prefix("--rpath=").or_else(|| token.strip_prefix("-rpath=")) {
      inv.flags.push(Flag::Rpath(rest.to_string()));
      continue;
    }

    if let Some(rest) = token.strip_prefix("-Map=").or_else(|| token.strip_prefix("--Map=")) {
      inv.flags.push(Flag::MapFile(PathBuf::from(rest)));
      continue;
    }

    if let Some(rest) = token.strip_prefix("--target=").or_else(|| token.strip_prefix("-target=")) {
      inv.flags.push(Flag::Target(rest.to_string()));
      continue;
    }

    if let Some(rest) = token.strip_prefix("--version-script=") {
      inv.flags.push(Flag::VersionScript(PathBuf::from(rest)));
      continue;
    }

    if let Some(rest) = token.strip_prefix("-soname=").or_else(|| token.strip_prefix("--soname=")) {
      inv.flags.push(Flag::Soname(rest.to_string()));
      continue;
    }

    if let Some(rest) = token.strip_prefix("--icf=") {
      inv.flags.push(Flag::Icf(rest.to_string()));
      continue;
    }

    if let Some(rest) = token.strip_prefix("-flto=") {
      inv.flags.push(Flag::Lto(Some(rest.to_string())));
      continue;
    }

    if let Some(rest) = token.strip_prefix("-fuse-ld=") {
      inv.flags.push(Flag::UseLinker(rest.to_string()));
      continue;
    }

    if let Some(rest) = token.strip_prefix("-stdlib=") {
      inv.flags.push(Flag::Stdlib(rest.to_string()));
      continue;
    }

    // -Ttext=/-Tdata=/-Tbss= set section origins and are distinct from
    // -T <script>; forward them untouched.
    if token.starts_with("-Ttext") || token.starts_with("-Tdata") || token.starts_with("-Tbss") {
      inv.flags.push(Flag::Passthrough(token));
      continue;
    }

    if let Some(rest) = token.strip_prefix("-T")
      && !token.starts_with("--")
      && !rest.is_empty()
    {
      inv.flags.push(Flag::LinkerScript(PathBuf::from(rest)));
      continue;
    }

    if let Some(rest) = token.strip_prefix("-z")
      && !token.starts_with("--")
      && !rest.is_empty()
    {
      inv.flags.push(Flag::ZKeyword(rest.to_string()));
      continue;
    }

    if token.starts_with("-g") && !token.starts_with("--") {
      inv.flags.push(Flag::DebugInfo(token));
      continue;
    }

    // Remaining compiler-only flags are dropped: they cannot affect the
    // link (-flto and -fuse-ld were already consumed above).
    if token.starts_with("-O")
      || token.starts_with("-W")
      || (token.starts_with("-f") && !token.starts_with("--"))
      || token.starts_with("-D")
      || token.starts_with("-I")
      || token.starts_with("-std=")
    {
      continue;
    }

    if token.starts_with('-') {
      inv.flags.push(Flag::Passthrough(token));
      continue;
    }

    inv.inputs.push(Input::classify(&token));
  }

  inv.link_mode = derive_link_mode(&inv.flags, relocatable);

  Ok(inv)
}

fn take_value(
  flag: &str,
  tokens: &mut VecDeque<String>,
) -> Result<String, LinkError> {
  tokens
    .pop_front()
    .ok_or_else(|| LinkError::Parse(format!("flag {} requires a value", flag)))
}

fn push_search_path(
  inv: &mut Invocation,
  path: String,
) {
  inv.explicit_search_paths.push(PathBuf::from(&path));
  inv.flags.push(Flag::SearchPath(PathBuf::from(path)));
}

/// Shared wins over Pie over Static; `-r` yields Relocatable when no
/// stronger mode was requested; Executable otherwise.
fn derive_link_mode(
  flags: &[Flag],
  relocatable: bool,
) -> LinkMode {
  let mut shared = false;
  let mut pie = false;
  let mut static_link = false;

  for flag in flags {
    match flag {
      Flag::Shared => shared = true,
      Flag::Pie => pie = true,
      Flag::NoPie => pie = false,
      Flag::Static => static_link = true,
      _ => {},
    }
  }

  if shared {
    LinkMode::Shared
  } else if pie {
    LinkMode::Pie
  } else if static_link {
    LinkMode::Static
  } else if relocatable {
    LinkMode::Relocatable
  } else {
    LinkMode::Executable
  }
}
