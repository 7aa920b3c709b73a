//! The rule table mapping backend output lines to diagnostics.
//!
//! Rules are tried in table order and the first matching rule wins for
//! a given line. Patterns are compiled once on first use and shared.

use std::sync::LazyLock;

use regex::{Captures, Regex};

use jello_types::{Flag, LibRef};

use crate::{Confidence, Diagnostic, Fix, FixAction, Severity, dedup};

struct Rule {
  code: &'static str,
  pattern: Regex,
  build: fn(&Captures<'_>, &str) -> Diagnostic,
}

fn rule(
  code: &'static str,
  pattern: &str,
  build: fn(&Captures<'_>, &str) -> Diagnostic,
) -> Rule {
  Rule {
    code,
    pattern: Regex::new(pattern).expect("diagnostic rule pattern must compile"),
    build,
  }
}

static RULES: LazyLock<Vec<Rule>> = LazyLock::new(|| {
  vec![
    rule(
      "E001",
      r"undefined (?:reference to [`']([^']+)'|symbol: (.+))",
      build_undefined_reference,
    ),
    rule(
      "E002",
      r"cannot find -l([^\s:]+)|library not found for -l([^\s:]+)|unable to find library -l([^\s:]+)",
      build_library_not_found,
    ),
    rule(
      "E003",
      r"([^\s:]+\.so[^\s:]*).*DSO missing from command line",
      build_dso_missing,
    ),
    rule(
      "E004",
      r"(?:([^\s:]+\.o):\s*)?relocation (R_\S+)|recompile with -fPIC",
      build_needs_pic,
    ),
    rule(
      "E005",
      r"skipping incompatible ([^\s,]+)|([^\s,]+) is incompatible with",
      build_incompatible,
    ),
    rule("E006", r"multiple definition of [`']([^']+)'", build_multiple_definition),
    rule(
      "E007",
      r"(?:([^\s:]+):\s*)?file (?:format )?not recognized",
      build_not_recognized,
    ),
    rule("E008", r"cannot find entry symbol ([^\s;]+)", build_no_entry),
    rule("E009", r"version [`']([^']+)' not found", build_version_not_found),
    rule(
      "E010",
      r"hidden symbol [`']([^']+)'.*referenced by DSO",
      build_hidden_symbol,
    ),
    rule("E011", r"defined in discarded section", build_discarded_section),
    rule(
      "E012",
      r"TLS (?:definition|reference).*mismatch|mismatches non-TLS",
      build_tls_mismatch,
    ),
    rule(
      "E013",
      r"read-only segment has dynamic relocations|DT_TEXTREL",
      build_textrel,
    ),
    rule(
      "E014",
      r"generated with LTO version|LTO version .* mismatch|plugin needed to handle lto object|needs LTO plugin",
      build_lto_mismatch,
    ),
    rule("E015", r"cannot open output file ([^\s:]+)", build_cannot_open_output),
    rule(
      "E016",
      r"region [`']?([^\s']+?)'? overflowed|will not fit in region",
      build_region_overflow,
    ),
    rule(
      "E017",
      r"GOT overflow|relocation truncated to fit: R_\S*GOT",
      build_got_overflow,
    ),
    rule(
      "E018",
      r"([^\s:]+\.lds?):(?:\d+:)?\s*syntax error|syntax error in linker script",
      build_script_syntax_error,
    ),
  ]
});

/// Classify a single backend output line. The first matching rule wins.
pub fn classify_line(line: &str) -> Option<Diagnostic> {
  for rule in RULES.iter() {
    if let Some(caps) = rule.pattern.captures(line) {
      let diag = (rule.build)(&caps, line);
      debug_assert_eq!(diag.code, rule.code);
      return Some(diag);
    }
  }

  None
}

/// Classify every line of backend output, deduplicated by
/// `(code, evidence)` with first occurrence preserved.
pub fn classify(output: &str) -> Vec<Diagnostic> {
  let diags = output.lines().filter_map(classify_line).collect();
  dedup(diags)
}

fn first_capture(caps: &Captures<'_>) -> String {
  caps
    .iter()
    .skip(1)
    .flatten()
    .next()
    .map(|m| m.as_str().trim().to_string())
    .unwrap_or_default()
}

/// C++ runtime symbols are recognizable by mangling-adjacent prefixes.
fn is_cxx_symbol(sym: &str) -> bool {
  const CXX_PREFIXES: &[&str] = &["std::", "__cxa_", "__gxx_", "operator ", "typeinfo ", "vtable "];

  CXX_PREFIXES.iter().any(|prefix| sym.starts_with(prefix))
}

fn is_math_symbol(sym: &str) -> bool {
  const MATH_FUNCS: &[&str] = &[
    "sin", "cos", "tan", "asin", "acos", "atan", "atan2", "sinh", "cosh", "tanh", "exp", "exp2", "expm1", "log",
    "log2", "log10", "log1p", "pow", "sqrt", "cbrt", "hypot", "fmod", "remainder", "floor", "ceil", "round", "trunc",
    "fabs", "ldexp", "frexp", "fma", "lgamma", "tgamma", "erf", "erfc",
  ];

  let base = base_symbol_name(sym);
  // Accept float/long-double variants: sinf, sinl.
  let stem = base.strip_suffix('f').or_else(|| base.strip_suffix('l')).unwrap_or(base);

  MATH_FUNCS.contains(&base) || MATH_FUNCS.contains(&stem)
}

fn is_stack_protector_symbol(sym: &str) -> bool {
  let base = base_symbol_name(sym);
  base == "__stack_chk_fail" || base == "__stack_chk_guard" || base == "__stack_smash_handler"
}

/// Strip a glibc-style version suffix: `pow@@GLIBC_2.29` -> `pow`.
fn base_symbol_name(sym: &str) -> &str {
  sym.split('@').next().unwrap_or(sym)
}

/// Derive a `-l` name from a shared object path:
/// `/lib/libfoo.so.6` -> `foo`.
fn lib_name_from_dso(path: &str) -> String {
  let base = path.rsplit('/').next().unwrap_or(path);
  let stem = base.split(".so").next().unwrap_or(base);

  stem.strip_prefix("lib").unwrap_or(stem).to_string()
}

fn build_undefined_reference(
  caps: &Captures<'_>,
  _line: &str,
) -> Diagnostic {
  let sym = first_capture(caps);

  let mut diag = Diagnostic::new(
    Severity::Error,
    "E001",
    format!("undefined reference to `{}`", sym),
  )
  .with_evidence(sym.clone());

  if is_cxx_symbol(&sym) {
    diag = diag
      .with_fix(Fix::new(
        "this is a C++ runtime symbol; link with the C++ driver (c++/g++/clang++)",
        Confidence::High,
        FixAction::UseCxxDriver,
      ))
      .with_fix(Fix::new(
        "add -lstdc++ to link the C++ standard library",
        Confidence::High,
        FixAction::AddFlag(Flag::LinkLib(LibRef::Named("stdc++".to_string()))),
      ));
  } else if is_math_symbol(&sym) {
    diag = diag.with_fix(Fix::new(
      format!("`{}` lives in the math library; add -lm", base_symbol_name(&sym)),
      Confidence::High,
      FixAction::AddFlag(Flag::LinkLib(LibRef::Named("m".to_string()))),
    ));
  } else if base_symbol_name(&sym).starts_with("pthread_") {
    diag = diag.with_fix(Fix::new(
      "POSIX threads symbol; add -pthread",
      Confidence::High,
      FixAction::AddFlag(Flag::Passthrough("-pthread".to_string())),
    ));
  } else if is_stack_protector_symbol(&sym) {
    diag = diag.with_fix(Fix::new(
      "stack protector runtime symbol; add -lssp",
      Confidence::High,
      FixAction::AddFlag(Flag::LinkLib(LibRef::Named("ssp".to_string()))),
    ));
  }

  diag
}

fn build_library_not_found(
  caps: &Captures<'_>,
  _line: &str,
) -> Diagnostic {
  let name = first_capture(caps);

  Diagnostic::new(Severity::Error, "E002", format!("cannot find library -l{}", name))
    .with_evidence(name.clone())
    .with_fix(Fix::new(
      format!("install the development package (e.g. lib{}-dev)", name),
      Confidence::Medium,
      FixAction::SuggestPackage(format!("lib{}-dev", name)),
    ))
    .with_fix(Fix::new(
      "add the directory containing the library with -L<dir>",
      Confidence::Medium,
      FixAction::AddSearchPath(String::new()),
    ))
}

fn build_dso_missing(
  caps: &Captures<'_>,
  _line: &str,
) -> Diagnostic {
  let dso = first_capture(caps);
  let name = lib_name_from_dso(&dso);

  Diagnostic::new(
    Severity::Error,
    "E003",
    format!("{} is needed but not on the command line", dso),
  )
  .with_evidence(dso.clone())
  .with_fix(Fix::new(
    format!("link it explicitly with -l{}", name),
    Confidence::High,
    FixAction::AddFlag(Flag::LinkLib(LibRef::Named(name))),
  ))
}

fn build_needs_pic(
  caps: &Captures<'_>,
  _line: &str,
) -> Diagnostic {
  let file = caps.get(1).map(|m| m.as_str().to_string()).unwrap_or_default();
  let reloc = caps.get(2).map(|m| m.as_str().to_string());

  let mut diag = Diagnostic::new(
    Severity::Error,
    "E004",
    "object contains relocations unusable in position-independent output",
  );

  if let Some(reloc) = reloc {
    diag = diag.with_evidence(reloc);
  }
  if !file.is_empty() {
    diag = diag.with_evidence(file.clone());
  }

  diag.with_fix(Fix::new(
    "recompile the object with -fPIC",
    Confidence::High,
    FixAction::SuggestRecompile {
      file,
      flags: vec!["-fPIC".to_string()],
    },
  ))
}

fn build_incompatible(
  caps: &Captures<'_>,
  _line: &str,
) -> Diagnostic {
  let file = first_capture(caps);

  Diagnostic::new(
    Severity::Error,
    "E005",
    format!("{} is for a different architecture", file),
  )
  .with_evidence(file.clone())
  .with_fix(Fix::new(
    "rebuild the library for the target architecture, or point -L at a matching build",
    Confidence::Medium,
    FixAction::SuggestRecompile { file, flags: vec![] },
  ))
}

fn build_multiple_definition(
  caps: &Captures<'_>,
  _line: &str,
) -> Diagnostic {
  let sym = first_capture(caps);

  Diagnostic::new(
    Severity::Error,
    "E006",
    format!("multiple definition of `{}`", sym),
  )
  .with_evidence(sym)
  .with_fix(Fix::new(
    "the symbol is defined in more than one input; drop the duplicate object or mark header definitions inline",
    Confidence::Low,
    FixAction::SuggestRecompile {
      file: String::new(),
      flags: vec![],
    },
  ))
}

fn build_not_recognized(
  caps: &Captures<'_>,
  _line: &str,
) -> Diagnostic {
  let file = first_capture(caps);

  let mut diag = Diagnostic::new(Severity::Error, "E007", "input file format not recognized");

  if !file.is_empty() {
    diag = diag.with_evidence(file.clone());
  }

  diag.with_fix(Fix::new(
    "the file was built for another architecture or is corrupt; rebuild it for this target",
    Confidence::Medium,
    FixAction::SuggestRecompile { file, flags: vec![] },
  ))
}

fn build_no_entry(
  caps: &Captures<'_>,
  _line: &str,
) -> Diagnostic {
  let sym = first_capture(caps);

  Diagnostic::new(
    Severity::Warning,
    "E008",
    format!("cannot find entry symbol {}", sym),
  )
  .with_evidence(sym.clone())
  .with_fix(Fix::new(
    format!("define `{}` or pick another entry point with -e", sym),
    Confidence::Medium,
    FixAction::AddFlag(Flag::Passthrough(format!("-e {}", sym))),
  ))
}

fn build_version_not_found(
  caps: &Captures<'_>,
  _line: &str,
) -> Diagnostic {
  let version = first_capture(caps);

  Diagnostic::new(
    Severity::Error,
    "E009",
    format!("symbol version {} not found", version),
  )
  .with_evidence(version)
  .with_fix(Fix::new(
    "rebuild against the library version installed on this system",
    Confidence::Medium,
    FixAction::SuggestRecompile {
      file: String::new(),
      flags: vec![],
    },
  ))
}

fn build_hidden_symbol(
  caps: &Captures<'_>,
  _line: &str,
) -> Diagnostic {
  let sym = first_capture(caps);

  Diagnostic::new(
    Severity::Error,
    "E010",
    format!("hidden symbol `{}` is referenced by a shared object", sym),
  )
  .with_evidence(sym)
  .with_fix(Fix::new(
    "recompile the object providing the symbol with default visibility",
    Confidence::High,
    FixAction::SuggestRecompile {
      file: String::new(),
      flags: vec!["-fvisibility=default".to_string()],
    },
  ))
}

fn build_discarded_section(
  _caps: &Captures<'_>,
  line: &str,
) -> Diagnostic {
  Diagnostic::new(Severity::Error, "E011", "symbol defined in a discarded section")
    .with_evidence(line.trim().to_string())
    .with_fix(Fix::new(
      "mark the symbol __attribute__((used)), or disable section GC with --no-gc-sections",
      Confidence::Low,
      FixAction::AddFlag(Flag::NoGcSections),
    ))
}

fn build_tls_mismatch(
  _caps: &Captures<'_>,
  line: &str,
) -> Diagnostic {
  Diagnostic::new(
    Severity::Error,
    "E012",
    "thread-local and non-thread-local definitions of the same symbol",
  )
  .with_evidence(line.trim().to_string())
  .with_fix(Fix::new(
    "declare the symbol consistently (thread_local everywhere or nowhere) and rebuild",
    Confidence::High,
    FixAction::SuggestRecompile {
      file: String::new(),
      flags: vec![],
    },
  ))
}

fn build_textrel(
  _caps: &Captures<'_>,
  line: &str,
) -> Diagnostic {
  Diagnostic::new(
    Severity::Warning,
    "E013",
    "read-only segment has dynamic relocations",
  )
  .with_evidence(line.trim().to_string())
  .with_fix(Fix::new(
    "recompile the offending objects with -fPIC",
    Confidence::High,
    FixAction::SuggestRecompile {
      file: String::new(),
      flags: vec!["-fPIC".to_string()],
    },
  ))
}

fn build_lto_mismatch(
  _caps: &Captures<'_>,
  line: &str,
) -> Diagnostic {
  Diagnostic::new(Severity::Error, "E014", "LTO object version mismatch")
    .with_evidence(line.trim().to_string())
    .with_fix(Fix::new(
      "compile all LTO objects with the same compiler version",
      Confidence::High,
      FixAction::SuggestRecompile {
        file: String::new(),
        flags: vec![],
      },
    ))
    .with_fix(Fix::new(
      "pass -fuse-linker-plugin so the linker loads the matching LTO plugin",
      Confidence::Medium,
      FixAction::AddFlag(Flag::Passthrough("-fuse-linker-plugin".to_string())),
    ))
}

fn build_cannot_open_output(
  caps: &Captures<'_>,
  _line: &str,
) -> Diagnostic {
  let file = first_capture(caps);

  Diagnostic::new(
    Severity::Error,
    "E015",
    format!("cannot open output file {}", file),
  )
  .with_evidence(file)
}

fn build_region_overflow(
  caps: &Captures<'_>,
  line: &str,
) -> Diagnostic {
  let region = first_capture(caps);

  let mut diag = Diagnostic::new(Severity::Error, "E016", "memory region overflowed");

  if region.is_empty() {
    diag = diag.with_evidence(line.trim().to_string());
  } else {
    diag = diag.with_evidence(region);
  }

  diag.with_fix(Fix::new(
    "optimize for size with -Os, or enlarge the region in the linker script",
    Confidence::Low,
    FixAction::SuggestRecompile {
      file: String::new(),
      flags: vec!["-Os".to_string()],
    },
  ))
}

fn build_got_overflow(
  _caps: &Captures<'_>,
  line: &str,
) -> Diagnostic {
  Diagnostic::new(Severity::Error, "E017", "global offset table overflow")
    .with_evidence(line.trim().to_string())
    .with_fix(Fix::new(
      "use a larger code model (-mcmodel=medium)",
      Confidence::Medium,
      FixAction::SuggestRecompile {
        file: String::new(),
        flags: vec!["-mcmodel=medium".to_string()],
      },
    ))
    .with_fix(Fix::new(
      "reduce GOT pressure with -fvisibility=hidden",
      Confidence::Medium,
      FixAction::SuggestRecompile {
        file: String::new(),
        flags: vec!["-fvisibility=hidden".to_string()],
      },
    ))
}

fn build_script_syntax_error(
  caps: &Captures<'_>,
  line: &str,
) -> Diagnostic {
  let script = first_capture(caps);

  let mut diag = Diagnostic::new(Severity::Error, "E018", "syntax error in linker script");

  if script.is_empty() {
    diag = diag.with_evidence(line.trim().to_string());
  } else {
    diag = diag.with_evidence(script);
  }

  diag
}
