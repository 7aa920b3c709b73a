//! The `doctor` subcommand: print the detected toolchain environment.

use colored::*;

use jello_driver::discovery::{self, Lang};
use jello_driver::project::LoadedConfig;
use jello_types::Backend;

pub fn run(loaded: &LoadedConfig) -> i32 {
  section("compilers");

  for (label, lang) in [("cc", Lang::C), ("c++", Lang::Cxx)] {
    match discovery::find_compiler(lang) {
      Some(path) => println!("  {}: {}", label, path.display()),
      None => println!("  {}: {}", label, "not found".yellow()),
    }

    if let Some(real) = discovery::find_real_compiler(lang)
      && Some(&real) != discovery::find_compiler(lang).as_ref()
    {
      println!("  {} (real): {}", label, real.display());
    }
  }

  let compiler = discovery::find_compiler(Lang::C);
  let triple = discovery::detect_triple(compiler.as_deref());

  section("target");
  println!("  triple: {}", triple);

  if let Some(cc) = &compiler
    && let Some(sysroot) = discovery::find_sysroot(cc)
  {
    println!("  sysroot: {}", sysroot);
  }

  section("backends");

  for backend in Backend::DEFAULT_PREFERENCE {
    let found = backend
      .candidate_names()
      .iter()
      .find_map(|name| discovery::which(name));

    match found {
      Some(path) => {
        let version = discovery::linker_version(&path).unwrap_or_else(|| "unknown version".to_string());
        println!("  {}: {} ({})", backend, path.display(), version);
      },
      None => println!("  {}: {}", backend, "not found".yellow()),
    }
  }

  section("nm");
  match discovery::find_nm(loaded.config.nm.as_deref()) {
    Ok(path) => println!("  {}", path.display()),
    Err(_) => println!("  {}", "not found".yellow()),
  }

  section("search paths");
  for path in discovery::system_search_paths() {
    println!("  {}", path.display());
  }

  section("configuration");

  if let Some(path) = &loaded.project_file {
    println!("  project file: {}", path.display());
  }
  if let Some(path) = &loaded.user_file {
    println!("  user file: {}", path.display());
  }

  match serde_json::to_string_pretty(&loaded.config) {
    Ok(json) => {
      for line in json.lines() {
        println!("  {}", line);
      }
      0
    },
    Err(error) => {
      eprintln!("{} failed to serialize configuration: {}", "Error:".red().bold(), error);
      1
    },
  }
}

fn section(name: &str) {
  println!("{} {}", "\u{2022}".bright_cyan().bold(), name);
}
