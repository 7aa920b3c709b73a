//! The `init` subcommand: write a default project configuration.

use std::path::Path;

use colored::*;

use jello_config::JelloConfig;

use crate::cli::InitCommand;

const CONFIG_FILE: &str = ".jello.json";

pub fn run(cmd: &InitCommand) -> i32 {
  let path = Path::new(CONFIG_FILE);

  if path.exists() && !cmd.force {
    eprintln!(
      "{} '{}' already exists (use --force to overwrite)",
      "Error:".red().bold(),
      path.display()
    );
    return 1;
  }

  let content = match serde_json::to_string_pretty(&JelloConfig::default()) {
    Ok(json) => format!("{}\n", json),
    Err(error) => {
      eprintln!("{} failed to serialize defaults: {}", "Error:".red().bold(), error);
      return 1;
    },
  };

  if let Err(error) = std::fs::write(path, content) {
    eprintln!(
      "{} failed to write '{}': {}",
      "Error:".red().bold(),
      path.display(),
      error
    );
    return 1;
  }

  println!("{} wrote {}", "-->".bright_green().bold(), path.display());
  0
}
