mod cli;
mod doctor;
mod init;

use std::path::Path;

use clap::Parser as ClapParser;
use colored::*;

use cli::{Cli, LinkCommand, PlanCommand, PlanFormat, SubCommand};
use jello_config::JelloConfig;
use jello_driver::discovery::Lang;
use jello_driver::project;
use jello_driver::{discovery, execute};

fn main() {
  let args: Vec<String> = std::env::args().collect();

  let basename = args
    .first()
    .map(|argv0| Path::new(argv0))
    .and_then(|p| p.file_name())
    .and_then(|n| n.to_str())
    .unwrap_or("jello")
    .to_string();

  // Invocation mode is decided by the executable's basename: compiler
  // wrappers forward verbatim, the linker replacement runs the full
  // pipeline, and anything else exposes the subcommand interface.
  let exit_code = match basename.as_str() {
    "gelcc" => wrapper_mode(Lang::C, &args[1..]),
    "gelc++" => wrapper_mode(Lang::Cxx, &args[1..]),
    "geld" => linker_mode(&basename, &args[1..]),
    _ => subcommand_mode(&basename),
  };

  std::process::exit(exit_code);
}

/// `gelcc` / `gelc++`: forward all arguments verbatim to a real
/// compiler. No plan, no diagnostics, no interception.
fn wrapper_mode(
  lang: Lang,
  args: &[String],
) -> i32 {
  let Some(compiler) = discovery::find_real_compiler(lang) else {
    eprintln!("{} no real compiler found on PATH", "Error:".red().bold());
    return 1;
  };

  match execute::run_cmd(&compiler, args) {
    Ok(code) => code,
    Err(error) => {
      eprintln!("{} {}", "Error:".red().bold(), error);
      1
    },
  }
}

/// `geld`: run the full pipeline on the raw argument list.
fn linker_mode(
  program: &str,
  args: &[String],
) -> i32 {
  let config = match load_config() {
    Ok(config) => config,
    Err(code) => return code,
  };

  match jello_driver::run(&config, args) {
    Ok(code) => code,
    Err(error) => {
      eprintln!("{}: {}", program, error);
      1
    },
  }
}

fn subcommand_mode(program: &str) -> i32 {
  let cli = Cli::parse();

  match cli.subcommand {
    SubCommand::Link(cmd) => run_link_command(program, &cmd),
    SubCommand::Doctor => run_doctor_command(),
    SubCommand::Plan(cmd) => run_plan_command(program, &cmd),
    SubCommand::Init(cmd) => init::run(&cmd),
  }
}

fn run_link_command(
  program: &str,
  cmd: &LinkCommand,
) -> i32 {
  let mut config = match load_config() {
    Ok(config) => config,
    Err(code) => return code,
  };

  if cmd.dry_run {
    config.dry_run = true;
  }
  if cmd.explain {
    config.explain = true;
  }
  if cmd.no_plan {
    config.emit_plan = false;
  }
  if let Some(dir) = &cmd.plan_dir {
    config.plan_dir = dir.into();
  }
  if let Some(mode) = cmd.mode {
    config.fix_mode = mode.into();
  }
  if let Some(backend) = cmd.backend {
    config.backend = Some(backend.into());
  }

  match jello_driver::run(&config, &cmd.args) {
    Ok(code) => code,
    Err(error) => {
      eprintln!("{}: {}", program, error);
      1
    },
  }
}

fn run_doctor_command() -> i32 {
  let loaded = match project::load() {
    Ok(loaded) => loaded,
    Err(error) => {
      eprintln!("{} {}", "Error:".red().bold(), error);
      return 1;
    },
  };

  doctor::run(&loaded)
}

fn run_plan_command(
  program: &str,
  cmd: &PlanCommand,
) -> i32 {
  let mut config = match load_config() {
    Ok(config) => config,
    Err(code) => return code,
  };

  config.dry_run = true;
  config.emit_plan = false;

  if let Some(backend) = cmd.backend {
    config.backend = Some(backend.into());
  }

  let plan = match jello_driver::build_plan(&config, &cmd.args) {
    Ok(plan) => plan,
    Err(error) => {
      eprintln!("{}: {}", program, error);
      return 1;
    },
  };

  match cmd.format {
    PlanFormat::Json => match serde_json::to_string_pretty(&plan) {
      Ok(json) => println!("{}", json),
      Err(error) => {
        eprintln!("{}: failed to serialize plan: {}", program, error);
        return 1;
      },
    },
    PlanFormat::Shell => print!("{}", jello_driver::emit::replay_script(&plan)),
  }

  0
}

fn load_config() -> Result<JelloConfig, i32> {
  match project::load() {
    Ok(loaded) => Ok(loaded.config),
    Err(error) => {
      eprintln!("{} {}", "Error:".red().bold(), error);
      Err(1)
    },
  }
}
