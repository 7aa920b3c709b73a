use clap::{Parser, Subcommand, ValueEnum};

use jello_config::FixMode;
use jello_types::Backend;

#[derive(Copy, Clone, PartialEq, Eq, ValueEnum)]
pub enum BackendCli {
  Mold,
  Lld,
  Gold,
  Bfd,
  System,
}

impl From<BackendCli> for Backend {
  fn from(value: BackendCli) -> Backend {
    match value {
      BackendCli::Mold => Backend::Mold,
      BackendCli::Lld => Backend::Lld,
      BackendCli::Gold => Backend::Gold,
      BackendCli::Bfd => Backend::Bfd,
      BackendCli::System => Backend::System,
    }
  }
}

#[derive(Copy, Clone, PartialEq, Eq, ValueEnum)]
pub enum FixModeCli {
  /// Apply safe fixes automatically
  Auto,
  /// Report fixes without applying them
  Suggest,
  /// Fail when any error diagnostic is produced
  Strict,
}

impl From<FixModeCli> for FixMode {
  fn from(value: FixModeCli) -> FixMode {
    match value {
      FixModeCli::Auto => FixMode::Auto,
      FixModeCli::Suggest => FixMode::Suggest,
      FixModeCli::Strict => FixMode::Strict,
    }
  }
}

#[derive(Copy, Clone, PartialEq, Eq, ValueEnum)]
pub enum PlanFormat {
  /// Machine-readable linkplan.json schema
  Json,
  /// Replayable shell script
  Shell,
}

#[derive(Parser, Clone)]
pub struct LinkCommand {
  /// Print the backend command without executing it
  #[arg(short = 'n', long)]
  pub dry_run: bool,

  /// Write a reasoning trace to stderr
  #[arg(long)]
  pub explain: bool,

  /// Do not emit plan artifacts
  #[arg(long)]
  pub no_plan: bool,

  /// Artifact directory
  #[arg(long, value_name = "DIR")]
  pub plan_dir: Option<String>,

  /// Fix-mode policy
  #[arg(long, value_enum)]
  pub mode: Option<FixModeCli>,

  /// Force a specific backend linker
  #[arg(long, value_enum)]
  pub backend: Option<BackendCli>,

  /// Arguments forwarded to the link pipeline
  #[arg(trailing_var_arg = true, allow_hyphen_values = true)]
  pub args: Vec<String>,
}

#[derive(Parser, Clone)]
pub struct PlanCommand {
  /// Output format
  #[arg(short = 'f', long, value_enum, default_value = "json")]
  pub format: PlanFormat,

  /// Force a specific backend linker
  #[arg(long, value_enum)]
  pub backend: Option<BackendCli>,

  /// Arguments forwarded to the link pipeline
  #[arg(trailing_var_arg = true, allow_hyphen_values = true)]
  pub args: Vec<String>,
}

#[derive(Parser, Clone)]
pub struct InitCommand {
  /// Overwrite an existing configuration file
  #[arg(long)]
  pub force: bool,
}

#[derive(Subcommand, Clone)]
pub enum SubCommand {
  /// Run the link pipeline
  Link(LinkCommand),
  /// Print the detected toolchain environment
  Doctor,
  /// Build and print a link plan without executing it
  Plan(PlanCommand),
  /// Write a default project configuration file
  Init(InitCommand),
}

#[derive(Parser)]
#[command(author, version, about = "A deterministic linker driver", long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
  #[command(subcommand)]
  pub subcommand: SubCommand,
}
