//! Logging utilities for the jello driver.
//!
//! Provides macros for:
//! - Phase logging (`phase_log!`, `phase_ok!`, `phase_warn!`)
//! - Leveled logging (`log_err!`, `log_warn!`, `log_info!`, `log_dbg!`)
//!
//! All output goes to stderr so it never mixes with artifact output on
//! stdout (the `plan` subcommand prints serialized plans there).

use jello_config::{JelloConfig, LogLevel};

pub fn show_output(config: &JelloConfig) -> bool {
  !config.silent && config.log_level > LogLevel::Quiet
}

pub fn log_error(config: &JelloConfig) -> bool {
  !config.silent && config.log_level >= LogLevel::Error
}

pub fn log_warning(config: &JelloConfig) -> bool {
  !config.silent && config.log_level >= LogLevel::Warning
}

pub fn log_info(config: &JelloConfig) -> bool {
  !config.silent && config.log_level >= LogLevel::Info
}

pub fn log_debug(config: &JelloConfig) -> bool {
  !config.silent && config.log_level >= LogLevel::Debug
}

/// Log a pipeline phase message with an arrow prefix.
///
/// Shown at info level and above.
///
/// # Examples
///
/// ```ignore
/// phase_log!(&config, "Resolving {} libraries", count);
/// ```
#[macro_export]
macro_rules! phase_log {
  ($config:expr, $fmt:literal $(, $arg:expr)* $(,)?) => {{
    if $crate::log_info($config) {
      use colored::Colorize;
      eprintln!("    {} {}", "-->".bright_green().bold(), format!($fmt $(, $arg)*));
    }
  }};
}

/// Log a successful phase completion (green arrow, no indent).
#[macro_export]
macro_rules! phase_ok {
  ($config:expr, $fmt:literal $(, $arg:expr)* $(,)?) => {{
    if $crate::log_info($config) {
      use colored::Colorize;
      eprintln!("{} {}", "-->".bright_green().bold(), format!($fmt $(, $arg)*));
    }
  }};
}

/// Log a warning during a phase (yellow arrow, no indent).
#[macro_export]
macro_rules! phase_warn {
  ($config:expr, $fmt:literal $(, $arg:expr)* $(,)?) => {{
    if $crate::log_warning($config) {
      use colored::Colorize;
      eprintln!("{} {}", "-->".bright_yellow().bold(), format!($fmt $(, $arg)*));
    }
  }};
}

/// Log an error with a styled prefix.
#[macro_export]
macro_rules! log_err {
  ($config:expr, $fmt:literal $(, $arg:expr)* $(,)?) => {{
    if $crate::log_error($config) {
      use colored::Colorize;
      eprintln!("{} {}", "Error:".red().bold(), format!($fmt $(, $arg)*));
    }
  }};
}

/// Log a warning with a styled prefix.
#[macro_export]
macro_rules! log_warn {
  ($config:expr, $fmt:literal $(, $arg:expr)* $(,)?) => {{
    if $crate::log_warning($config) {
      use colored::Colorize;
      eprintln!("{} {}", "Warning:".yellow().bold(), format!($fmt $(, $arg)*));
    }
  }};
}

/// Log an informational message (info level and above).
#[macro_export]
macro_rules! log_info {
  ($config:expr, $fmt:literal $(, $arg:expr)* $(,)?) => {{
    if $crate::log_info($config) {
      eprintln!("info: {}", format!($fmt $(, $arg)*));
    }
  }};
}

/// Log a debug message.
///
/// # Examples
///
/// ```ignore
/// log_dbg!(&config, "selected backend {} at {}", backend, path.display());
/// // Output: debug: selected backend mold at /usr/bin/mold
/// ```
#[macro_export]
macro_rules! log_dbg {
  ($config:expr, $fmt:literal $(, $arg:expr)* $(,)?) => {{
    if $crate::log_debug($config) {
      eprintln!("debug: {}", format!($fmt $(, $arg)*));
    }
  }};
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_silent_disables_everything() {
    let mut config = JelloConfig::default();
    config.silent = true;
    config.log_level = LogLevel::Debug;

    assert!(!show_output(&config));
    assert!(!log_error(&config));
    assert!(!log_debug(&config));
  }

  #[test]
  fn test_levels_are_cumulative() {
    let mut config = JelloConfig::default();
    config.log_level = LogLevel::Info;

    assert!(log_error(&config));
    assert!(log_warning(&config));
    assert!(log_info(&config));
    assert!(!log_debug(&config));
  }
}
