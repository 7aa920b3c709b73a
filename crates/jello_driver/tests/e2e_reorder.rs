mod common;

use std::path::Path;
use std::process::Command;

use jello_config::{FixMode, JelloConfig, LogLevel};
use jello_diagnostics::FixAction;
use jello_driver::build_plan;
use tempfile::TempDir;

/// Compile `source` and archive it as `lib<name>.a` in `dir`.
fn build_archive(
  dir: &Path,
  name: &str,
  source: &str,
) {
  let c_path = dir.join(format!("{}.c", name));
  let obj_path = dir.join(format!("{}.o", name));
  let lib_path = dir.join(format!("lib{}.a", name));

  std::fs::write(&c_path, source).unwrap();

  let compile = Command::new("cc")
    .arg("-c")
    .arg(&c_path)
    .arg("-o")
    .arg(&obj_path)
    .output()
    .expect("failed to run cc");
  assert!(
    compile.status.success(),
    "cc failed: {}",
    String::from_utf8_lossy(&compile.stderr)
  );

  let archive = Command::new("ar")
    .arg("rcs")
    .arg(&lib_path)
    .arg(&obj_path)
    .output()
    .expect("failed to run ar");
  assert!(
    archive.status.success(),
    "ar failed: {}",
    String::from_utf8_lossy(&archive.stderr)
  );
}

fn quiet_config(lib_dir: &Path) -> JelloConfig {
  let mut config = JelloConfig::default();
  config.fix_mode = FixMode::Auto;
  config.emit_plan = false;
  config.log_level = LogLevel::Quiet;
  config.search_paths = vec![lib_dir.to_path_buf()];
  config
}

#[test]
fn e2e_cyclic_named_libs_are_group_wrapped() {
  let dir = TempDir::new().unwrap();

  build_archive(
    dir.path(),
    "cyca",
    "extern void cycb_fn(void);\nvoid cyca_fn(void) { cycb_fn(); }\n",
  );
  build_archive(
    dir.path(),
    "cycb",
    "extern void cyca_fn(void);\nvoid cycb_fn(void) { cyca_fn(); }\n",
  );

  let config = quiet_config(dir.path());
  let argv = common::args(&["-lcyca", "-lcycb", "-o", "app"]);

  let plan = build_plan(&config, &argv).expect("build_plan failed");

  // The cycle surfaces as a single applied AddGroup fix naming both
  // resolved archive paths, in reference order.
  let lib_a = dir.path().join("libcyca.a");
  let lib_b = dir.path().join("libcycb.a");

  assert_eq!(plan.fixes_applied.len(), 1);
  match &plan.fixes_applied[0].action {
    FixAction::AddGroup(members) => assert_eq!(members, &vec![lib_a.clone(), lib_b.clone()]),
    other => panic!("expected AddGroup, got {:?}", other),
  }

  // The rendered link line wraps the -l flags themselves.
  let pos = |needle: &str| {
    plan
      .backend_args
      .iter()
      .position(|arg| arg == needle)
      .unwrap_or_else(|| panic!("'{}' missing from {:?}", needle, plan.backend_args))
  };

  let start = pos("--start-group");
  let first = pos("-lcyca");
  let second = pos("-lcycb");
  let end = pos("--end-group");

  assert!(
    start < first && first < second && second < end,
    "group markers do not wrap the cyclic libraries: {:?}",
    plan.backend_args
  );
}

#[test]
fn e2e_acyclic_named_libs_are_reordered() {
  let dir = TempDir::new().unwrap();

  // depb provides dep_fn; depa consumes it, so depa must precede depb
  // on the link line even though the invocation names depb first.
  build_archive(
    dir.path(),
    "depb",
    "void dep_fn(void) {}\n",
  );
  build_archive(
    dir.path(),
    "depa",
    "extern void dep_fn(void);\nvoid depa_fn(void) { dep_fn(); }\n",
  );

  let config = quiet_config(dir.path());
  let argv = common::args(&["-ldepb", "-ldepa", "-o", "app"]);

  let plan = build_plan(&config, &argv).expect("build_plan failed");

  assert!(plan.fixes_applied.is_empty());

  let depa = plan.backend_args.iter().position(|a| a == "-ldepa").unwrap();
  let depb = plan.backend_args.iter().position(|a| a == "-ldepb").unwrap();

  assert!(
    depa < depb,
    "consumer does not precede provider: {:?}",
    plan.backend_args
  );
}
