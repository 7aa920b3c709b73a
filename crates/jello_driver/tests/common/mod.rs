use std::path::PathBuf;

use jello_driver::LinkPlan;
use jello_driver::normalize::normalize;
use jello_driver::parse::parse_args;
use jello_types::{Arch, Backend, EnvAbi, Invocation, Os, Triple};

pub fn args(list: &[&str]) -> Vec<String> {
  list.iter().map(|s| s.to_string()).collect()
}

pub fn linux_triple() -> Triple {
  Triple {
    arch: Arch::X86_64,
    vendor: Some("unknown".to_string()),
    os: Os::Linux,
    env: Some(EnvAbi::Gnu),
  }
}

pub fn parsed(argv: &[&str]) -> Invocation {
  normalize(parse_args(&args(argv)).expect("parse failed")).expect("normalize failed")
}

/// Build a plan without touching the host toolchain: fixed triple,
/// fixed backend path, no resolution.
pub fn plan_for(argv: &[&str]) -> LinkPlan {
  let inv = parsed(argv);

  LinkPlan::build(
    &inv,
    linux_triple(),
    Backend::Mold,
    PathBuf::from("/usr/bin/mold"),
    Vec::new(),
    vec![PathBuf::from("/usr/lib")],
    &[],
    Vec::new(),
    Vec::new(),
  )
}
