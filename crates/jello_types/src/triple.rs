//! Target triple model: architecture, vendor, operating system and ABI.

use std::fmt;

use serde::{Deserialize, Serialize};

#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Arch {
  X86_64,
  I686,
  Aarch64,
  Armv7,
  Riscv32,
  Riscv64,
  Mips,
  Mipsel,
  Powerpc64,
  Powerpc64le,
  S390x,
  Wasm32,
}

impl Arch {
  pub fn as_str(&self) -> &'static str {
    match self {
      Arch::X86_64 => "x86_64",
      Arch::I686 => "i686",
      Arch::Aarch64 => "aarch64",
      Arch::Armv7 => "armv7",
      Arch::Riscv32 => "riscv32",
      Arch::Riscv64 => "riscv64",
      Arch::Mips => "mips",
      Arch::Mipsel => "mipsel",
      Arch::Powerpc64 => "powerpc64",
      Arch::Powerpc64le => "powerpc64le",
      Arch::S390x => "s390x",
      Arch::Wasm32 => "wasm32",
    }
  }

  pub fn from_str(s: &str) -> Option<Arch> {
    match s {
      "x86_64" | "amd64" => Some(Arch::X86_64),
      "i686" | "i386" | "i586" => Some(Arch::I686),
      "aarch64" | "arm64" => Some(Arch::Aarch64),
      "armv7" | "armv7l" | "arm" => Some(Arch::Armv7),
      "riscv32" => Some(Arch::Riscv32),
      "riscv64" => Some(Arch::Riscv64),
      "mips" => Some(Arch::Mips),
      "mipsel" => Some(Arch::Mipsel),
      "powerpc64" | "ppc64" => Some(Arch::Powerpc64),
      "powerpc64le" | "ppc64le" => Some(Arch::Powerpc64le),
      "s390x" => Some(Arch::S390x),
      "wasm32" => Some(Arch::Wasm32),
      _ => None,
    }
  }
}

impl fmt::Display for Arch {
  fn fmt(
    &self,
    f: &mut fmt::Formatter<'_>,
  ) -> fmt::Result {
    f.write_str(self.as_str())
  }
}

#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Os {
  Linux,
  Darwin,
  Freebsd,
  Windows,
  Bare,
}

impl Os {
  pub fn as_str(&self) -> &'static str {
    match self {
      Os::Linux => "linux",
      Os::Darwin => "darwin",
      Os::Freebsd => "freebsd",
      Os::Windows => "windows",
      Os::Bare => "none",
    }
  }

  pub fn from_str(s: &str) -> Option<Os> {
    // OS components may carry a version suffix, e.g. "darwin24.3.0"
    // or "freebsd14". Strip trailing digits and a dot-version first.
    let base = strip_os_version(s);

    match base {
      "linux" => Some(Os::Linux),
      "darwin" | "macos" | "macosx" => Some(Os::Darwin),
      "freebsd" => Some(Os::Freebsd),
      "windows" => Some(Os::Windows),
      "none" | "unknown" | "bare" => Some(Os::Bare),
      _ => None,
    }
  }
}

impl fmt::Display for Os {
  fn fmt(
    &self,
    f: &mut fmt::Formatter<'_>,
  ) -> fmt::Result {
    f.write_str(self.as_str())
  }
}

/// Strip a trailing version from an OS component: "darwin24.3.0" -> "darwin".
fn strip_os_version(s: &str) -> &str {
  let end = s
    .char_indices()
    .find(|(_, ch)| ch.is_ascii_digit())
    .map(|(i, _)| i)
    .unwrap_or(s.len());

  &s[..end]
}

#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EnvAbi {
  Gnu,
  Gnueabihf,
  Musl,
  Musleabihf,
  Android,
  Msvc,
  Mingw32,
  Eabi,
  Eabihf,
  Macho,
}

impl EnvAbi {
  pub fn as_str(&self) -> &'static str {
    match self {
      EnvAbi::Gnu => "gnu",
      EnvAbi::Gnueabihf => "gnueabihf",
      EnvAbi::Musl => "musl",
      EnvAbi::Musleabihf => "musleabihf",
      EnvAbi::Android => "android",
      EnvAbi::Msvc => "msvc",
      EnvAbi::Mingw32 => "mingw32",
      EnvAbi::Eabi => "eabi",
      EnvAbi::Eabihf => "eabihf",
      EnvAbi::Macho => "macho",
    }
  }

  pub fn from_str(s: &str) -> Option<EnvAbi> {
    match s {
      "gnu" => Some(EnvAbi::Gnu),
      "gnueabihf" => Some(EnvAbi::Gnueabihf),
      "musl" => Some(EnvAbi::Musl),
      "musleabihf" => Some(EnvAbi::Musleabihf),
      "android" | "androideabi" => Some(EnvAbi::Android),
      "msvc" => Some(EnvAbi::Msvc),
      "mingw32" => Some(EnvAbi::Mingw32),
      "eabi" => Some(EnvAbi::Eabi),
      "eabihf" => Some(EnvAbi::Eabihf),
      "macho" => Some(EnvAbi::Macho),
      _ => None,
    }
  }
}

impl fmt::Display for EnvAbi {
  fn fmt(
    &self,
    f: &mut fmt::Formatter<'_>,
  ) -> fmt::Result {
    f.write_str(self.as_str())
  }
}

/// A target triple: `arch[-vendor]-os[-env]`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Triple {
  pub arch: Arch,
  pub vendor: Option<String>,
  pub os: Os,
  pub env: Option<EnvAbi>,
}

impl Triple {
  /// Parse a triple string. Accepts 2-, 3- and 4-field forms.
  ///
  /// The 3-field form is ambiguous between `arch-os-env` and
  /// `arch-vendor-os`; it is resolved by probing whether the middle
  /// field names a known OS.
  pub fn parse(s: &str) -> Option<Triple> {
    let parts: Vec<&str> = s.split('-').collect();

    match parts.as_slice() {
      [arch, os] => Some(Triple {
        arch: Arch::from_str(arch)?,
        vendor: None,
        os: Os::from_str(os)?,
        env: None,
      }),

      [arch, middle, last] => {
        let arch = Arch::from_str(arch)?;

        if let Some(os) = Os::from_str(middle) {
          Some(Triple {
            arch,
            vendor: None,
            os,
            env: EnvAbi::from_str(last),
          })
        } else {
          Some(Triple {
            arch,
            vendor: Some(middle.to_string()),
            os: Os::from_str(last)?,
            env: None,
          })
        }
      },

      [arch, vendor, os, env] => Some(Triple {
        arch: Arch::from_str(arch)?,
        vendor: Some(vendor.to_string()),
        os: Os::from_str(os)?,
        env: EnvAbi::from_str(env),
      }),

      _ => None,
    }
  }
}

impl fmt::Display for Triple {
  fn fmt(
    &self,
    f: &mut fmt::Formatter<'_>,
  ) -> fmt::Result {
    write!(f, "{}", self.arch)?;

    if let Some(vendor) = &self.vendor {
      write!(f, "-{}", vendor)?;
    }

    write!(f, "-{}", self.os)?;

    if let Some(env) = &self.env {
      write!(f, "-{}", env)?;
    }

    Ok(())
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_arch_round_trip() {
    let all = [
      Arch::X86_64,
      Arch::I686,
      Arch::Aarch64,
      Arch::Armv7,
      Arch::Riscv32,
      Arch::Riscv64,
      Arch::Mips,
      Arch::Mipsel,
      Arch::Powerpc64,
      Arch::Powerpc64le,
      Arch::S390x,
      Arch::Wasm32,
    ];

    for arch in all {
      assert_eq!(Arch::from_str(arch.as_str()), Some(arch));
    }
  }

  #[test]
  fn test_os_round_trip() {
    for os in [Os::Linux, Os::Darwin, Os::Freebsd, Os::Windows, Os::Bare] {
      assert_eq!(Os::from_str(os.as_str()), Some(os));
    }
  }

  #[test]
  fn test_env_round_trip() {
    let all = [
      EnvAbi::Gnu,
      EnvAbi::Gnueabihf,
      EnvAbi::Musl,
      EnvAbi::Musleabihf,
      EnvAbi::Android,
      EnvAbi::Msvc,
      EnvAbi::Mingw32,
      EnvAbi::Eabi,
      EnvAbi::Eabihf,
      EnvAbi::Macho,
    ];

    for env in all {
      assert_eq!(EnvAbi::from_str(env.as_str()), Some(env));
    }
  }

  #[test]
  fn test_parse_four_part_triple() {
    let triple = Triple::parse("x86_64-unknown-linux-gnu").unwrap();

    assert_eq!(triple.arch, Arch::X86_64);
    assert_eq!(triple.vendor, Some("unknown".to_string()));
    assert_eq!(triple.os, Os::Linux);
    assert_eq!(triple.env, Some(EnvAbi::Gnu));
  }

  #[test]
  fn test_parse_three_part_arch_os_env() {
    let triple = Triple::parse("aarch64-linux-gnu").unwrap();

    assert_eq!(triple.arch, Arch::Aarch64);
    assert_eq!(triple.vendor, None);
    assert_eq!(triple.os, Os::Linux);
    assert_eq!(triple.env, Some(EnvAbi::Gnu));
  }

  #[test]
  fn test_parse_three_part_arch_vendor_os() {
    let triple = Triple::parse("aarch64-apple-darwin24.3.0").unwrap();

    assert_eq!(triple.arch, Arch::Aarch64);
    assert_eq!(triple.vendor, Some("apple".to_string()));
    assert_eq!(triple.os, Os::Darwin);
    assert_eq!(triple.env, None);
  }

  #[test]
  fn test_parse_two_part_triple() {
    let triple = Triple::parse("riscv64-linux").unwrap();

    assert_eq!(triple.arch, Arch::Riscv64);
    assert_eq!(triple.os, Os::Linux);
    assert_eq!(triple.env, None);
  }

  #[test]
  fn test_parse_rejects_unknown_arch() {
    assert!(Triple::parse("vax-unknown-linux-gnu").is_none());
    assert!(Triple::parse("x86_64").is_none());
  }

  #[test]
  fn test_display_reparses_to_same_value() {
    for s in [
      "x86_64-unknown-linux-gnu",
      "aarch64-linux-gnu",
      "aarch64-apple-darwin24.3.0",
      "armv7-linux-gnueabihf",
      "wasm32-unknown-none",
    ] {
      let parsed = Triple::parse(s).unwrap();
      let reparsed = Triple::parse(&parsed.to_string()).unwrap();
      assert_eq!(parsed, reparsed);
    }
  }

  #[test]
  fn test_os_version_suffix_stripped() {
    assert_eq!(Os::from_str("darwin24.3.0"), Some(Os::Darwin));
    assert_eq!(Os::from_str("freebsd14"), Some(Os::Freebsd));
    assert_eq!(Os::from_str("linux"), Some(Os::Linux));
  }
}
