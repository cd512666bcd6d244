pub mod os;

use std::fmt;
use std::str::FromStr;

use os::Os;

use crate::error::ConfigError;

/// Which OS distributions an invocation should build.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TargetOs {
  /// Every supported OS.
  #[default]
  All,
  /// No OS distributions at all; only OS-independent steps run.
  None,
  Only(Os),
}

impl TargetOs {
  pub fn includes(&self, os: Os) -> bool {
    match self {
      TargetOs::All => true,
      TargetOs::None => false,
      TargetOs::Only(only) => *only == os,
    }
  }
}

impl FromStr for TargetOs {
  type Err = ConfigError;

  fn from_str(s: &str) -> Result<Self, Self::Err> {
    match s {
      "all" => Ok(TargetOs::All),
      "none" => Ok(TargetOs::None),
      "current" => Os::current()
        .map(TargetOs::Only)
        .ok_or_else(|| ConfigError::UnsupportedHost(std::env::consts::OS.to_string())),
      other => other
        .parse::<Os>()
        .map(TargetOs::Only)
        .map_err(|_| ConfigError::UnknownTargetOs(other.to_string())),
    }
  }
}

impl fmt::Display for TargetOs {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      TargetOs::All => f.write_str("all"),
      TargetOs::None => f.write_str("none"),
      TargetOs::Only(os) => write!(f, "{}", os),
    }
  }
}
