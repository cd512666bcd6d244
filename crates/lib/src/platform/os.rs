use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::steps::StepId;

/// Operating systems a distribution can be built for
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Os {
  Linux,
  Mac,
  Windows,
}

impl Os {
  pub const ALL: [Os; 3] = [Os::Linux, Os::Mac, Os::Windows];

  /// Detect the current operating system at runtime
  pub fn current() -> Option<Self> {
    match std::env::consts::OS {
      "linux" => Some(Self::Linux),
      "macos" => Some(Self::Mac),
      "windows" => Some(Self::Windows),
      _ => None,
    }
  }

  /// Returns the lowercase string identifier for this OS
  pub fn as_str(&self) -> &'static str {
    match self {
      Self::Linux => "linux",
      Self::Mac => "mac",
      Self::Windows => "windows",
    }
  }

  /// The step that gates this OS's distribution
  pub fn step(&self) -> StepId {
    match self {
      Self::Linux => StepId::LinuxArtifacts,
      Self::Mac => StepId::MacArtifacts,
      Self::Windows => StepId::WindowsArtifacts,
    }
  }
}

impl fmt::Display for Os {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "{}", self.as_str())
  }
}

impl FromStr for Os {
  type Err = ();

  fn from_str(s: &str) -> Result<Self, Self::Err> {
    Self::ALL.into_iter().find(|os| os.as_str() == s).ok_or(())
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn current_returns_supported_os() {
    // Verifies we're running on a supported OS
    assert!(Os::current().is_some(), "Current OS should be supported");
  }

  #[test]
  fn each_os_has_its_own_step() {
    assert_eq!(Os::Linux.step(), StepId::LinuxArtifacts);
    assert_eq!(Os::Mac.step(), StepId::MacArtifacts);
    assert_eq!(Os::Windows.step(), StepId::WindowsArtifacts);
  }

  #[test]
  fn mac_uses_short_identifier() {
    assert_eq!("mac".parse::<Os>(), Ok(Os::Mac));
    assert!("darwin".parse::<Os>().is_err());
  }
}
