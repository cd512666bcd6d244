//! Build step identifiers and the skip-set.
//!
//! Every independently skippable unit of work is named by a [`StepId`]. The
//! set of steps is closed, so a skip-set coming from the environment or the
//! command line is validated when it is parsed rather than silently ignoring
//! tokens that match nothing.

use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// A named, independently skippable unit of build work.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StepId {
  CompileModules,
  LinuxArtifacts,
  MacArtifacts,
  WindowsArtifacts,
  Documentation,
  MavenArtifacts,
  ArtifactManifest,
}

impl StepId {
  pub const ALL: [StepId; 7] = [
    StepId::CompileModules,
    StepId::LinuxArtifacts,
    StepId::MacArtifacts,
    StepId::WindowsArtifacts,
    StepId::Documentation,
    StepId::MavenArtifacts,
    StepId::ArtifactManifest,
  ];

  /// The token used in skip lists.
  pub fn as_str(&self) -> &'static str {
    match self {
      Self::CompileModules => "compile_modules",
      Self::LinuxArtifacts => "linux_artifacts",
      Self::MacArtifacts => "mac_artifacts",
      Self::WindowsArtifacts => "windows_artifacts",
      Self::Documentation => "documentation",
      Self::MavenArtifacts => "maven_artifacts",
      Self::ArtifactManifest => "artifact_manifest",
    }
  }

  pub fn description(&self) -> &'static str {
    match self {
      Self::CompileModules => "compile product modules",
      Self::LinuxArtifacts => "build the Linux distribution",
      Self::MacArtifacts => "build the macOS distribution",
      Self::WindowsArtifacts => "build the Windows distribution",
      Self::Documentation => "lay out product documentation",
      Self::MavenArtifacts => "lay out maven artifacts",
      Self::ArtifactManifest => "write the artifact manifest",
    }
  }

  pub(crate) fn known_list() -> String {
    Self::ALL.iter().map(StepId::as_str).collect::<Vec<_>>().join(", ")
  }
}

impl fmt::Display for StepId {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(self.as_str())
  }
}

impl FromStr for StepId {
  type Err = ConfigError;

  /// Matches tokens exactly; `Linux_Artifacts` is not `linux_artifacts`.
  fn from_str(s: &str) -> Result<Self, Self::Err> {
    Self::ALL
      .into_iter()
      .find(|step| step.as_str() == s)
      .ok_or_else(|| ConfigError::UnknownStep(s.to_string()))
  }
}

/// The steps to bypass for one build invocation.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SkipSet(BTreeSet<StepId>);

impl SkipSet {
  pub fn new() -> Self {
    Self::default()
  }

  /// Parse a comma-separated list of step tokens.
  ///
  /// Whitespace around tokens and empty entries are ignored; any token that
  /// does not name a step is an error.
  pub fn parse(input: &str) -> Result<Self, ConfigError> {
    input
      .split(',')
      .map(str::trim)
      .filter(|token| !token.is_empty())
      .map(StepId::from_str)
      .collect::<Result<BTreeSet<_>, _>>()
      .map(Self)
  }

  pub fn contains(&self, step: StepId) -> bool {
    self.0.contains(&step)
  }

  pub fn is_empty(&self) -> bool {
    self.0.is_empty()
  }

  pub fn len(&self) -> usize {
    self.0.len()
  }

  pub fn iter(&self) -> impl Iterator<Item = StepId> + '_ {
    self.0.iter().copied()
  }
}

impl FromIterator<StepId> for SkipSet {
  fn from_iter<I: IntoIterator<Item = StepId>>(iter: I) -> Self {
    Self(iter.into_iter().collect())
  }
}

impl fmt::Display for SkipSet {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    let tokens: Vec<_> = self.iter().map(|s| s.as_str()).collect();
    f.write_str(&tokens.join(","))
  }
}
