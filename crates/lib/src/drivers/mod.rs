//! Distribution drivers.
//!
//! A driver knows how to produce one kind of artifact. The scheduler only
//! sees it through [`DistributionBuilder::build`]: given a context and a
//! target directory it returns the produced path, or `None` when the artifact
//! does not apply to this invocation. Drivers may append to the artifact
//! registry through the context but never change configuration.

pub mod cmd;
pub mod layout;

use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use async_trait::async_trait;
use serde::Serialize;

use crate::context::BuildContext;
use crate::error::BuildError;
use crate::platform::os::Os;
use crate::product::ProductProperties;
use crate::steps::StepId;

pub use layout::LayoutBuilder;

/// What a driver produces.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ArtifactKind {
  Distribution(Os),
  Documentation,
  Maven,
}

impl ArtifactKind {
  pub fn step(&self) -> StepId {
    match self {
      ArtifactKind::Distribution(os) => os.step(),
      ArtifactKind::Documentation => StepId::Documentation,
      ArtifactKind::Maven => StepId::MavenArtifacts,
    }
  }

  pub fn os(&self) -> Option<Os> {
    match self {
      ArtifactKind::Distribution(os) => Some(*os),
      _ => None,
    }
  }
}

impl fmt::Display for ArtifactKind {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      ArtifactKind::Distribution(os) => write!(f, "{} distribution", os),
      ArtifactKind::Documentation => f.write_str("documentation"),
      ArtifactKind::Maven => f.write_str("maven artifacts"),
    }
  }
}

/// A path produced by a driver.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Serialize)]
pub struct ProducedArtifact {
  pub kind: ArtifactKind,
  pub path: PathBuf,
}

#[async_trait]
pub trait DistributionBuilder: Send + Sync {
  fn kind(&self) -> ArtifactKind;

  /// Build into `target_dir`. `Ok(None)` means "not applicable here".
  async fn build(&self, ctx: &BuildContext, target_dir: &Path) -> Result<Option<PathBuf>, BuildError>;
}

/// The drivers available to one build.
#[derive(Clone, Default)]
pub struct DriverSet {
  builders: Vec<Arc<dyn DistributionBuilder>>,
}

impl DriverSet {
  pub fn new() -> Self {
    Self::default()
  }

  pub fn with(mut self, builder: impl DistributionBuilder + 'static) -> Self {
    self.builders.push(Arc::new(builder));
    self
  }

  /// Layout drivers for every OS plus documentation and maven artifacts.
  pub fn from_product(product: &ProductProperties) -> Self {
    let layout = &product.layout;
    let common = product.resolve(&layout.common);

    let mut drivers = Self::new();
    for os in Os::ALL {
      drivers = drivers.with(LayoutBuilder::new(
        ArtifactKind::Distribution(os),
        product.os_distribution_name(os),
        vec![common.clone(), product.resolve(layout.os_dir(os))],
      ));
    }
    drivers
      .with(LayoutBuilder::new(
        ArtifactKind::Documentation,
        "help",
        vec![product.resolve(&layout.docs)],
      ))
      .with(LayoutBuilder::new(
        ArtifactKind::Maven,
        "maven-artifacts",
        vec![product.resolve(&layout.maven)],
      ))
  }

  pub fn builders(&self) -> &[Arc<dyn DistributionBuilder>] {
    &self.builders
  }

  pub fn len(&self) -> usize {
    self.builders.len()
  }

  pub fn is_empty(&self) -> bool {
    self.builders.is_empty()
  }
}

impl fmt::Debug for DriverSet {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.debug_list().entries(self.builders.iter().map(|b| b.kind())).finish()
  }
}
