//! A driver that lays out prepared directories.
//!
//! Every existing source directory is copied, in order, into
//! `target_dir/<name>`; later sources overwrite files from earlier ones, so an
//! OS-specific directory can override the shared content.

use std::fs;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use tracing::{debug, info};
use walkdir::WalkDir;

use super::{ArtifactKind, DistributionBuilder};
use crate::context::{BuildContext, DistFile};
use crate::error::BuildError;

#[derive(Debug, Clone)]
pub struct LayoutBuilder {
  kind: ArtifactKind,
  name: String,
  sources: Vec<PathBuf>,
}

impl LayoutBuilder {
  pub fn new(kind: ArtifactKind, name: impl Into<String>, sources: Vec<PathBuf>) -> Self {
    Self {
      kind,
      name: name.into(),
      sources,
    }
  }
}

#[async_trait]
impl DistributionBuilder for LayoutBuilder {
  fn kind(&self) -> ArtifactKind {
    self.kind
  }

  async fn build(&self, ctx: &BuildContext, target_dir: &Path) -> Result<Option<PathBuf>, BuildError> {
    let existing: Vec<PathBuf> = self.sources.iter().filter(|p| p.is_dir()).cloned().collect();
    if existing.is_empty() {
      info!(kind = %self.kind, "no layout sources found, nothing to build");
      return Ok(None);
    }

    let out = target_dir.join(&self.name);
    let dest = out.clone();
    let copied = tokio::task::spawn_blocking(move || copy_layout(&existing, &dest))
      .await
      .map_err(|e| BuildError::driver(self.kind.to_string(), e.to_string()))??;

    info!(kind = %self.kind, files = copied, path = %out.display(), "layout complete");
    ctx.add_dist_file(DistFile::new(&out, self.name.clone()));
    Ok(Some(out))
  }
}

/// Copy every source tree into a fresh `dest`. Returns the number of files.
fn copy_layout(sources: &[PathBuf], dest: &Path) -> Result<usize, BuildError> {
  if dest.exists() {
    fs::remove_dir_all(dest).map_err(|e| BuildError::io(dest, e))?;
  }
  fs::create_dir_all(dest).map_err(|e| BuildError::io(dest, e))?;

  let mut copied = 0;
  for source in sources {
    debug!(source = %source.display(), dest = %dest.display(), "copying layout source");
    for entry in WalkDir::new(source).sort_by_file_name() {
      let entry = entry.map_err(|e| BuildError::driver(source.display().to_string(), e.to_string()))?;
      let rel = entry.path().strip_prefix(source).unwrap_or(entry.path());
      if rel.as_os_str().is_empty() {
        continue;
      }
      let target = dest.join(rel);
      if entry.file_type().is_dir() {
        fs::create_dir_all(&target).map_err(|e| BuildError::io(&target, e))?;
      } else {
        fs::copy(entry.path(), &target).map_err(|e| BuildError::io(entry.path(), e))?;
        copied += 1;
      }
    }
  }
  Ok(copied)
}
