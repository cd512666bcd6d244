//! The artifact manifest written at the end of a build.

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::consts::ARTIFACT_MANIFEST_FILE;
use crate::context::DistFile;
use crate::drivers::ProducedArtifact;
use crate::error::BuildError;
use crate::util::hash::{ContentHash, hash_path};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArtifactManifest {
  pub artifacts: Vec<ManifestEntry>,
  pub dist_files: Vec<ManifestEntry>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ManifestEntry {
  /// Artifact kind, or the relative destination for dist files.
  pub name: String,
  pub path: PathBuf,
  pub sha256: ContentHash,
}

impl ManifestEntry {
  fn for_path(name: String, path: &Path) -> Result<Self, BuildError> {
    Ok(Self {
      name,
      path: path.to_path_buf(),
      sha256: hash_path(path)?,
    })
  }
}

/// Digest everything that was produced and write `artifacts.json` into `dir`.
///
/// Uses atomic write (temp file, then rename). Returns the manifest path.
pub fn write_artifact_manifest(
  dir: &Path,
  produced: &[ProducedArtifact],
  dist_files: &[DistFile],
) -> Result<PathBuf, BuildError> {
  let manifest = ArtifactManifest {
    artifacts: produced
      .iter()
      .map(|p| ManifestEntry::for_path(p.kind.to_string(), &p.path))
      .collect::<Result<_, _>>()?,
    dist_files: dist_files
      .iter()
      .map(|f| ManifestEntry::for_path(f.relative_dest.clone(), &f.source))
      .collect::<Result<_, _>>()?,
  };

  fs::create_dir_all(dir).map_err(|e| BuildError::io(dir, e))?;
  let path = dir.join(ARTIFACT_MANIFEST_FILE);
  let temp_path = path.with_extension("json.tmp");

  let content = serde_json::to_string_pretty(&manifest)?;
  fs::write(&temp_path, content).map_err(|e| BuildError::io(&temp_path, e))?;
  fs::rename(&temp_path, &path).map_err(|e| BuildError::io(&path, e))?;

  debug!(artifacts = manifest.artifacts.len(), dist_files = manifest.dist_files.len(), "manifest entries");
  info!(path = %path.display(), "wrote artifact manifest");
  Ok(path)
}
