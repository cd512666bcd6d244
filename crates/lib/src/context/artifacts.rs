//! The shared artifact registry.

use std::path::{Path, PathBuf};
use std::sync::{Mutex, PoisonError};

use serde::{Deserialize, Serialize};

/// A file or directory to include in the final packaging, and where it goes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DistFile {
  pub source: PathBuf,
  /// Destination directory relative to the distribution root.
  pub relative_dest: String,
}

impl DistFile {
  pub fn new(source: impl Into<PathBuf>, relative_dest: impl Into<String>) -> Self {
    Self {
      source: source.into(),
      relative_dest: relative_dest.into(),
    }
  }

  pub fn source(&self) -> &Path {
    &self.source
  }
}

/// Append-only list of [`DistFile`]s shared by every context of a session.
///
/// `add` may be called from any task at any time; entries keep the order in
/// which the appends happened.
#[derive(Debug, Default)]
pub struct ArtifactRegistry {
  entries: Mutex<Vec<DistFile>>,
}

impl ArtifactRegistry {
  pub fn add(&self, entry: DistFile) {
    self.entries.lock().unwrap_or_else(PoisonError::into_inner).push(entry);
  }

  pub fn len(&self) -> usize {
    self.entries.lock().unwrap_or_else(PoisonError::into_inner).len()
  }

  pub fn is_empty(&self) -> bool {
    self.len() == 0
  }

  /// Copy of every entry in append order.
  pub fn snapshot(&self) -> Vec<DistFile> {
    self.entries.lock().unwrap_or_else(PoisonError::into_inner).clone()
  }
}
