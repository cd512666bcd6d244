//! SHA-256 digests of produced artifacts.
//!
//! A dist file may point at a single file or at a whole laid-out tree; both
//! get a [`ContentHash`] through [`hash_path`].

use std::fs::{self, File};
use std::io;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use sha2::digest::Output;
use sha2::{Digest, Sha256};
use thiserror::Error;
use walkdir::WalkDir;

/// Lowercase hex SHA-256 (64 characters).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ContentHash(pub String);

impl std::fmt::Display for ContentHash {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    f.write_str(&self.0)
  }
}

#[derive(Debug, Error)]
pub enum HashError {
  #[error("failed to read {path}: {source}")]
  Read {
    path: PathBuf,
    #[source]
    source: io::Error,
  },

  #[error("failed to walk {root}: {source}")]
  Walk {
    root: PathBuf,
    #[source]
    source: walkdir::Error,
  },
}

/// Digest a file's contents, or a directory tree via [`hash_tree`].
pub fn hash_path(path: &Path) -> Result<ContentHash, HashError> {
  if path.is_dir() { hash_tree(path) } else { hash_file(path) }
}

pub fn hash_file(path: &Path) -> Result<ContentHash, HashError> {
  Ok(ContentHash(hex::encode(file_digest(path)?)))
}

/// Digest of a directory tree that does not depend on where the tree lives.
///
/// Every entry contributes its kind, its `/`-separated path relative to
/// `root`, and its content digest (files) or link target (symlinks).
/// Timestamps and permissions are ignored.
pub fn hash_tree(root: &Path) -> Result<ContentHash, HashError> {
  let mut hasher = Sha256::new();

  for entry in WalkDir::new(root).min_depth(1).sort_by_file_name() {
    let entry = entry.map_err(|source| HashError::Walk {
      root: root.to_path_buf(),
      source,
    })?;
    let key = relative_key(root, entry.path());
    let file_type = entry.file_type();

    if file_type.is_dir() {
      hasher.update(b"dir\0");
      hasher.update(key.as_bytes());
    } else if file_type.is_file() {
      hasher.update(b"file\0");
      hasher.update(key.as_bytes());
      hasher.update(b"\0");
      hasher.update(file_digest(entry.path())?);
    } else if file_type.is_symlink() {
      let target = fs::read_link(entry.path()).map_err(|source| HashError::Read {
        path: entry.path().to_path_buf(),
        source,
      })?;
      hasher.update(b"link\0");
      hasher.update(key.as_bytes());
      hasher.update(b"\0");
      hasher.update(target.to_string_lossy().as_bytes());
    } else {
      // sockets, fifos and devices are not distributable
      continue;
    }
    hasher.update(b"\n");
  }

  Ok(ContentHash(hex::encode(hasher.finalize())))
}

fn file_digest(path: &Path) -> Result<Output<Sha256>, HashError> {
  let read_error = |source| HashError::Read {
    path: path.to_path_buf(),
    source,
  };
  let mut file = File::open(path).map_err(read_error)?;
  let mut hasher = Sha256::new();
  io::copy(&mut file, &mut hasher).map_err(read_error)?;
  Ok(hasher.finalize())
}

fn relative_key(root: &Path, path: &Path) -> String {
  path
    .strip_prefix(root)
    .unwrap_or(path)
    .components()
    .map(|c| c.as_os_str().to_string_lossy())
    .collect::<Vec<_>>()
    .join("/")
}
