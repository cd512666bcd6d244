//! Product metadata.
//!
//! The product file is a small JSON document describing what is being
//! distributed and where its prepared layout directories live:
//!
//! ```json
//! {
//!   "name": "Example IDE",
//!   "version": "2026.2",
//!   "base_file_name": "example-ide",
//!   "compile_command": "make modules",
//!   "layout": { "common": "dist.all", "linux": "dist.unix", "docs": "help" }
//! }
//! ```
//!
//! Relative layout paths resolve against the directory holding the file.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;
use crate::platform::os::Os;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProductProperties {
  pub name: String,
  pub version: String,

  /// Prefix for every produced distribution directory.
  pub base_file_name: String,

  /// Shell command that compiles the product's modules.
  #[serde(default)]
  pub compile_command: Option<String>,

  #[serde(default)]
  pub layout: ProductLayout,

  /// Directory the product file was loaded from.
  #[serde(skip)]
  pub home: PathBuf,
}

/// Source directories for each kind of artifact.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProductLayout {
  /// Content shared by every OS distribution.
  #[serde(default = "default_common")]
  pub common: PathBuf,
  #[serde(default = "default_linux")]
  pub linux: PathBuf,
  #[serde(default = "default_mac")]
  pub mac: PathBuf,
  #[serde(default = "default_windows")]
  pub windows: PathBuf,
  #[serde(default = "default_docs")]
  pub docs: PathBuf,
  #[serde(default = "default_maven")]
  pub maven: PathBuf,
}

fn default_common() -> PathBuf {
  PathBuf::from("dist.all")
}

fn default_linux() -> PathBuf {
  PathBuf::from("dist.linux")
}

fn default_mac() -> PathBuf {
  PathBuf::from("dist.mac")
}

fn default_windows() -> PathBuf {
  PathBuf::from("dist.windows")
}

fn default_docs() -> PathBuf {
  PathBuf::from("docs")
}

fn default_maven() -> PathBuf {
  PathBuf::from("maven")
}

impl Default for ProductLayout {
  fn default() -> Self {
    Self {
      common: default_common(),
      linux: default_linux(),
      mac: default_mac(),
      windows: default_windows(),
      docs: default_docs(),
      maven: default_maven(),
    }
  }
}

impl ProductLayout {
  pub fn os_dir(&self, os: Os) -> &Path {
    match os {
      Os::Linux => &self.linux,
      Os::Mac => &self.mac,
      Os::Windows => &self.windows,
    }
  }
}

impl ProductProperties {
  /// Load and validate a product file.
  pub fn load(path: &Path) -> Result<Self, ConfigError> {
    let content = std::fs::read_to_string(path).map_err(|source| ConfigError::ReadProduct {
      path: path.to_path_buf(),
      source,
    })?;
    let mut product: ProductProperties =
      serde_json::from_str(&content).map_err(|source| ConfigError::ParseProduct {
        path: path.to_path_buf(),
        source,
      })?;
    product.home = path.parent().map(Path::to_path_buf).unwrap_or_default();
    product.validate()?;
    Ok(product)
  }

  /// Reject metadata no build can proceed with.
  pub fn validate(&self) -> Result<(), ConfigError> {
    if self.name.trim().is_empty() {
      return Err(ConfigError::MissingProperty("name"));
    }
    if self.version.trim().is_empty() {
      return Err(ConfigError::MissingProperty("version"));
    }
    if self.base_file_name.trim().is_empty() {
      return Err(ConfigError::MissingProperty("base_file_name"));
    }
    if self.base_file_name.contains(['/', '\\']) || self.base_file_name.starts_with('.') {
      return Err(ConfigError::InvalidProperty {
        name: "base_file_name",
        reason: format!("'{}' must be a plain file name", self.base_file_name),
      });
    }
    Ok(())
  }

  /// Resolve a layout path against the product home.
  pub fn resolve(&self, path: &Path) -> PathBuf {
    if path.is_absolute() { path.to_path_buf() } else { self.home.join(path) }
  }

  /// Directory name of the distribution produced for `os`.
  pub fn os_distribution_name(&self, os: Os) -> String {
    format!("{}-{}", self.base_file_name, os)
  }
}
