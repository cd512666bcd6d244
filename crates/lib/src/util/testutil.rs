//! Test utilities for shipyard-lib.

use std::path::{Path, PathBuf};

use crate::options::BuildOptions;
use crate::platform::TargetOs;
use crate::product::{ProductLayout, ProductProperties};
use crate::schedule::JoinOrder;
use crate::steps::SkipSet;

/// Parallel options with a small pool and a throwaway output directory.
pub fn test_options() -> BuildOptions {
  BuildOptions {
    target_os: TargetOs::All,
    skip_steps: SkipSet::new(),
    parallel: true,
    parallelism: 4,
    join_order: JoinOrder::Reverse,
    output_dir: std::env::temp_dir().join("shipyard-test-out"),
  }
}

/// Options writing into `dir`.
pub fn options_in(dir: &Path) -> BuildOptions {
  BuildOptions {
    output_dir: dir.join("out"),
    ..test_options()
  }
}

pub fn test_product() -> ProductProperties {
  ProductProperties {
    name: "Example IDE".to_string(),
    version: "1.0".to_string(),
    base_file_name: "example".to_string(),
    compile_command: None,
    layout: ProductLayout::default(),
    home: PathBuf::new(),
  }
}

/// Product whose layout directories live under `home`.
pub fn product_in(home: &Path) -> ProductProperties {
  ProductProperties {
    home: home.to_path_buf(),
    ..test_product()
  }
}

/// Write a file, creating parent directories.
pub fn write_file(root: &Path, relative: &str, content: &str) {
  let path = root.join(relative);
  if let Some(parent) = path.parent() {
    std::fs::create_dir_all(parent).unwrap();
  }
  std::fs::write(path, content).unwrap();
}

/// A command that exits with the given code; works in sh and PowerShell.
pub fn exit_cmd(code: i32) -> String {
  format!("exit {}", code)
}

/// A command that creates an empty marker file in the working directory.
#[cfg(unix)]
pub fn touch_cmd(filename: &str) -> String {
  format!("/usr/bin/touch {}", filename)
}

#[cfg(windows)]
pub fn touch_cmd(filename: &str) -> String {
  format!("New-Item -ItemType File -Path '{}' -Force | Out-Null", filename)
}
