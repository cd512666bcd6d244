//! Error types for the build engine.
//!
//! `ConfigError` covers everything that can be wrong before scheduling starts.
//! `BuildError` is what steps, drivers and the scheduler return; a parallel
//! batch with two or more failures collapses them into a single
//! [`BuildError::Aggregate`] without dropping any of them.

use std::fmt;
use std::io;
use std::path::PathBuf;

use thiserror::Error;

use crate::util::hash::HashError;

/// Invalid or missing configuration, detected before any step runs.
#[derive(Debug, Error)]
pub enum ConfigError {
  #[error("unknown build step '{0}' (known steps: {known})", known = crate::steps::StepId::known_list())]
  UnknownStep(String),

  #[error("unknown target os '{0}' (expected one of: all, none, current, linux, mac, windows)")]
  UnknownTargetOs(String),

  #[error("the current operating system ({0}) has no distribution target")]
  UnsupportedHost(String),

  #[error("invalid value for {key}: '{value}' ({reason})")]
  InvalidValue {
    key: String,
    value: String,
    reason: String,
  },

  #[error("product property '{0}' is required")]
  MissingProperty(&'static str),

  #[error("product property '{name}' is invalid: {reason}")]
  InvalidProperty { name: &'static str, reason: String },

  #[error("failed to read product file {path}: {source}")]
  ReadProduct {
    path: PathBuf,
    #[source]
    source: io::Error,
  },

  #[error("failed to parse product file {path}: {source}")]
  ParseProduct {
    path: PathBuf,
    #[source]
    source: serde_json::Error,
  },
}

/// Errors raised while building.
#[derive(Debug, Error)]
pub enum BuildError {
  #[error(transparent)]
  Config(#[from] ConfigError),

  /// I/O failure at a known path.
  #[error("io error at {path}: {source}")]
  Io {
    path: PathBuf,
    #[source]
    source: io::Error,
  },

  /// Command execution failed.
  #[error("command failed with exit code {code:?}: {cmd}")]
  CmdFailed { cmd: String, code: Option<i32> },

  /// A distribution driver reported a failure.
  #[error("{label}: {message}")]
  Driver { label: String, message: String },

  /// A parallel task panicked instead of returning.
  #[error("task '{label}' panicked: {message}")]
  TaskPanicked { label: String, message: String },

  /// The worker pool was shut down while tasks were still queued.
  #[error("worker pool closed before '{0}' could start")]
  PoolClosed(String),

  #[error("failed to compute digest: {0}")]
  Digest(#[from] HashError),

  #[error("failed to serialize artifact manifest: {0}")]
  Serialize(#[from] serde_json::Error),

  #[error(transparent)]
  Aggregate(AggregateFailure),
}

impl BuildError {
  pub fn io(path: impl Into<PathBuf>, source: io::Error) -> Self {
    BuildError::Io {
      path: path.into(),
      source,
    }
  }

  pub fn driver(label: impl Into<String>, message: impl Into<String>) -> Self {
    BuildError::Driver {
      label: label.into(),
      message: message.into(),
    }
  }

  /// Number of original failures this error stands for.
  pub fn failure_count(&self) -> usize {
    match self {
      BuildError::Aggregate(aggregate) => aggregate.len(),
      _ => 1,
    }
  }
}

/// One failed task in a parallel batch.
#[derive(Debug)]
pub struct TaskFailure {
  /// Position of the task in the submitted batch.
  pub index: usize,
  pub label: String,
  pub error: BuildError,
}

/// Two or more independent task failures from one parallel batch.
///
/// Failures are kept in submission order regardless of the order they were
/// joined in.
#[derive(Debug)]
pub struct AggregateFailure {
  failures: Vec<TaskFailure>,
}

impl AggregateFailure {
  pub fn new(mut failures: Vec<TaskFailure>) -> Self {
    failures.sort_by_key(|f| f.index);
    Self { failures }
  }

  pub fn failures(&self) -> &[TaskFailure] {
    &self.failures
  }

  pub fn len(&self) -> usize {
    self.failures.len()
  }

  pub fn is_empty(&self) -> bool {
    self.failures.is_empty()
  }
}

impl fmt::Display for AggregateFailure {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "{} build tasks failed:", self.failures.len())?;
    for failure in &self.failures {
      write!(f, "\n  - {}: {}", failure.label, failure.error)?;
    }
    Ok(())
  }
}

impl std::error::Error for AggregateFailure {}

#[cfg(test)]
mod tests {
  use super::*;

  fn failure(index: usize, label: &str, message: &str) -> TaskFailure {
    TaskFailure {
      index,
      label: label.to_string(),
      error: BuildError::driver(label, message),
    }
  }

  #[test]
  fn aggregate_orders_by_submission_index() {
    let aggregate = AggregateFailure::new(vec![failure(2, "c", "third"), failure(0, "a", "first")]);
    let labels: Vec<_> = aggregate.failures().iter().map(|f| f.label.as_str()).collect();
    assert_eq!(labels, ["a", "c"]);
  }

  #[test]
  fn aggregate_display_enumerates_every_failure() {
    let aggregate = AggregateFailure::new(vec![failure(0, "linux", "disk full"), failure(1, "mac", "no sdk")]);
    let message = BuildError::Aggregate(aggregate).to_string();
    assert!(message.starts_with("2 build tasks failed:"));
    assert!(message.contains("linux: linux: disk full"));
    assert!(message.contains("mac: mac: no sdk"));
  }

  #[test]
  fn failure_count_of_plain_error_is_one() {
    assert_eq!(BuildError::PoolClosed("x".to_string()).failure_count(), 1);
  }
}
