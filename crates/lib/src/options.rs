//! Build options: the configuration surface consumed by a build session.
//!
//! Options come from `SHIPYARD_*` environment variables and are then
//! overridden by command-line flags. Once a [`BuildSession`](crate::context::BuildSession)
//! is created from them they are frozen.

use std::path::PathBuf;

use crate::consts::{
  ENV_JOBS, ENV_JOIN_ORDER, ENV_OUTPUT_DIR, ENV_PARALLEL, ENV_SKIP_STEPS, ENV_TARGET_OS, OUTPUT_DIR,
};
use crate::error::ConfigError;
use crate::platform::TargetOs;
use crate::schedule::JoinOrder;
use crate::steps::SkipSet;

#[derive(Debug, Clone)]
pub struct BuildOptions {
  /// Which OS distributions to build.
  pub target_os: TargetOs,

  /// Steps to bypass for this invocation.
  pub skip_steps: SkipSet,

  /// Run independent steps concurrently. When false every batch runs in
  /// input order on the calling task and stops at the first failure.
  pub parallel: bool,

  /// Maximum number of tasks running at once in parallel mode.
  pub parallelism: usize,

  /// Order in which parallel task handles are joined.
  pub join_order: JoinOrder,

  /// Root directory for everything the build writes.
  pub output_dir: PathBuf,
}

impl Default for BuildOptions {
  fn default() -> Self {
    Self {
      target_os: TargetOs::All,
      skip_steps: SkipSet::new(),
      parallel: true,
      parallelism: num_cpus(),
      join_order: JoinOrder::default(),
      output_dir: PathBuf::from(OUTPUT_DIR),
    }
  }
}

impl BuildOptions {
  /// Defaults overridden by any `SHIPYARD_*` variables that are set.
  pub fn from_env() -> Result<Self, ConfigError> {
    let mut options = Self::default();

    if let Some(value) = env_var(ENV_TARGET_OS) {
      options.target_os = value.parse()?;
    }
    if let Some(value) = env_var(ENV_SKIP_STEPS) {
      options.skip_steps = SkipSet::parse(&value)?;
    }
    if let Some(value) = env_var(ENV_PARALLEL) {
      options.parallel = parse_bool(ENV_PARALLEL, &value)?;
    }
    if let Some(value) = env_var(ENV_JOBS) {
      options.parallelism = parse_jobs(ENV_JOBS, &value)?;
    }
    if let Some(value) = env_var(ENV_JOIN_ORDER) {
      options.join_order = value.parse()?;
    }
    if let Some(value) = env_var(ENV_OUTPUT_DIR) {
      options.output_dir = PathBuf::from(value);
    }

    Ok(options)
  }
}

fn env_var(key: &str) -> Option<String> {
  std::env::var(key).ok().filter(|v| !v.trim().is_empty())
}

pub fn parse_bool(key: &str, value: &str) -> Result<bool, ConfigError> {
  match value.trim().to_ascii_lowercase().as_str() {
    "1" | "true" | "yes" | "on" => Ok(true),
    "0" | "false" | "no" | "off" => Ok(false),
    _ => Err(ConfigError::InvalidValue {
      key: key.to_string(),
      value: value.to_string(),
      reason: "expected true or false".to_string(),
    }),
  }
}

pub fn parse_jobs(key: &str, value: &str) -> Result<usize, ConfigError> {
  match value.trim().parse::<usize>() {
    Ok(n) if n > 0 => Ok(n),
    _ => Err(ConfigError::InvalidValue {
      key: key.to_string(),
      value: value.to_string(),
      reason: "expected a positive integer".to_string(),
    }),
  }
}

/// Get the number of CPUs for default parallelism.
fn num_cpus() -> usize {
  std::thread::available_parallelism().map(|p| p.get()).unwrap_or(4)
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::platform::os::Os;
  use crate::steps::StepId;
  use serial_test::serial;

  const ALL_VARS: [&str; 6] = [
    ENV_TARGET_OS,
    ENV_SKIP_STEPS,
    ENV_PARALLEL,
    ENV_JOBS,
    ENV_JOIN_ORDER,
    ENV_OUTPUT_DIR,
  ];

  fn with_env<F: FnOnce()>(vars: &[(&str, &str)], f: F) {
    let all: Vec<(&str, Option<&str>)> = ALL_VARS
      .iter()
      .map(|key| (*key, vars.iter().find(|(k, _)| k == key).map(|(_, v)| *v)))
      .collect();
    temp_env::with_vars(all, f);
  }

  #[test]
  fn default_options() {
    let options = BuildOptions::default();
    assert_eq!(options.target_os, TargetOs::All);
    assert!(options.skip_steps.is_empty());
    assert!(options.parallel);
    assert!(options.parallelism >= 1);
    assert_eq!(options.join_order, JoinOrder::Reverse);
    assert_eq!(options.output_dir, PathBuf::from("out"));
  }

  #[test]
  #[serial]
  fn unset_environment_gives_defaults() {
    with_env(&[], || {
      let options = BuildOptions::from_env().unwrap();
      assert_eq!(options.target_os, TargetOs::All);
      assert!(options.parallel);
    });
  }

  #[test]
  #[serial]
  fn environment_overrides_defaults() {
    with_env(
      &[
        (ENV_TARGET_OS, "linux"),
        (ENV_SKIP_STEPS, "documentation,maven_artifacts"),
        (ENV_PARALLEL, "false"),
        (ENV_JOBS, "3"),
        (ENV_JOIN_ORDER, "submission"),
        (ENV_OUTPUT_DIR, "/tmp/dist"),
      ],
      || {
        let options = BuildOptions::from_env().unwrap();
        assert_eq!(options.target_os, TargetOs::Only(Os::Linux));
        assert!(options.skip_steps.contains(StepId::Documentation));
        assert!(options.skip_steps.contains(StepId::MavenArtifacts));
        assert!(!options.parallel);
        assert_eq!(options.parallelism, 3);
        assert_eq!(options.join_order, JoinOrder::Submission);
        assert_eq!(options.output_dir, PathBuf::from("/tmp/dist"));
      },
    );
  }

  #[test]
  #[serial]
  fn unknown_skip_token_in_environment_is_rejected() {
    with_env(&[(ENV_SKIP_STEPS, "documentation,docs")], || {
      assert!(matches!(
        BuildOptions::from_env(),
        Err(ConfigError::UnknownStep(token)) if token == "docs"
      ));
    });
  }

  #[test]
  #[serial]
  fn zero_jobs_is_rejected() {
    with_env(&[(ENV_JOBS, "0")], || {
      assert!(matches!(
        BuildOptions::from_env(),
        Err(ConfigError::InvalidValue { key, .. }) if key == ENV_JOBS
      ));
    });
  }

  #[test]
  fn parse_bool_accepts_common_spellings() {
    assert!(parse_bool("k", "YES").unwrap());
    assert!(!parse_bool("k", "0").unwrap());
    assert!(parse_bool("k", "maybe").is_err());
  }
}
