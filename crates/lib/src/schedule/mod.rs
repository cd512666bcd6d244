//! Running batches of independent build tasks.
//!
//! A batch runs under one of two strategies, picked from the session's
//! `parallel` flag:
//! - [`ExecutionStrategy::FailFast`]: in input order on the calling task,
//!   stopping at the first failure
//! - [`ExecutionStrategy::CollectAll`]: concurrently on the runtime, every
//!   task runs to completion and failures are gathered
//!
//! In parallel mode the output order comes from a caller-supplied total
//! order, never from completion timing, so the same inputs always produce
//! the same result sequence.

pub mod collect_all;
pub mod fail_fast;
pub mod task;

use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

use tracing::debug;

use crate::context::BuildContext;
use crate::error::{BuildError, ConfigError};
use crate::options::BuildOptions;

pub use task::BuildTask;

/// Order in which parallel task handles are joined.
///
/// Joining the most recently submitted task first tends to keep workers busy
/// on a work-stealing runtime; the joined order never affects the results.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum JoinOrder {
  #[default]
  Reverse,
  Submission,
}

impl FromStr for JoinOrder {
  type Err = ConfigError;

  fn from_str(s: &str) -> Result<Self, Self::Err> {
    match s {
      "reverse" => Ok(JoinOrder::Reverse),
      "submission" => Ok(JoinOrder::Submission),
      other => Err(ConfigError::InvalidValue {
        key: "join order".to_string(),
        value: other.to_string(),
        reason: "expected reverse or submission".to_string(),
      }),
    }
  }
}

impl fmt::Display for JoinOrder {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      JoinOrder::Reverse => f.write_str("reverse"),
      JoinOrder::Submission => f.write_str("submission"),
    }
  }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExecutionStrategy {
  FailFast,
  CollectAll { join_order: JoinOrder },
}

impl ExecutionStrategy {
  pub fn for_options(options: &BuildOptions) -> Self {
    if options.parallel {
      ExecutionStrategy::CollectAll {
        join_order: options.join_order,
      }
    } else {
      ExecutionStrategy::FailFast
    }
  }
}

/// Run a batch and return the produced values in their natural order.
pub async fn run_all<V>(ctx: &BuildContext, tasks: Vec<BuildTask<V>>) -> Result<Vec<V>, BuildError>
where
  V: Ord + Send + 'static,
{
  run_all_by(ctx, tasks, Ord::cmp).await
}

/// Run a batch, ordering parallel results with `compare`.
///
/// Sequential results keep input order.
pub async fn run_all_by<V, C>(ctx: &BuildContext, tasks: Vec<BuildTask<V>>, compare: C) -> Result<Vec<V>, BuildError>
where
  V: Send + 'static,
  C: FnMut(&V, &V) -> Ordering,
{
  if tasks.is_empty() {
    return Ok(Vec::new());
  }

  let strategy = ExecutionStrategy::for_options(ctx.options());
  debug!(?strategy, tasks = tasks.len(), "scheduling batch");

  match strategy {
    ExecutionStrategy::FailFast => fail_fast::run(ctx, tasks).await,
    ExecutionStrategy::CollectAll { join_order } => collect_all::run(ctx, tasks, join_order, compare).await,
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::context::BuildSession;
  use crate::steps::{SkipSet, StepId};
  use crate::util::testutil::{test_options, test_product};

  fn ctx(parallel: bool, skip: &[StepId]) -> BuildContext {
    let mut options = test_options();
    options.parallel = parallel;
    options.skip_steps = skip.iter().copied().collect::<SkipSet>();
    BuildSession::new(options, test_product()).unwrap().root_context()
  }

  #[test]
  fn strategy_follows_parallel_flag() {
    let mut options = test_options();
    options.parallel = false;
    assert_eq!(ExecutionStrategy::for_options(&options), ExecutionStrategy::FailFast);

    options.parallel = true;
    options.join_order = JoinOrder::Submission;
    assert_eq!(
      ExecutionStrategy::for_options(&options),
      ExecutionStrategy::CollectAll {
        join_order: JoinOrder::Submission
      }
    );
  }

  #[test]
  fn join_order_parses() {
    assert_eq!("reverse".parse::<JoinOrder>().unwrap(), JoinOrder::Reverse);
    assert_eq!("submission".parse::<JoinOrder>().unwrap(), JoinOrder::Submission);
    assert!("random".parse::<JoinOrder>().is_err());
  }

  #[tokio::test]
  async fn empty_batch_returns_immediately() {
    for parallel in [true, false] {
      let results: Vec<String> = run_all(&ctx(parallel, &[]), Vec::new()).await.unwrap();
      assert!(results.is_empty());
    }
  }

  #[tokio::test]
  async fn sequential_skip_of_failing_step() {
    let ctx = ctx(false, &[StepId::Documentation]);
    let tasks = vec![
      BuildTask::new(StepId::Documentation, "stepX", |_| async {
        Err(BuildError::driver("stepX", "must not run"))
      }),
      BuildTask::new(StepId::MavenArtifacts, "stepY", |_| async { Ok(Some("a".to_string())) }),
    ];

    let results = run_all(&ctx, tasks).await.unwrap();
    assert_eq!(results, ["a"]);

    let skipped: Vec<_> = ctx
      .session()
      .journal()
      .snapshot()
      .into_iter()
      .filter(|e| e.kind == crate::context::EventKind::Skipped)
      .collect();
    assert_eq!(skipped.len(), 1);
    assert_eq!(skipped[0].step, StepId::Documentation);
    assert_eq!(skipped[0].label, "stepX");
  }

  #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
  async fn run_all_by_uses_caller_order() {
    let ctx = ctx(true, &[]);
    let tasks = (1..=4)
      .map(|n| BuildTask::new(StepId::LinuxArtifacts, format!("n{}", n), move |_| async move { Ok(Some(n)) }))
      .collect();
    let results = run_all_by(&ctx, tasks, |a: &i32, b: &i32| b.cmp(a)).await.unwrap();
    assert_eq!(results, [4, 3, 2, 1]);
  }
}
