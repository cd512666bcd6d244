//! Parallel execution with gather-all error semantics.
//!
//! Every task gets a forked context and is spawned onto the runtime, bounded
//! by the session's worker permits. A batch started from inside a parallel
//! task runs under that task's permit rather than taking new ones. All handles are joined (in the configured
//! [`JoinOrder`]) before anything is reported, so one failing task never
//! stops its siblings and no failure is lost.

use std::cmp::Ordering;

use tokio::task::{JoinError, JoinHandle};
use tracing::{Instrument, debug, error};

use super::JoinOrder;
use super::task::BuildTask;
use crate::context::BuildContext;
use crate::error::{AggregateFailure, BuildError, TaskFailure};

struct Submitted<V> {
  index: usize,
  label: String,
  handle: JoinHandle<Result<Option<V>, BuildError>>,
}

pub async fn run<V, C>(
  ctx: &BuildContext,
  tasks: Vec<BuildTask<V>>,
  join_order: JoinOrder,
  mut compare: C,
) -> Result<Vec<V>, BuildError>
where
  V: Send + 'static,
  C: FnMut(&V, &V) -> Ordering,
{
  debug!(tasks = tasks.len(), ?join_order, "running tasks in parallel");

  // Nested batches must not wait on permits their ancestors hold
  let pool = (!ctx.holds_permit()).then(|| ctx.session().pool());
  let mut submitted: Vec<Submitted<V>> = Vec::with_capacity(tasks.len());

  for (index, task) in tasks.into_iter().enumerate() {
    let label = task.label().to_string();
    let task_ctx = ctx.fork(&label).with_permit();
    let span = task_ctx.messages().span().clone();
    let pool = pool.clone();
    let permit_label = label.clone();

    let handle = tokio::spawn(
      async move {
        // Hold the permit until the task finishes
        let _permit = match pool {
          Some(pool) => Some(
            pool
              .acquire_owned()
              .await
              .map_err(|_| BuildError::PoolClosed(permit_label))?,
          ),
          None => None,
        };
        task.execute(&task_ctx).await
      }
      .instrument(span),
    );

    submitted.push(Submitted { index, label, handle });
  }

  if join_order == JoinOrder::Reverse {
    submitted.reverse();
  }

  let mut results = Vec::new();
  let mut failures = Vec::new();

  for Submitted { index, label, handle } in submitted {
    match handle.await {
      Ok(Ok(Some(value))) => results.push(value),
      Ok(Ok(None)) => {}
      Ok(Err(e)) => {
        error!(task = %label, error = %e, "task failed");
        failures.push(TaskFailure { index, label, error: e });
      }
      Err(join_error) => {
        let message = panic_message(join_error);
        error!(task = %label, error = %message, "task panicked");
        failures.push(TaskFailure {
          index,
          error: BuildError::TaskPanicked {
            label: label.clone(),
            message,
          },
          label,
        });
      }
    }
  }

  results.sort_by(&mut compare);

  match failures.len() {
    0 => Ok(results),
    1 => Err(failures.remove(0).error),
    n => {
      debug!(failures = n, "aggregating task failures");
      Err(BuildError::Aggregate(AggregateFailure::new(failures)))
    }
  }
}

fn panic_message(join_error: JoinError) -> String {
  if !join_error.is_panic() {
    return join_error.to_string();
  }
  let payload = join_error.into_panic();
  if let Some(s) = payload.downcast_ref::<&str>() {
    s.to_string()
  } else if let Some(s) = payload.downcast_ref::<String>() {
    s.clone()
  } else {
    "non-string panic payload".to_string()
  }
}
