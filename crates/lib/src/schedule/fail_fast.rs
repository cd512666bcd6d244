//! Sequential execution: tasks run one at a time on the calling task, in
//! input order, and the first failure stops the batch.

use tracing::{Instrument, debug, info_span};

use super::task::BuildTask;
use crate::context::BuildContext;
use crate::error::BuildError;

/// Results come back in input order; skipped tasks and tasks that produced
/// nothing contribute no entry.
pub async fn run<V: Send + 'static>(ctx: &BuildContext, tasks: Vec<BuildTask<V>>) -> Result<Vec<V>, BuildError> {
  debug!(tasks = tasks.len(), "running tasks sequentially");

  let mut results = Vec::with_capacity(tasks.len());
  for task in tasks {
    let span = info_span!(parent: ctx.messages().span(), "task", task = %task.label());
    if let Some(value) = task.execute(ctx).instrument(span).await? {
      results.push(value);
    }
  }
  Ok(results)
}
