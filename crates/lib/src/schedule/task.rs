//! Task descriptors: units of work bound to a step, built ahead of time and
//! handed to the scheduler.

use std::fmt;
use std::future::Future;
use std::pin::Pin;

use crate::context::BuildContext;
use crate::error::BuildError;
use crate::steps::StepId;

pub type TaskFuture<V> = Pin<Box<dyn Future<Output = Result<Option<V>, BuildError>> + Send + 'static>>;

type TaskBody<V> = Box<dyn FnOnce(BuildContext) -> TaskFuture<V> + Send + 'static>;

/// A named, not-yet-executed unit of work.
///
/// The body receives the context it runs under (a fork in parallel mode) and
/// may produce a value; `None` means the work had nothing to contribute.
pub struct BuildTask<V> {
  step: StepId,
  label: String,
  body: TaskBody<V>,
}

impl<V: Send + 'static> BuildTask<V> {
  pub fn new<F, Fut>(step: StepId, label: impl Into<String>, body: F) -> Self
  where
    F: FnOnce(BuildContext) -> Fut + Send + 'static,
    Fut: Future<Output = Result<Option<V>, BuildError>> + Send + 'static,
  {
    Self {
      step,
      label: label.into(),
      body: Box::new(move |ctx| Box::pin(body(ctx))),
    }
  }

  pub fn step(&self) -> StepId {
    self.step
  }

  pub fn label(&self) -> &str {
    &self.label
  }

  /// Run the body through the step gate. A skipped task yields `None`.
  pub async fn execute(self, ctx: &BuildContext) -> Result<Option<V>, BuildError> {
    let BuildTask { step, label, body } = self;
    let task_ctx = ctx.clone();
    let outcome = ctx.execute_step(step, &label, move || body(task_ctx)).await?;
    Ok(outcome.into_option().flatten())
  }
}

impl<V> fmt::Debug for BuildTask<V> {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.debug_struct("BuildTask")
      .field("step", &self.step)
      .field("label", &self.label)
      .finish_non_exhaustive()
  }
}
