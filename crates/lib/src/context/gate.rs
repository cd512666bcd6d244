//! The step gate.
//!
//! Every skippable piece of work goes through [`BuildContext::execute_step`].
//! A step in the skip-set is recorded as skipped and its work is never
//! invoked. Either way the call counts as handled: failure only ever comes
//! from the work itself, so callers chain steps with `?` and never branch on
//! whether a step was skipped.

use std::future::Future;
use std::time::Instant;

use super::BuildContext;
use super::messages::EventKind;
use crate::error::BuildError;
use crate::steps::StepId;

/// How the gate handled a step.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StepOutcome<T> {
  Ran(T),
  Skipped,
}

impl<T> StepOutcome<T> {
  /// Always true; a failed step is an `Err`, not an outcome.
  pub fn is_handled(&self) -> bool {
    true
  }

  pub fn is_skipped(&self) -> bool {
    matches!(self, StepOutcome::Skipped)
  }

  pub fn into_option(self) -> Option<T> {
    match self {
      StepOutcome::Ran(value) => Some(value),
      StepOutcome::Skipped => None,
    }
  }
}

impl BuildContext {
  /// Run `work` unless `step` is in the skip-set.
  pub async fn execute_step<F, Fut, T>(&self, step: StepId, label: &str, work: F) -> Result<StepOutcome<T>, BuildError>
  where
    F: FnOnce() -> Fut,
    Fut: Future<Output = Result<T, BuildError>>,
  {
    let journal = self.session().journal();

    if self.is_step_skipped(step) {
      self.messages().step_event(journal, step, label, EventKind::Skipped);
      return Ok(StepOutcome::Skipped);
    }

    self.messages().step_event(journal, step, label, EventKind::Started);
    let started = Instant::now();

    match work().await {
      Ok(value) => {
        let elapsed = started.elapsed();
        self.messages().step_event(journal, step, label, EventKind::Completed { elapsed });
        Ok(StepOutcome::Ran(value))
      }
      Err(e) => {
        let message = e.to_string();
        self.messages().step_event(journal, step, label, EventKind::Failed { message });
        Err(e)
      }
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::context::BuildSession;
  use crate::steps::SkipSet;
  use crate::util::testutil::{test_options, test_product};
  use std::sync::Arc;
  use std::sync::atomic::{AtomicBool, Ordering};
  use tracing_test::traced_test;

  fn context_skipping(steps: &[StepId]) -> BuildContext {
    let mut options = test_options();
    options.skip_steps = steps.iter().copied().collect::<SkipSet>();
    BuildSession::new(options, test_product()).unwrap().root_context()
  }

  #[tokio::test]
  async fn skipped_step_never_runs_work() {
    let ctx = context_skipping(&[StepId::Documentation]);
    let invoked = AtomicBool::new(false);

    let outcome = ctx
      .execute_step(StepId::Documentation, "docs", || async {
        invoked.store(true, Ordering::SeqCst);
        Ok(())
      })
      .await
      .unwrap();

    assert!(outcome.is_skipped());
    assert!(outcome.is_handled());
    assert!(!invoked.load(Ordering::SeqCst));
    assert_eq!(ctx.session().journal().skipped(), vec![StepId::Documentation]);
  }

  #[tokio::test]
  async fn skipped_step_does_not_surface_work_failure() {
    let ctx = context_skipping(&[StepId::MavenArtifacts]);
    let outcome = ctx
      .execute_step(StepId::MavenArtifacts, "maven", || async {
        Err::<(), _>(BuildError::driver("maven", "should not run"))
      })
      .await;
    assert!(matches!(outcome, Ok(StepOutcome::Skipped)));
  }

  #[tokio::test]
  async fn running_step_returns_value_and_records_completion() {
    let ctx = context_skipping(&[]);
    let outcome = ctx
      .execute_step(StepId::LinuxArtifacts, "linux", || async { Ok(42) })
      .await
      .unwrap();

    assert_eq!(outcome, StepOutcome::Ran(42));
    let kinds: Vec<_> = ctx.session().journal().snapshot().into_iter().map(|e| e.kind).collect();
    assert_eq!(kinds[0], EventKind::Started);
    assert!(matches!(kinds[1], EventKind::Completed { .. }));
  }

  #[tokio::test]
  async fn failing_step_propagates_original_error() {
    let ctx = context_skipping(&[]);
    let err = ctx
      .execute_step(StepId::MacArtifacts, "mac", || async {
        Err::<(), _>(BuildError::CmdFailed {
          cmd: "hdiutil".to_string(),
          code: Some(2),
        })
      })
      .await
      .unwrap_err();

    assert!(matches!(err, BuildError::CmdFailed { code: Some(2), .. }));
    let events = ctx.session().journal().snapshot();
    assert!(matches!(&events[1].kind, EventKind::Failed { message } if message.contains("hdiutil")));
  }

  #[tokio::test]
  async fn unrelated_skip_entries_do_not_affect_other_steps() {
    let ctx = context_skipping(&[StepId::WindowsArtifacts]);
    let ran = Arc::new(AtomicBool::new(false));
    let flag = ran.clone();
    ctx
      .execute_step(StepId::LinuxArtifacts, "linux", || async move {
        flag.store(true, Ordering::SeqCst);
        Ok(())
      })
      .await
      .unwrap();
    assert!(ran.load(Ordering::SeqCst));
  }

  #[tokio::test]
  #[traced_test]
  async fn skip_is_logged() {
    let ctx = context_skipping(&[StepId::ArtifactManifest]);
    ctx
      .execute_step(StepId::ArtifactManifest, "write manifest", || async { Ok(()) })
      .await
      .unwrap();
    assert!(logs_contain("skipped 'write manifest'"));
  }
}
