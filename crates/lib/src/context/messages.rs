//! Per-context logging channel and the session-wide event journal.
//!
//! Each context carries its own [`BuildMessages`]: a `tracing` span and a
//! scope path such as `root/build linux distribution`. Step events are written
//! both to `tracing` and to the shared [`EventJournal`], so callers can tell a
//! skipped step from one that ran without parsing log output.

use std::sync::{Mutex, PoisonError};
use std::time::Duration;

use serde::Serialize;
use tracing::{Span, debug, error, info, info_span};

use crate::consts::ROOT_SCOPE;
use crate::steps::StepId;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum EventKind {
  Started,
  Completed {
    #[serde(with = "millis")]
    elapsed: Duration,
  },
  Skipped,
  Failed {
    message: String,
  },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StepEvent {
  /// Scope path of the context that emitted the event.
  pub scope: String,
  pub step: StepId,
  pub label: String,
  #[serde(flatten)]
  pub kind: EventKind,
}

/// Append-only record of step events for one session.
#[derive(Debug, Default)]
pub struct EventJournal {
  events: Mutex<Vec<StepEvent>>,
}

impl EventJournal {
  pub fn record(&self, event: StepEvent) {
    self.events.lock().unwrap_or_else(PoisonError::into_inner).push(event);
  }

  pub fn snapshot(&self) -> Vec<StepEvent> {
    self.events.lock().unwrap_or_else(PoisonError::into_inner).clone()
  }

  /// Steps that were skipped, in the order they were skipped.
  pub fn skipped(&self) -> Vec<StepId> {
    self
      .events
      .lock()
      .unwrap_or_else(PoisonError::into_inner)
      .iter()
      .filter(|e| e.kind == EventKind::Skipped)
      .map(|e| e.step)
      .collect()
  }
}

/// The logging channel of one context.
#[derive(Debug, Clone)]
pub struct BuildMessages {
  scope: String,
  span: Span,
}

impl BuildMessages {
  pub fn root() -> Self {
    Self {
      scope: ROOT_SCOPE.to_string(),
      span: info_span!("build"),
    }
  }

  /// A child channel whose span is nested under this one.
  pub fn fork(&self, label: &str) -> Self {
    Self {
      scope: format!("{}/{}", self.scope, label),
      span: info_span!(parent: &self.span, "task", task = %label),
    }
  }

  pub fn scope(&self) -> &str {
    &self.scope
  }

  pub fn span(&self) -> &Span {
    &self.span
  }

  pub(crate) fn step_event(&self, journal: &EventJournal, step: StepId, label: &str, kind: EventKind) {
    self.span.in_scope(|| match &kind {
      EventKind::Started => debug!(step = %step, label = %label, "step started"),
      EventKind::Completed { elapsed } => {
        info!(step = %step, label = %label, elapsed_ms = elapsed.as_millis() as u64, "step completed")
      }
      EventKind::Skipped => info!(step = %step, label = %label, "skipped '{}'", label),
      EventKind::Failed { message } => error!(step = %step, label = %label, error = %message, "step failed"),
    });
    journal.record(StepEvent {
      scope: self.scope.clone(),
      step,
      label: label.to_string(),
      kind,
    });
  }
}

pub(crate) mod millis {
  use std::time::Duration;

  use serde::Serializer;

  pub fn serialize<S: Serializer>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.serialize_u64(duration.as_millis() as u64)
  }
}
