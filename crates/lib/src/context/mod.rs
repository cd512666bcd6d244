//! Build session and per-task contexts.
//!
//! A [`BuildSession`] is created once per build invocation. It owns the frozen
//! configuration, the product metadata and the registries every task writes
//! to. Work never touches the session directly; it gets a [`BuildContext`],
//! a cheap view that pairs the session with a logging channel. Forking a
//! context gives a parallel task its own channel while keeping every shared
//! registry the same.
//!
//! Worker permits are taken once per parallel task. A context remembers
//! whether its task already holds one, and batches run from such a context
//! reuse it instead of queueing for more.

pub mod artifacts;
pub mod gate;
pub mod messages;

use std::path::{Path, PathBuf};
use std::sync::Arc;

use tokio::sync::Semaphore;

use crate::error::ConfigError;
use crate::options::BuildOptions;
use crate::product::ProductProperties;
use crate::steps::StepId;

pub use artifacts::{ArtifactRegistry, DistFile};
pub use gate::StepOutcome;
pub use messages::{BuildMessages, EventJournal, EventKind, StepEvent};

/// Root state of one build invocation.
#[derive(Debug)]
pub struct BuildSession {
  options: BuildOptions,
  product: ProductProperties,
  artifacts: ArtifactRegistry,
  journal: EventJournal,
  pool: Arc<Semaphore>,
}

impl BuildSession {
  /// Validate the product metadata and freeze the configuration.
  ///
  /// The output directory is made absolute against the current directory,
  /// since commands run from the product home.
  pub fn new(mut options: BuildOptions, product: ProductProperties) -> Result<Arc<Self>, ConfigError> {
    product.validate()?;
    options.output_dir = std::path::absolute(&options.output_dir).map_err(|e| ConfigError::InvalidValue {
      key: "output dir".to_string(),
      value: options.output_dir.display().to_string(),
      reason: e.to_string(),
    })?;
    let pool = Arc::new(Semaphore::new(options.parallelism.max(1)));
    Ok(Arc::new(Self {
      options,
      product,
      artifacts: ArtifactRegistry::default(),
      journal: EventJournal::default(),
      pool,
    }))
  }

  pub fn root_context(self: &Arc<Self>) -> BuildContext {
    BuildContext {
      session: Arc::clone(self),
      messages: BuildMessages::root(),
      holds_permit: false,
    }
  }

  pub fn options(&self) -> &BuildOptions {
    &self.options
  }

  pub fn product(&self) -> &ProductProperties {
    &self.product
  }

  pub fn artifacts(&self) -> &ArtifactRegistry {
    &self.artifacts
  }

  pub fn journal(&self) -> &EventJournal {
    &self.journal
  }

  /// Permits bounding how many parallel tasks run at once.
  pub(crate) fn pool(&self) -> Arc<Semaphore> {
    Arc::clone(&self.pool)
  }
}

/// A view of the session used by one unit of work.
#[derive(Debug, Clone)]
pub struct BuildContext {
  session: Arc<BuildSession>,
  messages: BuildMessages,
  holds_permit: bool,
}

impl BuildContext {
  /// Context for a parallel task: same registries, own logging channel.
  pub fn fork(&self, label: &str) -> BuildContext {
    BuildContext {
      session: Arc::clone(&self.session),
      messages: self.messages.fork(label),
      holds_permit: self.holds_permit,
    }
  }

  /// Mark this context as running under a worker permit.
  pub(crate) fn with_permit(mut self) -> BuildContext {
    self.holds_permit = true;
    self
  }

  /// Whether this context, or one it was forked from, runs under a permit.
  pub fn holds_permit(&self) -> bool {
    self.holds_permit
  }

  pub fn session(&self) -> &Arc<BuildSession> {
    &self.session
  }

  pub fn options(&self) -> &BuildOptions {
    &self.session.options
  }

  pub fn product(&self) -> &ProductProperties {
    &self.session.product
  }

  pub fn messages(&self) -> &BuildMessages {
    &self.messages
  }

  pub fn is_step_skipped(&self, step: StepId) -> bool {
    self.session.options.skip_steps.contains(step)
  }

  pub fn output_dir(&self) -> &Path {
    &self.session.options.output_dir
  }

  /// Directory inside the output root where distributions are laid out.
  pub fn artifacts_dir(&self) -> PathBuf {
    self.output_dir().join("artifacts")
  }

  pub fn add_dist_file(&self, entry: DistFile) {
    tracing::debug!(
      parent: self.messages.span(),
      source = %entry.source.display(),
      dest = %entry.relative_dest,
      "registered dist file"
    );
    self.session.artifacts.add(entry);
  }
}
