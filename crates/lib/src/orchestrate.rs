//! The top-level build flow.
//!
//! 1. compile the product's modules (gated)
//! 2. build every applicable distribution as one scheduled batch
//! 3. write the artifact manifest (gated)

use std::path::PathBuf;
use std::sync::Arc;
use std::time::{Duration, Instant};

use serde::Serialize;
use tracing::{debug, info};

use crate::context::{BuildContext, DistFile};
use crate::drivers::cmd::run_compile_command;
use crate::drivers::{DriverSet, ProducedArtifact};
use crate::error::BuildError;
use crate::report::write_artifact_manifest;
use crate::schedule::{BuildTask, run_all};
use crate::steps::StepId;

/// What a finished build produced.
#[derive(Debug, Clone, Serialize)]
pub struct BuildSummary {
  /// Ordered by kind, then path.
  pub produced: Vec<ProducedArtifact>,
  pub dist_files: Vec<DistFile>,
  /// `None` when the manifest step was skipped.
  pub manifest: Option<PathBuf>,
  pub skipped: Vec<StepId>,
  #[serde(rename = "elapsed_ms", with = "crate::context::messages::millis")]
  pub elapsed: Duration,
}

pub async fn build_distributions(ctx: &BuildContext, drivers: &DriverSet) -> Result<BuildSummary, BuildError> {
  let started = Instant::now();
  let product = ctx.product();
  info!(
    product = %product.name,
    version = %product.version,
    target_os = %ctx.options().target_os,
    parallel = ctx.options().parallel,
    "building distributions"
  );

  ctx
    .execute_step(StepId::CompileModules, "compile modules", || run_compile_command(ctx))
    .await?;

  let tasks = distribution_tasks(ctx, drivers);
  let produced = run_all(ctx, tasks).await?;

  let dist_files = ctx.session().artifacts().snapshot();
  let manifest = ctx
    .execute_step(StepId::ArtifactManifest, "write artifact manifest", || {
      let dir = ctx.output_dir().to_path_buf();
      let produced = produced.clone();
      let dist_files = dist_files.clone();
      async move {
        match tokio::task::spawn_blocking(move || write_artifact_manifest(&dir, &produced, &dist_files)).await {
          Ok(written) => written,
          Err(e) => Err(BuildError::driver("write artifact manifest", e.to_string())),
        }
      }
    })
    .await?
    .into_option();

  let summary = BuildSummary {
    produced,
    dist_files,
    manifest,
    skipped: ctx.session().journal().skipped(),
    elapsed: started.elapsed(),
  };
  info!(
    produced = summary.produced.len(),
    skipped = summary.skipped.len(),
    elapsed_ms = summary.elapsed.as_millis() as u64,
    "build finished"
  );
  Ok(summary)
}

/// One task per driver; OS distributions outside the target selection are left out.
fn distribution_tasks(ctx: &BuildContext, drivers: &DriverSet) -> Vec<BuildTask<ProducedArtifact>> {
  let target_os = ctx.options().target_os;
  let target_dir = ctx.artifacts_dir();

  drivers
    .builders()
    .iter()
    .filter(|builder| match builder.kind().os() {
      Some(os) if !target_os.includes(os) => {
        debug!(os = %os, "distribution not selected");
        false
      }
      _ => true,
    })
    .map(|builder| {
      let kind = builder.kind();
      let builder = Arc::clone(builder);
      let target_dir = target_dir.clone();
      BuildTask::new(kind.step(), format!("build {}", kind), move |task_ctx: BuildContext| async move {
        let path = builder.build(&task_ctx, &target_dir).await?;
        Ok(path.map(|path| ProducedArtifact { kind, path }))
      })
    })
    .collect()
}
