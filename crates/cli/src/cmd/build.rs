//! Implementation of the `shipyard build` command.
//!
//! Configuration is layered: defaults, then `SHIPYARD_*` environment
//! variables, then command-line flags.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args;
use tracing::debug;

use shipyard_lib::consts::PRODUCT_FILE;
use shipyard_lib::context::BuildSession;
use shipyard_lib::drivers::DriverSet;
use shipyard_lib::options::{BuildOptions, parse_jobs};
use shipyard_lib::orchestrate::{BuildSummary, build_distributions};
use shipyard_lib::product::ProductProperties;
use shipyard_lib::steps::SkipSet;

use crate::output::{OutputFormat, format_duration, print_added, print_info, print_json, print_skipped, print_stat, print_success};

#[derive(Debug, Args)]
pub struct BuildArgs {
  /// Path to the product file
  #[arg(long, default_value = PRODUCT_FILE)]
  product: PathBuf,

  /// Output directory
  #[arg(short, long)]
  out: Option<PathBuf>,

  /// OS distributions to build: all, none, current, linux, mac or windows
  #[arg(long)]
  target_os: Option<String>,

  /// Comma-separated steps to skip (see `shipyard steps`)
  #[arg(long)]
  skip: Option<String>,

  /// Run independent steps concurrently
  #[arg(long, conflicts_with = "sequential")]
  parallel: bool,

  /// Run steps one at a time, stopping at the first failure
  #[arg(long)]
  sequential: bool,

  /// Maximum number of concurrent tasks
  #[arg(short, long)]
  jobs: Option<String>,

  /// Order in which parallel tasks are joined: reverse or submission
  #[arg(long)]
  join_order: Option<String>,
}

impl BuildArgs {
  fn options(&self) -> Result<BuildOptions> {
    let mut options = BuildOptions::from_env().context("Invalid SHIPYARD_* environment")?;

    if let Some(out) = &self.out {
      options.output_dir = out.clone();
    }
    if let Some(target_os) = &self.target_os {
      options.target_os = target_os.parse()?;
    }
    if let Some(skip) = &self.skip {
      options.skip_steps = SkipSet::parse(skip)?;
    }
    if self.parallel {
      options.parallel = true;
    }
    if self.sequential {
      options.parallel = false;
    }
    if let Some(jobs) = &self.jobs {
      options.parallelism = parse_jobs("--jobs", jobs)?;
    }
    if let Some(join_order) = &self.join_order {
      options.join_order = join_order.parse()?;
    }
    Ok(options)
  }
}

pub fn cmd_build(args: &BuildArgs, format: OutputFormat) -> Result<()> {
  let options = args.options()?;
  let product_path = dunce::canonicalize(&args.product)
    .with_context(|| format!("Product file not found: {}", args.product.display()))?;
  let product = ProductProperties::load(&product_path)?;
  debug!(?options, product = %product_path.display(), "resolved build configuration");

  if !format.is_json() {
    print_info(&format!("Building {} {}", product.name, product.version));
  }

  let session = BuildSession::new(options, product)?;
  let ctx = session.root_context();
  let drivers = DriverSet::from_product(ctx.product());

  let rt = tokio::runtime::Runtime::new().context("Failed to create async runtime")?;
  let summary = rt
    .block_on(build_distributions(&ctx, &drivers))
    .context("Build failed")?;

  if format.is_json() {
    print_json(&summary)
  } else {
    print_summary(&summary);
    Ok(())
  }
}

fn print_summary(summary: &BuildSummary) {
  for artifact in &summary.produced {
    print_added(&artifact.kind.to_string(), &artifact.path.display().to_string());
  }
  for step in &summary.skipped {
    print_skipped(&format!("{} (skipped)", step));
  }
  if let Some(manifest) = &summary.manifest {
    print_stat("Manifest", &manifest.display().to_string());
  }
  print_success(&format!(
    "Built {} artifact(s) in {}",
    summary.produced.len(),
    format_duration(summary.elapsed)
  ));
}
