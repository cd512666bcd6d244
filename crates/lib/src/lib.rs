//! shipyard-lib: the build orchestration engine behind `shipyard`.
//!
//! - `context`: the build session, per-task contexts and the step gate
//! - `schedule`: sequential fail-fast and parallel collect-all task batches
//! - `drivers`: builders producing OS distributions, docs and maven artifacts
//! - `orchestrate`: the end-to-end build flow

pub mod consts;
pub mod context;
pub mod drivers;
pub mod error;
pub mod options;
pub mod orchestrate;
pub mod platform;
pub mod product;
pub mod report;
pub mod schedule;
pub mod steps;
pub mod util;

pub use context::{BuildContext, BuildSession, StepOutcome};
pub use error::{AggregateFailure, BuildError, ConfigError, TaskFailure};
pub use options::BuildOptions;
pub use orchestrate::{BuildSummary, build_distributions};
pub use schedule::{BuildTask, run_all, run_all_by};
