//! Scheduling properties checked through the public API.

use std::path::PathBuf;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use proptest::prelude::*;
use shipyard_lib::platform::TargetOs;
use shipyard_lib::product::{ProductLayout, ProductProperties};
use shipyard_lib::schedule::JoinOrder;
use shipyard_lib::steps::{SkipSet, StepId};
use shipyard_lib::{BuildContext, BuildError, BuildOptions, BuildSession, BuildTask, run_all};

fn context(parallel: bool, join_order: JoinOrder, skip: SkipSet) -> BuildContext {
  let options = BuildOptions {
    target_os: TargetOs::All,
    skip_steps: skip,
    parallel,
    parallelism: 3,
    join_order,
    output_dir: std::env::temp_dir().join("shipyard-scheduling-tests"),
  };
  let product = ProductProperties {
    name: "Scheduling".to_string(),
    version: "0.1".to_string(),
    base_file_name: "scheduling".to_string(),
    compile_command: None,
    layout: ProductLayout::default(),
    home: PathBuf::new(),
  };
  BuildSession::new(options, product).unwrap().root_context()
}

fn runtime() -> tokio::runtime::Runtime {
  tokio::runtime::Builder::new_multi_thread()
    .worker_threads(2)
    .enable_all()
    .build()
    .unwrap()
}

fn step_for(i: usize) -> StepId {
  StepId::ALL[i % StepId::ALL.len()]
}

/// Tasks yielding `values[i]` after `delays[i]` milliseconds; `fail[i]` makes task i fail instead.
fn tasks(values: &[u32], delays: &[u64], fail: &[bool]) -> Vec<BuildTask<u32>> {
  values
    .iter()
    .enumerate()
    .map(|(i, &value)| {
      let delay = delays[i % delays.len()];
      let fails = fail.get(i).copied().unwrap_or(false);
      BuildTask::new(step_for(i), format!("task-{}", i), move |_| async move {
        tokio::time::sleep(Duration::from_millis(delay)).await;
        if fails {
          Err(BuildError::driver(format!("task-{}", i), "boom"))
        } else {
          Ok(Some(value))
        }
      })
    })
    .collect()
}

proptest! {
  #![proptest_config(ProptestConfig::with_cases(24))]

  #[test]
  fn parallel_results_are_sorted_and_complete(
    values in prop::collection::vec(0u32..1000, 1..8),
    delays in prop::collection::vec(0u64..4, 1..8),
    reverse in any::<bool>(),
  ) {
    let join_order = if reverse { JoinOrder::Reverse } else { JoinOrder::Submission };
    let results = runtime()
      .block_on(run_all(&context(true, join_order, SkipSet::new()), tasks(&values, &delays, &[])))
      .unwrap();

    let mut expected = values.clone();
    expected.sort();
    prop_assert_eq!(results, expected);
  }

  #[test]
  fn sequential_results_keep_input_order(values in prop::collection::vec(0u32..1000, 1..8)) {
    let results = runtime()
      .block_on(run_all(&context(false, JoinOrder::Reverse, SkipSet::new()), tasks(&values, &[0], &[])))
      .unwrap();
    prop_assert_eq!(results, values);
  }

  #[test]
  fn every_parallel_failure_is_reported(fail in prop::collection::vec(any::<bool>(), 1..8)) {
    let values: Vec<u32> = (0..fail.len() as u32).collect();
    let expected: Vec<String> = fail
      .iter()
      .enumerate()
      .filter(|(_, f)| **f)
      .map(|(i, _)| format!("task-{}", i))
      .collect();

    let result = runtime().block_on(run_all(
      &context(true, JoinOrder::Reverse, SkipSet::new()),
      tasks(&values, &[2, 0, 1], &fail),
    ));

    match result {
      Ok(_) => prop_assert!(expected.is_empty()),
      Err(BuildError::Aggregate(aggregate)) => {
        let labels: Vec<String> = aggregate.failures().iter().map(|f| f.label.clone()).collect();
        prop_assert_eq!(labels, expected);
      }
      Err(other) => {
        prop_assert_eq!(expected.len(), 1);
        prop_assert!(other.to_string().contains(&expected[0]));
      }
    }
  }

  #[test]
  fn skipped_steps_never_run(
    skip_mask in prop::collection::vec(any::<bool>(), StepId::ALL.len()),
    parallel in any::<bool>(),
  ) {
    let skip: SkipSet = StepId::ALL
      .iter()
      .zip(&skip_mask)
      .filter(|(_, s)| **s)
      .map(|(step, _)| *step)
      .collect();
    let ran = Arc::new(AtomicUsize::new(0));

    let batch: Vec<BuildTask<usize>> = (0..StepId::ALL.len())
      .map(|i| {
        let ran = ran.clone();
        BuildTask::new(step_for(i), format!("task-{}", i), move |_| async move {
          ran.fetch_add(1, Ordering::SeqCst);
          Ok(Some(i))
        })
      })
      .collect();

    let ctx = context(parallel, JoinOrder::Reverse, skip.clone());
    let results = runtime().block_on(run_all(&ctx, batch)).unwrap();

    let expected: Vec<usize> = (0..StepId::ALL.len()).filter(|i| !skip.contains(step_for(*i))).collect();
    prop_assert_eq!(&results, &expected);
    prop_assert_eq!(ran.load(Ordering::SeqCst), expected.len());
    prop_assert_eq!(ctx.session().journal().skipped().len(), skip.len());
  }
}

#[tokio::test]
async fn sequential_mode_stops_at_first_failure() {
  let ctx = context(false, JoinOrder::Reverse, SkipSet::new());
  let err = run_all(&ctx, tasks(&[1, 2, 3], &[0], &[false, true, true]))
    .await
    .unwrap_err();

  assert!(matches!(err, BuildError::Driver { ref label, .. } if label == "task-1"));
  let started: Vec<_> = ctx.session().journal().snapshot().into_iter().map(|e| e.label).collect();
  assert!(!started.contains(&"task-2".to_string()));
}
