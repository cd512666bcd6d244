//! Implementation of the `shipyard steps` command.

use anyhow::Result;

use shipyard_lib::steps::StepId;

use crate::output::{OutputFormat, print_json, print_stat};

pub fn cmd_steps(format: OutputFormat) -> Result<()> {
  if format.is_json() {
    let steps: Vec<_> = StepId::ALL
      .iter()
      .map(|step| serde_json::json!({ "id": step.as_str(), "description": step.description() }))
      .collect();
    return print_json(&steps);
  }

  println!("Skippable steps:");
  for step in StepId::ALL {
    print_stat(step.as_str(), step.description());
  }
  Ok(())
}
