mod build;
mod steps;

pub use build::{BuildArgs, cmd_build};
pub use steps::cmd_steps;
