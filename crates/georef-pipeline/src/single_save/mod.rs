//! Single-save flow: one editor snapshot becomes one annotation.

mod problem;
mod steps;

pub use crate::registration::{step_register, step_resolve_resource};
pub use problem::{SingleSaveInput, SingleSaveOutput, SingleSaveProblem, SingleSaveState};
pub use steps::{run_save, step_build};
