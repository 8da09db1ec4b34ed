//! Project flow: several snapshots, one [`AnnotationPage`] export.
//!
//! [`AnnotationPage`]: georef_annotation::AnnotationPage

mod problem;
mod steps;

pub use crate::registration::{step_register, step_resolve_resource};
pub use problem::{
    ProjectCollection, ProjectExport, ProjectInput, ProjectItem, ProjectProblem, ProjectState,
};
pub use steps::{run_save_item, step_clear, step_remove_item, step_save_item};
