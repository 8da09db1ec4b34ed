//! Editor flows on top of the registration engine.
//!
//! ## Session API
//!
//! Each flow is a [`ProblemType`]; a [`GeorefSession`] holds its config,
//! the current [`EditorSnapshot`], intermediate state and output, and step
//! functions advance it.
//!
//! ```no_run
//! use georef_pipeline::capture::{EditorSnapshot, NoFallback};
//! use georef_pipeline::project::{ProjectProblem, run_save_item};
//! use georef_pipeline::session::GeorefSession;
//! use georef_pipeline::AnnotationPage;
//!
//! fn save_both(first: EditorSnapshot, second: EditorSnapshot) -> anyhow::Result<AnnotationPage> {
//!     let mut session = GeorefSession::<ProjectProblem>::new();
//!     session.set_input(first)?;
//!     run_save_item(&mut session, &NoFallback)?;
//!     session.set_input(second)?;
//!     run_save_item(&mut session, &NoFallback)?;
//!     session.export()
//! }
//! ```

pub mod capture;
pub mod project;
pub mod registration;
pub mod session;
pub mod single_save;

pub use crate::capture::{
    CanvasSource, EditorSnapshot, GeorefConfig, NativeSizeProvider, NoFallback,
    ResourceSources, ServiceSource, resolve_resource,
};
pub use crate::registration::{Registration, SnapshotProblem, SnapshotState, register};
pub use crate::session::{
    ExportRecord, GeorefSession, InvalidationPolicy, LogEntry, ProblemType, SessionMetadata,
};

pub use crate::project::{
    ProjectCollection, ProjectItem, ProjectProblem, run_save_item, step_clear, step_remove_item,
    step_save_item,
};
pub use crate::single_save::{SingleSaveOutput, SingleSaveProblem, run_save, step_build};
pub use crate::registration::{step_register, step_resolve_resource};

// Re-exports from the lower crates for convenience.
pub use georef_annotation::{Annotation, AnnotationPage, ResourceDescriptor};
pub use georef_core::{GeoPoint, ImageSize, ProjectionConfig, Quadrilateral, SimpleCrs, WebMercator};
pub use georef_linear::{ClassifierConfig, ProjectiveFamily, Transformation};
