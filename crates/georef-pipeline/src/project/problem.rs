//! [`ProblemType`] implementation for multi-item projects.

use anyhow::Result;
use georef_annotation::{Annotation, AnnotationPage};
use serde::{Deserialize, Serialize};

use crate::capture::{EditorSnapshot, GeorefConfig};
use crate::registration::{Registration, SnapshotState};
use crate::session::{InvalidationPolicy, ProblemType};

/// Collect annotations for several snapshots and export them as one page.
#[derive(Debug)]
pub struct ProjectProblem;

pub type ProjectInput = EditorSnapshot;

pub type ProjectState = SnapshotState;

/// One saved annotation with the registration it came from.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProjectItem {
    pub annotation: Annotation,
    pub registration: Registration,
}

/// Saved annotations, in save order.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ProjectCollection {
    pub items: Vec<ProjectItem>,
}

impl ProjectCollection {
    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn ids(&self) -> impl Iterator<Item = &str> {
        self.items.iter().map(|i| i.annotation.id.as_str())
    }

    pub fn to_page(&self) -> AnnotationPage {
        AnnotationPage::new(self.items.iter().map(|i| i.annotation.clone()).collect())
    }
}

pub type ProjectExport = AnnotationPage;

impl ProblemType for ProjectProblem {
    type Config = GeorefConfig;
    type Input = ProjectInput;
    type State = ProjectState;
    type Output = ProjectCollection;
    type Export = ProjectExport;

    fn name() -> &'static str {
        "georef_project_v1"
    }

    fn validate_input(input: &Self::Input) -> Result<()> {
        input.validate()
    }

    fn validate_config(config: &Self::Config) -> Result<()> {
        config.validate()
    }

    /// A new snapshot replaces the draft; saved items stay.
    fn on_input_change() -> InvalidationPolicy {
        InvalidationPolicy::CLEAR_STATE
    }

    /// Projection, rounding and classifier all feed the registration.
    fn on_config_change() -> InvalidationPolicy {
        InvalidationPolicy::CLEAR_STATE
    }

    fn export(output: &Self::Output, _config: &Self::Config) -> Result<Self::Export> {
        Ok(output.to_page())
    }
}
