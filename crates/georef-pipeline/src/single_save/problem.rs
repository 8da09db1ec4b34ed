//! [`ProblemType`] implementation for saving one annotation.

use anyhow::Result;
use georef_annotation::Annotation;
use serde::{Deserialize, Serialize};

use crate::capture::{EditorSnapshot, GeorefConfig};
use crate::registration::{Registration, SnapshotState};
use crate::session::{InvalidationPolicy, ProblemType};

/// Save the current editor snapshot as a single annotation.
#[derive(Debug)]
pub struct SingleSaveProblem;

pub type SingleSaveInput = EditorSnapshot;

pub type SingleSaveState = SnapshotState;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SingleSaveOutput {
    pub annotation: Annotation,
    pub registration: Registration,
}

impl ProblemType for SingleSaveProblem {
    type Config = GeorefConfig;
    type Input = SingleSaveInput;
    type State = SingleSaveState;
    type Output = SingleSaveOutput;
    type Export = Annotation;

    fn name() -> &'static str {
        "single_save_v1"
    }

    fn validate_input(input: &Self::Input) -> Result<()> {
        input.validate()
    }

    fn validate_config(config: &Self::Config) -> Result<()> {
        config.validate()
    }

    fn on_input_change() -> InvalidationPolicy {
        InvalidationPolicy::CLEAR_COMPUTED
    }

    /// Projection, rounding and classifier all feed the registration.
    fn on_config_change() -> InvalidationPolicy {
        InvalidationPolicy::CLEAR_STATE
    }

    fn export(output: &Self::Output, _config: &Self::Config) -> Result<Self::Export> {
        Ok(output.annotation.clone())
    }
}
