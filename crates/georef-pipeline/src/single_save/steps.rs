//! Step functions for the single-save flow.

use anyhow::Result;

use crate::capture::NativeSizeProvider;
use crate::registration::{annotation_from_state, step_register, step_resolve_resource};
use crate::session::GeorefSession;

use super::problem::{SingleSaveOutput, SingleSaveProblem};

/// Build the annotation and store it as the session output.
pub fn step_build(session: &mut GeorefSession<SingleSaveProblem>) -> Result<()> {
    session.validate()?;
    let (annotation, registration) = annotation_from_state(session)?;

    let notes = annotation.id.clone();
    session.set_output(SingleSaveOutput {
        annotation,
        registration,
    });
    session.log_success_with_notes("build", notes);
    Ok(())
}

/// Run the whole flow: resolve → register → build.
pub fn run_save(
    session: &mut GeorefSession<SingleSaveProblem>,
    provider: &dyn NativeSizeProvider,
) -> Result<()> {
    step_resolve_resource(session, provider)?;
    step_register(session)?;
    step_build(session)?;
    Ok(())
}
