//! Step functions for the project flow.

use anyhow::{Result, ensure};

use crate::capture::NativeSizeProvider;
use crate::registration::{annotation_from_state, step_register, step_resolve_resource};
use crate::session::GeorefSession;

use super::problem::{ProjectCollection, ProjectItem, ProjectProblem};

/// Build an annotation for the current snapshot and append it.
///
/// Returns the new annotation's id.
pub fn step_save_item(session: &mut GeorefSession<ProjectProblem>) -> Result<String> {
    session.validate()?;
    let (annotation, registration) = annotation_from_state(session)?;
    let id = annotation.id.clone();

    let mut collection = session.output().cloned().unwrap_or_default();
    collection.items.push(ProjectItem {
        annotation,
        registration,
    });
    let count = collection.len();
    session.set_output(collection);
    session.log_success_with_notes("save_item", format!("{id} ({count} items)"));
    Ok(id)
}

/// Remove the saved item at `index`.
pub fn step_remove_item(session: &mut GeorefSession<ProjectProblem>, index: usize) -> Result<()> {
    let mut collection = session.output().cloned().unwrap_or_default();
    ensure!(
        index < collection.len(),
        "item index {index} out of range ({} items)",
        collection.len()
    );
    let removed = collection.items.remove(index);
    session.set_output(collection);
    session.log_success_with_notes("remove_item", removed.annotation.id);
    Ok(())
}

/// Drop all saved items.
pub fn step_clear(session: &mut GeorefSession<ProjectProblem>) {
    session.set_output(ProjectCollection::default());
    session.log_success("clear");
}

/// Resolve, register and save the current snapshot.
pub fn run_save_item(
    session: &mut GeorefSession<ProjectProblem>,
    provider: &dyn NativeSizeProvider,
) -> Result<String> {
    step_resolve_resource(session, provider)?;
    step_register(session)?;
    step_save_item(session)
}
