//! Geometry shared by both flows: snapshot → native-pixel GCPs + transform
//! family, and the step functions that drive it on a session.

use anyhow::{Context, Result, anyhow};
use georef_annotation::{Annotation, ResourceDescriptor, build_annotation};
use georef_core::{Mat3, Pt2};
use georef_linear::{
    Classification, Conditioning, CoordinateTransform, ResolutionScale, TransformClassifier,
};
use log::{debug, warn};
use serde::{Deserialize, Serialize};

use crate::capture::{EditorSnapshot, GeorefConfig, NativeSizeProvider, resolve_resource};
use crate::session::{GeorefSession, ProblemType};

/// Everything the annotation builder needs beyond the resource descriptor.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Registration {
    /// Forward homography of the pose (preview pixel → layer pixel).
    pub homography: Mat3,
    pub conditioning: Conditioning,
    pub scale: ResolutionScale,
    /// Polygon vertices in preview pixels.
    pub preview_pixels: Vec<Pt2>,
    /// Polygon vertices in native pixels, index-aligned with the polygon.
    pub native_pixels: Vec<Pt2>,
    pub classification: Classification,
    /// Set when the corners fail the convexity precondition.
    pub corner_warning: Option<String>,
}

impl Registration {
    /// One-line summary for the session log.
    pub fn summary(&self) -> String {
        format!(
            "{:?}, {} ({} GCPs, scale {:.3}x{:.3}{})",
            self.classification.class,
            self.classification.transformation,
            self.native_pixels.len(),
            self.scale.scale_x,
            self.scale.scale_y,
            if self.conditioning.degenerate {
                ", degenerate"
            } else {
                ""
            }
        )
    }
}

/// Build the transform for the snapshot's corners, map the polygon into
/// native pixels and classify the pose.
pub fn register(
    snapshot: &EditorSnapshot,
    resource: &ResourceDescriptor,
    config: &GeorefConfig,
) -> Result<Registration> {
    let corner_warning = snapshot.corners.validate().err().map(|e| {
        warn!("image corners violate the transform precondition: {e}");
        e.to_string()
    });

    let transform = CoordinateTransform::new(snapshot.corners, snapshot.preview, config.projection)
        .context("failed to build coordinate transform")?;
    let conditioning = transform.conditioning();
    if conditioning.degenerate {
        warn!(
            "transform is numerically degenerate (min pivot {:e}, det {:e})",
            conditioning.min_abs_pivot, conditioning.determinant
        );
    }

    let preview_pixels = transform.project_polygon(&snapshot.polygon);
    let scale = ResolutionScale::new(snapshot.preview, resource.size())
        .context("failed to reconcile preview and native resolution")?;
    let mut native_pixels = scale.apply_all(&preview_pixels);
    if config.round_resource_coords {
        for p in &mut native_pixels {
            *p = Pt2::new(p.x.round(), p.y.round());
        }
    }
    debug!(
        "polygon of {} vertices mapped with scale {}x{}",
        native_pixels.len(),
        scale.scale_x,
        scale.scale_y
    );

    let classification = TransformClassifier::new(config.classifier)
        .classify(transform.homography(), native_pixels.len());

    Ok(Registration {
        homography: *transform.homography(),
        conditioning,
        scale,
        preview_pixels,
        native_pixels,
        classification,
        corner_warning,
    })
}

/// Per-snapshot intermediate results, shared by both flows.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SnapshotState {
    pub resource: Option<ResourceDescriptor>,
    pub registration: Option<Registration>,
}

/// Flows that consume one [`EditorSnapshot`] at a time.
pub trait SnapshotProblem:
    ProblemType<Config = GeorefConfig, Input = EditorSnapshot, State = SnapshotState>
{
}

impl<P> SnapshotProblem for P where
    P: ProblemType<Config = GeorefConfig, Input = EditorSnapshot, State = SnapshotState>
{
}

/// Pick the target resource and its native size.
///
/// A provider failure is logged in the session and returned; output and
/// earlier exports are not touched.
pub fn step_resolve_resource<P: SnapshotProblem>(
    session: &mut GeorefSession<P>,
    provider: &dyn NativeSizeProvider,
) -> Result<()> {
    session.validate()?;
    let input = session.require_input()?;

    match resolve_resource(&input.resource, provider) {
        Ok(resource) => {
            let notes = format!(
                "{} {} ({}x{})",
                resource.kind, resource.id, resource.width, resource.height
            );
            session.state.resource = Some(resource);
            session.state.registration = None;
            session.log_success_with_notes("resolve_resource", notes);
            Ok(())
        }
        Err(e) => {
            session.log_failure("resolve_resource", format!("{e:#}"));
            Err(e)
        }
    }
}

/// Map the polygon into native pixels and classify the pose.
pub fn step_register<P: SnapshotProblem>(session: &mut GeorefSession<P>) -> Result<()> {
    session.validate()?;
    let input = session.require_input()?;
    let resource = session
        .state
        .resource
        .as_ref()
        .ok_or_else(|| anyhow!("resource must be resolved before registration"))?;

    let registration = register(input, resource, &session.config)?;
    let notes = registration.summary();
    for a in &registration.classification.advisories {
        session.log_success_with_notes("advisory", a.to_string());
    }
    session.state.registration = Some(registration);
    session.log_success_with_notes("register", notes);
    Ok(())
}

/// Assemble an annotation from the session's resolved resource and
/// registration.
pub fn annotation_from_state<P: SnapshotProblem>(
    session: &GeorefSession<P>,
) -> Result<(Annotation, Registration)> {
    let input = session.require_input()?;
    let resource = session
        .state
        .resource
        .as_ref()
        .ok_or_else(|| anyhow!("resource must be resolved before building"))?;
    let registration = session
        .state
        .registration
        .clone()
        .ok_or_else(|| anyhow!("registration required before building"))?;

    let annotation = build_annotation(
        resource,
        &registration.native_pixels,
        &input.polygon,
        registration.classification.transformation,
    )
    .context("failed to build annotation")?;
    Ok((annotation, registration))
}
