//! Assembling annotations from GCPs, mask and transformation.

use std::time::{SystemTime, UNIX_EPOCH};

use georef_core::{GeoPoint, Pt2};
use georef_linear::Transformation;
use log::debug;
use rand::Rng;

use crate::document::{
    Annotation, AnnotationType, Feature, FeatureCollection, FeatureCollectionType, GEOREF_CONTEXT,
    GroundControlPoint, MOTIVATION, PRESENTATION_CONTEXT, SpecificResourceType, SvgSelector,
    SvgSelectorType, Target,
};
use crate::error::{AnnotationError, MIN_CONTROL_POINTS};
use crate::resource::ResourceDescriptor;
use crate::svg::svg_polygon;

const ID_SUFFIX_LEN: usize = 6;

/// Build an annotation with a fresh id.
///
/// `pixels` are native-resolution coordinates and double as the mask
/// polygon; `geos[i]` is the geographic position of `pixels[i]`.
///
/// # Errors
///
/// Any [`AnnotationError`] from [`validate_inputs`].
pub fn build_annotation(
    resource: &ResourceDescriptor,
    pixels: &[Pt2],
    geos: &[GeoPoint],
    transformation: Transformation,
) -> Result<Annotation, AnnotationError> {
    build_annotation_with_id(
        annotation_id(&resource.id),
        resource,
        pixels,
        geos,
        transformation,
    )
}

/// Same as [`build_annotation`] with a caller-chosen id.
pub fn build_annotation_with_id(
    id: String,
    resource: &ResourceDescriptor,
    pixels: &[Pt2],
    geos: &[GeoPoint],
    transformation: Transformation,
) -> Result<Annotation, AnnotationError> {
    validate_inputs(resource, pixels, geos)?;

    let features = pixels
        .iter()
        .zip(geos)
        .map(|(p, g)| {
            Feature::from_gcp(&GroundControlPoint {
                resource: *p,
                geo: *g,
            })
        })
        .collect();

    debug!(
        "annotation {id}: {} GCPs, transformation {transformation}",
        pixels.len()
    );

    Ok(Annotation {
        context: vec![GEOREF_CONTEXT.to_string(), PRESENTATION_CONTEXT.to_string()],
        id,
        kind: AnnotationType::Annotation,
        motivation: MOTIVATION.to_string(),
        target: Target {
            kind: SpecificResourceType::SpecificResource,
            source: resource.clone(),
            selector: SvgSelector {
                kind: SvgSelectorType::SvgSelector,
                value: svg_polygon(resource.size(), pixels),
            },
        },
        body: FeatureCollection {
            kind: FeatureCollectionType::FeatureCollection,
            transformation,
            features,
        },
    })
}

/// Check the descriptor and the GCP lists.
pub fn validate_inputs(
    resource: &ResourceDescriptor,
    pixels: &[Pt2],
    geos: &[GeoPoint],
) -> Result<(), AnnotationError> {
    resource.validate()?;
    if pixels.is_empty() || geos.is_empty() {
        return Err(AnnotationError::EmptyControlPoints);
    }
    if pixels.len() != geos.len() {
        return Err(AnnotationError::LengthMismatch {
            pixels: pixels.len(),
            geos: geos.len(),
        });
    }
    if pixels.len() < MIN_CONTROL_POINTS {
        return Err(AnnotationError::TooFewControlPoints(pixels.len()));
    }
    for (index, (p, g)) in pixels.iter().zip(geos).enumerate() {
        let finite = p.x.is_finite() && p.y.is_finite() && g.lat.is_finite() && g.lng.is_finite();
        if !finite {
            return Err(AnnotationError::NonFiniteControlPoint { index });
        }
    }
    Ok(())
}

/// `<resourceId>#<unix millis>-<random base36>`.
pub fn annotation_id(resource_id: &str) -> String {
    let millis = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis())
        .unwrap_or_default();
    let mut rng = rand::thread_rng();
    let suffix: String = (0..ID_SUFFIX_LEN)
        .map(|_| {
            let d = rng.gen_range(0..36u32);
            char::from_digit(d, 36).unwrap_or('0')
        })
        .collect();
    format!("{resource_id}#{millis}-{suffix}")
}
