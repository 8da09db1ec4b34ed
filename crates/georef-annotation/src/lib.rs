//! Georeferencing annotation documents.
//!
//! Builds the annotation that describes how a raster resource maps onto the
//! world: the resource descriptor, an SVG mask polygon in native pixels, one
//! GeoJSON point feature per ground control point and the declared
//! transformation family. Several annotations are exported together as an
//! [`AnnotationPage`].

pub mod builder;
pub mod document;
pub mod error;
pub mod resource;
pub mod svg;

pub use builder::{annotation_id, build_annotation, build_annotation_with_id, validate_inputs};
pub use document::{
    Annotation, AnnotationPage, AnnotationPageType, AnnotationType, Feature, FeatureCollection,
    FeatureCollectionType, FeatureProperties, FeatureType, GroundControlPoint, PointGeometry,
    PointType, SpecificResourceType, SvgSelector, SvgSelectorType, Target,
};
pub use error::{AnnotationError, MIN_CONTROL_POINTS};
pub use resource::{
    DEFAULT_PREVIEW_MAX, ImageApiVersion, ImageServiceInfo, PartOf, ResourceDescriptor,
    preview_image_url,
};
pub use svg::{parse_svg_polygon, svg_polygon};
