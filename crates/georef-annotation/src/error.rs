use thiserror::Error;

/// Minimum number of GCPs (and mask vertices) an annotation accepts.
pub const MIN_CONTROL_POINTS: usize = 3;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AnnotationError {
    #[error("resource id is empty")]
    MissingResourceId,
    #[error("resource type is empty")]
    MissingResourceType,
    #[error("resource dimensions must be non-zero, got {width}x{height}")]
    MissingResourceSize { width: u32, height: u32 },
    #[error("no control points given")]
    EmptyControlPoints,
    #[error("{pixels} pixel coordinates but {geos} geographic coordinates")]
    LengthMismatch { pixels: usize, geos: usize },
    #[error("need at least 3 control points, got {0}")]
    TooFewControlPoints(usize),
    #[error("control point {index} is not finite")]
    NonFiniteControlPoint { index: usize },
    #[error("malformed SVG selector: {0}")]
    MalformedSelector(String),
    #[error("image service description has no id")]
    MissingServiceId,
}
