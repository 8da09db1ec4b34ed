//! Registration between a displayed image and the map frame.
//!
//! - [`homography`]: least-squares homography from ≥4 correspondences.
//! - [`transform`]: [`CoordinateTransform`], the pixel ↔ map value object for
//!   one pose of the image corners.
//! - [`resolution`]: preview → native pixel scaling.
//! - [`classify`]: affine vs. projective detection and the transformation
//!   family an annotation declares.
//!
//! ```
//! use georef_core::{GeoPoint, ImageSize, Quadrilateral, SimpleCrs};
//! use georef_linear::{CoordinateTransform, TransformClass, TransformClassifier};
//!
//! let quad = Quadrilateral::new(
//!     GeoPoint::new(10.0, 10.0),
//!     GeoPoint::new(10.0, 20.0),
//!     GeoPoint::new(0.0, 10.0),
//!     GeoPoint::new(0.0, 20.0),
//! );
//! let t = CoordinateTransform::new(quad, ImageSize::new(200, 100), SimpleCrs::default())?;
//! let c = TransformClassifier::default().classify(t.homography(), 4);
//! assert_eq!(c.class, TransformClass::Affine);
//! # Ok::<(), georef_linear::TransformError>(())
//! ```

pub mod classify;
pub mod homography;
pub mod math;
pub mod resolution;
pub mod transform;

pub use classify::{
    Advisory, Classification, ClassifierConfig, PolynomialOptions, ProjectiveFamily,
    TransformClass, TransformClassifier, Transformation,
};
pub use homography::{HomographyError, HomographyEstimate, HomographySolver, estimate_homography};
pub use resolution::{ResolutionError, ResolutionScale};
pub use transform::{Conditioning, CoordinateTransform, TransformError};
