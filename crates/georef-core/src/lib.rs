//! Core math and geometry primitives for the georeferencing workspace.
//!
//! This crate provides the foundational building blocks used by all other
//! crates in the workspace:
//!
//! - linear algebra type aliases (`Real`, `Pt2`, `Mat3`, and friends),
//! - a small dense linear algebra kernel (Gaussian elimination with partial
//!   pivoting, closed-form 3×3 inverse) with epsilon-guarded pivots,
//! - geographic primitives ([`GeoPoint`], [`Quadrilateral`]),
//! - map projections converting geographic coordinates to layer pixels.
//!
//! # Modules
//!
//! - \[`math`\]: type aliases and homogeneous helpers.
//! - \[`linalg`\]: normal equations, elimination, 3×3 inverse.
//! - \[`geo`\]: geographic points and image-corner quadrilaterals.
//! - \[`projection`\]: geographic ↔ layer-pixel projections.
//! - \[`size`\]: raster dimensions.
//!
//! # Example
//!
//! ```
//! use georef_core::{GeoPoint, MapProjection, SimpleCrs};
//!
//! let crs = SimpleCrs::default();
//! let px = crs.project(&GeoPoint::new(-10.0, 20.0));
//! assert_eq!((px.x, px.y), (20.0, 10.0));
//! ```

mod geo;
pub mod linalg;
mod math;
mod projection;
mod size;

pub use geo::*;
pub use linalg::{LinalgError, PIVOT_EPSILON, Solution, SolveDiagnostics};
pub use math::*;
pub use projection::*;
pub use size::*;
