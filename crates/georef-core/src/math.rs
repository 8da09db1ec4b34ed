//! Mathematical utilities and type definitions.
//!
//! This module provides fundamental types used throughout the workspace
//! and helpers for homogeneous coordinates.

use nalgebra::{Matrix3, Point2, Vector2, Vector3};

use crate::linalg::guard_nonzero;

/// Scalar type used throughout the workspace (currently `f64`).
pub type Real = f64;

/// 2D vector with [`Real`] components.
pub type Vec2 = Vector2<Real>;
/// 3D vector with [`Real`] components.
pub type Vec3 = Vector3<Real>;
/// 2D point with [`Real`] coordinates.
pub type Pt2 = Point2<Real>;
/// 3×3 matrix with [`Real`] entries.
pub type Mat3 = Matrix3<Real>;

/// Convert a 2D point in Euclidean coordinates into homogeneous coordinates.
///
/// Given a point `p = (x, y)`, returns the homogeneous vector `(x, y, 1)`.
pub fn to_homogeneous(p: &Pt2) -> Vec3 {
    Vec3::new(p.x, p.y, 1.0)
}

/// Convert a 3D homogeneous vector back to a 2D point.
///
/// The input is interpreted as `(x, y, w)` and the result is `(x / w, y / w)`.
/// A vanishing `w` is replaced by [`PIVOT_EPSILON`](crate::PIVOT_EPSILON),
/// so points on the line at infinity come back large but finite.
pub fn from_homogeneous(v: &Vec3) -> Pt2 {
    let w = guard_nonzero(v.z);
    Pt2::new(v.x / w, v.y / w)
}

/// Apply a projective transform to a point: `p' ~ H p`.
pub fn apply_homography(h: &Mat3, p: &Pt2) -> Pt2 {
    from_homogeneous(&(h * to_homogeneous(p)))
}

/// Twice the signed area of the triangle `(a, b, c)`.
///
/// Positive for counter-clockwise winding in a y-up frame.
pub fn cross2(a: &Pt2, b: &Pt2, c: &Pt2) -> Real {
    (b.x - a.x) * (c.y - a.y) - (b.y - a.y) * (c.x - a.x)
}
