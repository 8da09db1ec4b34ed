//! Coordinate transform service for one pose of the image on the map.
//!
//! A [`CoordinateTransform`] is built from the four corner positions of the
//! displayed image, the preview's natural size and the map projection. It
//! holds the forward homography (image pixel → layer pixel) and its inverse,
//! and is never mutated: moving a corner means building a new one.

use georef_core::linalg::invert3;
use georef_core::{
    GeoPoint, ImageSize, MapProjection, Mat3, PIVOT_EPSILON, ProjectionConfig, Pt2,
    Quadrilateral, Real, apply_homography, is_convex_ring,
};
use log::debug;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::homography::{HomographyError, HomographyEstimate, HomographySolver};

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TransformError {
    #[error("preview size must be non-zero, got {width}x{height}")]
    EmptyPreview { width: u32, height: u32 },
    #[error(transparent)]
    Homography(#[from] HomographyError),
}

/// Numerical health of a transform.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Conditioning {
    /// Smallest absolute pivot of the homography solve.
    pub min_abs_pivot: Real,
    /// Pivots replaced by the epsilon guard.
    pub substituted_pivots: usize,
    /// Determinant of the forward homography.
    pub determinant: Real,
    /// Set when any of the above, or the projected corner ring, is degenerate.
    pub degenerate: bool,
}

/// Forward and inverse pixel ↔ map mapping for a posed image.
#[derive(Debug, Clone)]
pub struct CoordinateTransform<P = ProjectionConfig> {
    corners: Quadrilateral,
    preview: ImageSize,
    projection: P,
    forward: HomographyEstimate,
    inverse: Mat3,
    layer_ring_convex: bool,
}

impl<P: MapProjection> CoordinateTransform<P> {
    /// Estimate the homography from the image corners
    /// `(0,0), (w,0), (0,h), (w,h)` to the projected quadrilateral.
    ///
    /// A degenerate quadrilateral still yields a transform; check
    /// [`Quadrilateral::validate`] beforehand or [`Self::conditioning`]
    /// afterwards.
    pub fn new(
        corners: Quadrilateral,
        preview: ImageSize,
        projection: P,
    ) -> Result<Self, TransformError> {
        if preview.is_empty() {
            return Err(TransformError::EmptyPreview {
                width: preview.width,
                height: preview.height,
            });
        }

        let src = preview.corners();
        let dst = corners.corners().map(|c| projection.project(&c));
        let forward = HomographySolver::least_squares(&src, &dst)?;
        let inverse = invert3(&forward.h);

        // Ring order NW, NE, SE, SW.
        let layer_ring_convex = is_convex_ring(&[dst[0], dst[1], dst[3], dst[2]]).is_ok();
        if !layer_ring_convex {
            debug!("projected corners do not form a convex quadrilateral");
        }

        Ok(Self {
            corners,
            preview,
            projection,
            forward,
            inverse,
            layer_ring_convex,
        })
    }

    /// Geographic point → preview image pixel.
    pub fn map_point_to_image_pixel(&self, geo: &GeoPoint) -> Pt2 {
        let layer = self.projection.project(geo);
        apply_homography(&self.inverse, &layer)
    }

    /// Preview image pixel → geographic point.
    pub fn image_pixel_to_map_point(&self, px: &Pt2) -> GeoPoint {
        let layer = apply_homography(&self.forward.h, px);
        self.projection.unproject(&layer)
    }

    /// Map every vertex of a polygon into preview pixels, keeping order.
    pub fn project_polygon(&self, vertices: &[GeoPoint]) -> Vec<Pt2> {
        vertices
            .iter()
            .map(|v| self.map_point_to_image_pixel(v))
            .collect()
    }

    /// Forward homography (image pixel → layer pixel), `H[2,2] == 1`.
    pub fn homography(&self) -> &Mat3 {
        &self.forward.h
    }

    pub fn inverse(&self) -> &Mat3 {
        &self.inverse
    }

    pub fn corners(&self) -> &Quadrilateral {
        &self.corners
    }

    pub fn preview(&self) -> ImageSize {
        self.preview
    }

    pub fn projection(&self) -> &P {
        &self.projection
    }

    pub fn conditioning(&self) -> Conditioning {
        let d = self.forward.diagnostics;
        let determinant = self.forward.h.determinant();
        Conditioning {
            min_abs_pivot: d.min_abs_pivot,
            substituted_pivots: d.substituted_pivots,
            determinant,
            degenerate: d.is_degenerate()
                || determinant.abs() < PIVOT_EPSILON
                || !self.layer_ring_convex,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use georef_core::{SimpleCrs, WebMercator};

    fn scenario() -> Quadrilateral {
        Quadrilateral::new(
            GeoPoint::new(10.0, 10.0),
            GeoPoint::new(10.0, 20.0),
            GeoPoint::new(0.0, 10.0),
            GeoPoint::new(0.0, 20.0),
        )
    }

    #[test]
    fn scenario_corners_map_exactly() {
        let t = CoordinateTransform::new(scenario(), ImageSize::new(200, 100), SimpleCrs::default())
            .unwrap();
        let expected = scenario().corners();
        for (px, geo) in ImageSize::new(200, 100).corners().iter().zip(expected) {
            let got = t.image_pixel_to_map_point(px);
            assert!(got.planar_distance(&geo) < 1e-9, "{px:?}: {got:?} vs {geo:?}");
        }
        let centre = t.map_point_to_image_pixel(&GeoPoint::new(5.0, 15.0));
        assert!((centre - Pt2::new(100.0, 50.0)).norm() < 1e-9);
        assert!(!t.conditioning().degenerate);
    }

    #[test]
    fn mercator_roundtrip_inside_quad() {
        let quad = Quadrilateral::new(
            GeoPoint::new(48.87, 2.30),
            GeoPoint::new(48.88, 2.36),
            GeoPoint::new(48.84, 2.29),
            GeoPoint::new(48.845, 2.37),
        );
        let proj = WebMercator::with_origin(14.0, Pt2::new(2_120_000.0, 1_400_000.0));
        let t = CoordinateTransform::new(quad, ImageSize::new(1000, 750), proj).unwrap();

        for (x, y) in [(10.0, 10.0), (500.0, 375.0), (990.0, 20.0), (321.5, 700.25)] {
            let px = Pt2::new(x, y);
            let back = t.map_point_to_image_pixel(&t.image_pixel_to_map_point(&px));
            assert!((back - px).norm() < 1e-6 * 1000.0, "{px:?} -> {back:?}");
        }
    }

    #[test]
    fn polygon_keeps_vertex_order() {
        let t = CoordinateTransform::new(scenario(), ImageSize::new(200, 100), SimpleCrs::default())
            .unwrap();
        let poly = t.project_polygon(&[
            GeoPoint::new(10.0, 10.0),
            GeoPoint::new(10.0, 20.0),
            GeoPoint::new(0.0, 20.0),
        ]);
        assert_eq!(poly.len(), 3);
        assert!((poly[1] - Pt2::new(200.0, 0.0)).norm() < 1e-9);
        assert!((poly[2] - Pt2::new(200.0, 100.0)).norm() < 1e-9);
    }

    #[test]
    fn empty_preview_is_rejected() {
        let err = CoordinateTransform::new(scenario(), ImageSize::new(0, 100), SimpleCrs::default())
            .unwrap_err();
        assert_eq!(
            err,
            TransformError::EmptyPreview {
                width: 0,
                height: 100
            }
        );
    }

    #[test]
    fn collapsed_quad_reports_degenerate() {
        let p = GeoPoint::new(1.0, 1.0);
        let quad = Quadrilateral::new(p, GeoPoint::new(1.0, 2.0), p, GeoPoint::new(1.0, 2.0));
        let t = CoordinateTransform::new(quad, ImageSize::new(10, 10), SimpleCrs::default())
            .unwrap();
        assert!(t.conditioning().degenerate);
        assert!(t.homography().iter().all(|v| v.is_finite()));
    }
}
