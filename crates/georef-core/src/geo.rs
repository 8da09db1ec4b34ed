//! Geographic primitives: points and the image-corner quadrilateral.
//!
//! Planar helpers on this module (rotation, convexity) treat a [`GeoPoint`]
//! as `(x = lng, y = lat)`.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::{Pt2, Real, cross2};

/// A geographic coordinate in the map's native frame.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeoPoint {
    pub lat: Real,
    pub lng: Real,
}

impl GeoPoint {
    pub fn new(lat: Real, lng: Real) -> Self {
        Self { lat, lng }
    }

    /// Planar view `(lng, lat)`.
    pub fn to_xy(&self) -> Pt2 {
        Pt2::new(self.lng, self.lat)
    }

    pub fn from_xy(p: &Pt2) -> Self {
        Self::new(p.y, p.x)
    }

    /// GeoJSON position order: `[lng, lat]`.
    pub fn lng_lat(&self) -> [Real; 2] {
        [self.lng, self.lat]
    }

    /// Euclidean distance in degrees; only meaningful for tolerances.
    pub fn planar_distance(&self, other: &GeoPoint) -> Real {
        (self.to_xy() - other.to_xy()).norm()
    }
}

impl From<[Real; 2]> for GeoPoint {
    /// Interprets the array as `[lat, lng]`.
    fn from(v: [Real; 2]) -> Self {
        Self::new(v[0], v[1])
    }
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum QuadrilateralError {
    #[error("corner {corner} is collinear with its neighbours")]
    Collinear { corner: &'static str },
    #[error("corners do not form a convex quadrilateral in NW, NE, SE, SW ring order")]
    NotConvex,
    #[error("corner {corner} is not a finite coordinate")]
    NonFinite { corner: &'static str },
}

/// Where the four image corners currently sit on the map.
///
/// The field order is the fixed corner convention `[NW, NE, SW, SE]` shared
/// with the image-pixel corners `(0,0), (w,0), (0,h), (w,h)`. Swapping two
/// corners silently mirrors or shears the resulting transform.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Quadrilateral {
    pub nw: GeoPoint,
    pub ne: GeoPoint,
    pub sw: GeoPoint,
    pub se: GeoPoint,
}

const CORNER_NAMES: [&str; 4] = ["NW", "NE", "SW", "SE"];

impl Quadrilateral {
    pub fn new(nw: GeoPoint, ne: GeoPoint, sw: GeoPoint, se: GeoPoint) -> Self {
        Self { nw, ne, sw, se }
    }

    /// Build from an array in `[NW, NE, SW, SE]` order.
    pub fn from_corners(c: [GeoPoint; 4]) -> Self {
        Self::new(c[0], c[1], c[2], c[3])
    }

    /// Corners in `[NW, NE, SW, SE]` order.
    pub fn corners(&self) -> [GeoPoint; 4] {
        [self.nw, self.ne, self.sw, self.se]
    }

    /// Sort four arbitrary corners into `[NW, NE, SW, SE]`.
    ///
    /// Corners are ordered by angle around their centroid; NW is the corner
    /// with the largest latitude (ties broken by the smaller longitude), and
    /// NE is whichever ring neighbour of NW lies further east.
    pub fn from_unordered(points: [GeoPoint; 4]) -> Self {
        let c = centroid(&points);
        let mut ring = points;
        ring.sort_by(|a, b| {
            let ta = (a.lat - c.lat).atan2(a.lng - c.lng);
            let tb = (b.lat - c.lat).atan2(b.lng - c.lng);
            ta.total_cmp(&tb)
        });

        let mut nw = 0;
        for (i, p) in ring.iter().enumerate() {
            let best = &ring[nw];
            if p.lat > best.lat || (p.lat == best.lat && p.lng < best.lng) {
                nw = i;
            }
        }
        let cyc = |k: usize| ring[(nw + k) % 4];
        let (a0, a1, a2, a3) = (cyc(0), cyc(1), cyc(2), cyc(3));

        if a1.lng >= a3.lng {
            Self::new(a0, a1, a3, a2)
        } else {
            Self::new(a0, a3, a1, a2)
        }
    }

    /// Axis-aligned rectangle of `width` (longitude) by `height` (latitude)
    /// centred on `center`.
    pub fn centered_rect(center: GeoPoint, width: Real, height: Real) -> Self {
        let (hw, hh) = (width / 2.0, height / 2.0);
        Self::new(
            GeoPoint::new(center.lat + hh, center.lng - hw),
            GeoPoint::new(center.lat + hh, center.lng + hw),
            GeoPoint::new(center.lat - hh, center.lng - hw),
            GeoPoint::new(center.lat - hh, center.lng + hw),
        )
    }

    pub fn centroid(&self) -> GeoPoint {
        centroid(&self.corners())
    }

    /// Rotate every corner counter-clockwise by `degrees` about `pivot`.
    pub fn rotated(&self, pivot: GeoPoint, degrees: Real) -> Self {
        let (sin, cos) = degrees.to_radians().sin_cos();
        let rot = |p: GeoPoint| {
            let dx = p.lng - pivot.lng;
            let dy = p.lat - pivot.lat;
            GeoPoint::new(pivot.lat + sin * dx + cos * dy, pivot.lng + cos * dx - sin * dy)
        };
        Self::new(rot(self.nw), rot(self.ne), rot(self.sw), rot(self.se))
    }

    pub fn translated(&self, d_lat: Real, d_lng: Real) -> Self {
        let t = |p: GeoPoint| GeoPoint::new(p.lat + d_lat, p.lng + d_lng);
        Self::new(t(self.nw), t(self.ne), t(self.sw), t(self.se))
    }

    /// Check the non-degeneracy precondition of the transform estimator.
    ///
    /// Walks the boundary NW → NE → SE → SW and requires every turn to be
    /// non-zero and in the same direction.
    pub fn validate(&self) -> Result<(), QuadrilateralError> {
        for (p, name) in self.corners().iter().zip(CORNER_NAMES) {
            if !p.lat.is_finite() || !p.lng.is_finite() {
                return Err(QuadrilateralError::NonFinite { corner: name });
            }
        }
        let ring = [self.nw, self.ne, self.se, self.sw].map(|p| p.to_xy());
        is_convex_ring(&ring)
    }
}

/// Convexity check for a 4-point ring in boundary order.
///
/// Shared by the geographic precondition and the layer-pixel conditioning
/// report of the transform service.
pub fn is_convex_ring(ring: &[Pt2; 4]) -> Result<(), QuadrilateralError> {
    // Boundary order is NW, NE, SE, SW.
    const RING_NAMES: [&str; 4] = ["NW", "NE", "SE", "SW"];

    let scale = ring
        .iter()
        .flat_map(|a| ring.iter().map(move |b| (a - b).norm()))
        .fold(0.0, Real::max);
    let tol = 1e-12 * scale * scale;

    let mut sign = 0.0;
    for i in 0..4 {
        let prev = &ring[(i + 3) % 4];
        let cur = &ring[i];
        let next = &ring[(i + 1) % 4];
        let turn = cross2(prev, cur, next);
        if turn.abs() <= tol {
            return Err(QuadrilateralError::Collinear {
                corner: RING_NAMES[i],
            });
        }
        if sign == 0.0 {
            sign = turn.signum();
        } else if turn.signum() != sign {
            return Err(QuadrilateralError::NotConvex);
        }
    }
    Ok(())
}

fn centroid(points: &[GeoPoint; 4]) -> GeoPoint {
    let (lat, lng) = points
        .iter()
        .fold((0.0, 0.0), |(a, b), p| (a + p.lat, b + p.lng));
    GeoPoint::new(lat / 4.0, lng / 4.0)
}
