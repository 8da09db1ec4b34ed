//! Geographic ↔ layer-pixel projections.
//!
//! A map widget places geographic coordinates on a flat pixel layer. The
//! transform service only needs that mapping and its inverse, so the widget
//! is represented here by the [`MapProjection`] trait. Two reference
//! implementations match the common map frames:
//!
//! - [`WebMercator`]: spherical Mercator (EPSG:3857) at a given zoom, shifted
//!   by the layer's pixel origin.
//! - [`SimpleCrs`]: flat frame where `x = lng`, `y = -lat` (scaled by zoom),
//!   used when the "map" is itself an image canvas.

use std::f64::consts::PI;

use serde::{Deserialize, Serialize};

use crate::{GeoPoint, Pt2, Real};

/// Mapping between geographic coordinates and map-layer pixels.
pub trait MapProjection {
    /// Geographic → layer pixel.
    fn project(&self, geo: &GeoPoint) -> Pt2;

    /// Layer pixel → geographic.
    fn unproject(&self, px: &Pt2) -> GeoPoint;
}

/// Sphere radius of EPSG:3857.
pub const EARTH_RADIUS: Real = 6_378_137.0;
/// Latitude limit of the square Web Mercator world.
pub const MAX_LATITUDE: Real = 85.051_128_779_8;
/// Tile edge in pixels at zoom 0.
pub const TILE_SIZE: Real = 256.0;

/// Spherical Mercator at a fixed zoom.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WebMercator {
    /// Zoom level; fractional zoom is allowed.
    pub zoom: Real,
    /// World-pixel coordinate of the layer's top-left corner.
    #[serde(default = "origin")]
    pub pixel_origin: Pt2,
}

fn origin() -> Pt2 {
    Pt2::origin()
}

impl WebMercator {
    pub fn new(zoom: Real) -> Self {
        Self {
            zoom,
            pixel_origin: Pt2::origin(),
        }
    }

    pub fn with_origin(zoom: Real, pixel_origin: Pt2) -> Self {
        Self { zoom, pixel_origin }
    }

    fn world_size(&self) -> Real {
        TILE_SIZE * self.zoom.exp2()
    }
}

impl MapProjection for WebMercator {
    fn project(&self, geo: &GeoPoint) -> Pt2 {
        let lat = geo.lat.clamp(-MAX_LATITUDE, MAX_LATITUDE).to_radians();
        let sin = lat.sin();
        let mx = EARTH_RADIUS * geo.lng.to_radians();
        let my = EARTH_RADIUS * ((1.0 + sin) / (1.0 - sin)).ln() / 2.0;

        let k = 0.5 / (PI * EARTH_RADIUS);
        let size = self.world_size();
        Pt2::new(
            size * (k * mx + 0.5) - self.pixel_origin.x,
            size * (-k * my + 0.5) - self.pixel_origin.y,
        )
    }

    fn unproject(&self, px: &Pt2) -> GeoPoint {
        let k = 0.5 / (PI * EARTH_RADIUS);
        let size = self.world_size();
        let mx = ((px.x + self.pixel_origin.x) / size - 0.5) / k;
        let my = ((px.y + self.pixel_origin.y) / size - 0.5) / -k;

        let lng = (mx / EARTH_RADIUS).to_degrees();
        let lat = (2.0 * (my / EARTH_RADIUS).exp().atan() - PI / 2.0).to_degrees();
        GeoPoint::new(lat, lng)
    }
}

/// Flat frame: `x = lng · 2^zoom`, `y = -lat · 2^zoom`.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct SimpleCrs {
    #[serde(default)]
    pub zoom: Real,
}

impl SimpleCrs {
    pub fn new(zoom: Real) -> Self {
        Self { zoom }
    }
}

impl MapProjection for SimpleCrs {
    fn project(&self, geo: &GeoPoint) -> Pt2 {
        let s = self.zoom.exp2();
        Pt2::new(geo.lng * s, -geo.lat * s)
    }

    fn unproject(&self, px: &Pt2) -> GeoPoint {
        let s = self.zoom.exp2();
        GeoPoint::new(-px.y / s, px.x / s)
    }
}

/// Serializable choice of projection.
///
/// ```json
/// { "type": "webMercator", "zoom": 13, "pixelOrigin": [1863000.0, 825000.0] }
/// { "type": "simple", "zoom": 0 }
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum ProjectionConfig {
    WebMercator(WebMercator),
    Simple(SimpleCrs),
}

impl Default for ProjectionConfig {
    fn default() -> Self {
        Self::Simple(SimpleCrs::default())
    }
}

impl MapProjection for ProjectionConfig {
    fn project(&self, geo: &GeoPoint) -> Pt2 {
        match self {
            Self::WebMercator(p) => p.project(geo),
            Self::Simple(p) => p.project(geo),
        }
    }

    fn unproject(&self, px: &Pt2) -> GeoPoint {
        match self {
            Self::WebMercator(p) => p.unproject(px),
            Self::Simple(p) => p.unproject(px),
        }
    }
}

impl<P: MapProjection + ?Sized> MapProjection for &P {
    fn project(&self, geo: &GeoPoint) -> Pt2 {
        (**self).project(geo)
    }

    fn unproject(&self, px: &Pt2) -> GeoPoint {
        (**self).unproject(px)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mercator_known_values() {
        let m = WebMercator::new(0.0);
        let p = m.project(&GeoPoint::new(0.0, 0.0));
        assert!((p.x - 128.0).abs() < 1e-9);
        assert!((p.y - 128.0).abs() < 1e-9);

        let east = m.project(&GeoPoint::new(0.0, 180.0));
        assert!((east.x - 256.0).abs() < 1e-9);

        let north = m.project(&GeoPoint::new(MAX_LATITUDE, 0.0));
        assert!(north.y.abs() < 1e-6);
    }

    #[test]
    fn mercator_roundtrip_with_origin() {
        let m = WebMercator::with_origin(13.0, Pt2::new(1_863_000.0, 825_000.0));
        for geo in [
            GeoPoint::new(35.6812, 139.7671),
            GeoPoint::new(-33.86, 151.21),
            GeoPoint::new(60.0, -20.5),
        ] {
            let back = m.unproject(&m.project(&geo));
            assert!(back.planar_distance(&geo) < 1e-9, "{geo:?} -> {back:?}");
        }
    }

    #[test]
    fn simple_crs_flips_latitude() {
        let s = SimpleCrs::new(1.0);
        let p = s.project(&GeoPoint::new(10.0, 20.0));
        assert_eq!(p, Pt2::new(40.0, -20.0));
        assert_eq!(s.unproject(&p), GeoPoint::new(10.0, 20.0));
    }

    #[test]
    fn config_serde_shape() {
        let cfg = ProjectionConfig::WebMercator(WebMercator::new(13.0));
        let json = serde_json::to_value(cfg).unwrap();
        assert_eq!(json["type"], "webMercator");
        assert_eq!(json["zoom"], 13.0);

        let parsed: ProjectionConfig =
            serde_json::from_str(r#"{"type":"simple","zoom":2}"#).unwrap();
        assert_eq!(parsed, ProjectionConfig::Simple(SimpleCrs::new(2.0)));

        let defaulted: ProjectionConfig =
            serde_json::from_str(r#"{"type":"webMercator","zoom":3}"#).unwrap();
        assert_eq!(
            defaulted,
            ProjectionConfig::WebMercator(WebMercator::new(3.0))
        );
    }
}
