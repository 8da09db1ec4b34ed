//! Georeferencing annotation document model.
//!
//! ```json
//! {
//!   "@context": ["http://iiif.io/api/extension/georef/1/context.json",
//!                "http://iiif.io/api/presentation/3/context.json"],
//!   "id": "<resourceId>#<timestamp>-<random>",
//!   "type": "Annotation",
//!   "motivation": "georeferencing",
//!   "target": { "type": "SpecificResource", "source": { ... }, "selector": { ... } },
//!   "body": { "type": "FeatureCollection", "transformation": { ... }, "features": [ ... ] }
//! }
//! ```
//!
//! Each fixed `type` member is a single-variant enum, so a document with a
//! missing or different `type` fails to deserialize.

use georef_core::{GeoPoint, Pt2, Real};
use georef_linear::Transformation;
use serde::{Deserialize, Serialize};

use crate::error::AnnotationError;
use crate::resource::ResourceDescriptor;
use crate::svg::parse_svg_polygon;

pub const GEOREF_CONTEXT: &str = "http://iiif.io/api/extension/georef/1/context.json";
pub const PRESENTATION_CONTEXT: &str = "http://iiif.io/api/presentation/3/context.json";
pub const ANNO_CONTEXT: &str = "http://www.w3.org/ns/anno.jsonld";
pub const MOTIVATION: &str = "georeferencing";

macro_rules! type_marker {
    ($($name:ident => $value:ident),* $(,)?) => {
        $(
            #[doc = concat!("The `\"", stringify!($value), "\"` type member.")]
            #[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
            pub enum $name {
                #[default]
                $value,
            }
        )*
    };
}

type_marker! {
    AnnotationType => Annotation,
    SpecificResourceType => SpecificResource,
    SvgSelectorType => SvgSelector,
    FeatureCollectionType => FeatureCollection,
    FeatureType => Feature,
    PointType => Point,
    AnnotationPageType => AnnotationPage,
}

/// One pixel ↔ geographic correspondence, in native pixel space.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GroundControlPoint {
    pub resource: Pt2,
    pub geo: GeoPoint,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Annotation {
    #[serde(rename = "type")]
    pub kind: AnnotationType,
    #[serde(rename = "@context")]
    pub context: Vec<String>,
    pub id: String,
    pub motivation: String,
    pub target: Target,
    pub body: FeatureCollection,
}

impl Annotation {
    pub fn resource(&self) -> &ResourceDescriptor {
        &self.target.source
    }

    pub fn transformation(&self) -> Transformation {
        self.body.transformation
    }

    /// GCPs in feature order.
    pub fn gcps(&self) -> Vec<GroundControlPoint> {
        self.body.features.iter().map(Feature::gcp).collect()
    }

    /// Vertices of the mask polygon.
    pub fn mask(&self) -> Result<Vec<Pt2>, AnnotationError> {
        parse_svg_polygon(&self.target.selector.value)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Target {
    #[serde(rename = "type")]
    pub kind: SpecificResourceType,
    pub source: ResourceDescriptor,
    pub selector: SvgSelector,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SvgSelector {
    #[serde(rename = "type")]
    pub kind: SvgSelectorType,
    pub value: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeatureCollection {
    #[serde(rename = "type")]
    pub kind: FeatureCollectionType,
    pub transformation: Transformation,
    pub features: Vec<Feature>,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Feature {
    #[serde(rename = "type")]
    pub kind: FeatureType,
    pub properties: FeatureProperties,
    pub geometry: PointGeometry,
}

impl Feature {
    pub fn from_gcp(gcp: &GroundControlPoint) -> Self {
        Self {
            kind: FeatureType::Feature,
            properties: FeatureProperties {
                resource_coords: [gcp.resource.x, gcp.resource.y],
            },
            geometry: PointGeometry {
                kind: PointType::Point,
                coordinates: gcp.geo.lng_lat(),
            },
        }
    }

    pub fn gcp(&self) -> GroundControlPoint {
        let [x, y] = self.properties.resource_coords;
        let [lng, lat] = self.geometry.coordinates;
        GroundControlPoint {
            resource: Pt2::new(x, y),
            geo: GeoPoint::new(lat, lng),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FeatureProperties {
    pub resource_coords: [Real; 2],
}

/// GeoJSON point; `coordinates` is `[lng, lat]`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PointGeometry {
    #[serde(rename = "type")]
    pub kind: PointType,
    pub coordinates: [Real; 2],
}

/// Ordered collection of annotations exported together.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnnotationPage {
    #[serde(rename = "type")]
    pub kind: AnnotationPageType,
    #[serde(rename = "@context")]
    pub context: String,
    pub items: Vec<Annotation>,
}

impl AnnotationPage {
    pub fn new(items: Vec<Annotation>) -> Self {
        Self {
            context: ANNO_CONTEXT.to_string(),
            kind: AnnotationPageType::AnnotationPage,
            items,
        }
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

impl Default for AnnotationPage {
    fn default() -> Self {
        Self::new(Vec::new())
    }
}
