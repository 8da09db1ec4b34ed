//! The georeferenced resource: what the annotation targets.
//!
//! Width and height are always the **native** pixel dimensions; every pixel
//! coordinate in an annotation lives in that space.

use georef_core::ImageSize;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::AnnotationError;

pub const TYPE_CANVAS: &str = "Canvas";
pub const TYPE_MANIFEST: &str = "Manifest";
pub const TYPE_IMAGE_SERVICE_2: &str = "ImageService2";
pub const TYPE_IMAGE_SERVICE_3: &str = "ImageService3";

/// Default edge length of the preview requested from an image service.
pub const DEFAULT_PREVIEW_MAX: u32 = 2400;

/// Parent link of a resource, e.g. the manifest a canvas belongs to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PartOf {
    pub id: String,
    #[serde(rename = "type")]
    pub kind: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResourceDescriptor {
    pub id: String,
    #[serde(rename = "type")]
    pub kind: String,
    pub width: u32,
    pub height: u32,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub part_of: Vec<PartOf>,
}

impl ResourceDescriptor {
    pub fn new(id: impl Into<String>, kind: impl Into<String>, size: ImageSize) -> Self {
        Self {
            id: id.into(),
            kind: kind.into(),
            width: size.width,
            height: size.height,
            part_of: Vec::new(),
        }
    }

    /// Image service resource of the given API version.
    pub fn image_service(base: &str, version: ImageApiVersion, size: ImageSize) -> Self {
        Self::new(trim_base(base), version.resource_type(), size)
    }

    /// Canvas resource, linked to its manifest when one is known.
    pub fn canvas(id: impl Into<String>, size: ImageSize, manifest: Option<&str>) -> Self {
        let mut r = Self::new(id, TYPE_CANVAS, size);
        if let Some(m) = manifest {
            r.part_of.push(PartOf {
                id: m.to_string(),
                kind: TYPE_MANIFEST.to_string(),
            });
        }
        r
    }

    pub fn size(&self) -> ImageSize {
        ImageSize::new(self.width, self.height)
    }

    /// Check the fields an annotation cannot do without.
    pub fn validate(&self) -> Result<(), AnnotationError> {
        if self.id.trim().is_empty() {
            return Err(AnnotationError::MissingResourceId);
        }
        if self.kind.trim().is_empty() {
            return Err(AnnotationError::MissingResourceType);
        }
        if self.size().is_empty() {
            return Err(AnnotationError::MissingResourceSize {
                width: self.width,
                height: self.height,
            });
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ImageApiVersion {
    V2,
    V3,
}

impl ImageApiVersion {
    /// Detect the version from an `@context` value (string or array).
    /// Anything not naming `/image/3` is treated as version 2.
    pub fn from_context(context: &Value) -> Self {
        let mentions_v3 = |s: &str| s.to_ascii_lowercase().contains("/image/3");
        let v3 = match context {
            Value::String(s) => mentions_v3(s),
            Value::Array(items) => items.iter().filter_map(Value::as_str).any(mentions_v3),
            _ => false,
        };
        if v3 { Self::V3 } else { Self::V2 }
    }

    pub fn resource_type(self) -> &'static str {
        match self {
            Self::V2 => TYPE_IMAGE_SERVICE_2,
            Self::V3 => TYPE_IMAGE_SERVICE_3,
        }
    }
}

/// The subset of an image service description (`info.json`) used here.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct ImageServiceInfo {
    #[serde(rename = "@context", default)]
    pub context: Value,
    #[serde(default, alias = "@id")]
    pub id: String,
    #[serde(default)]
    pub width: Option<u32>,
    #[serde(default)]
    pub height: Option<u32>,
}

impl ImageServiceInfo {
    pub fn api_version(&self) -> ImageApiVersion {
        ImageApiVersion::from_context(&self.context)
    }

    pub fn size(&self) -> Option<ImageSize> {
        match (self.width, self.height) {
            (Some(w), Some(h)) if w > 0 && h > 0 => Some(ImageSize::new(w, h)),
            _ => None,
        }
    }

    /// Descriptor for this service, if it reports both dimensions.
    pub fn to_descriptor(&self) -> Result<Option<ResourceDescriptor>, AnnotationError> {
        if self.id.trim().is_empty() {
            return Err(AnnotationError::MissingServiceId);
        }
        Ok(self
            .size()
            .map(|size| ResourceDescriptor::image_service(&self.id, self.api_version(), size)))
    }
}

/// URL of a preview no larger than `max` on either side:
/// `{base}/full/!{max},{max}/0/default.jpg`.
pub fn preview_image_url(base: &str, max: u32) -> String {
    format!("{}/full/!{max},{max}/0/default.jpg", trim_base(base))
}

fn trim_base(base: &str) -> &str {
    base.trim_end_matches('/')
}
