//! What the editor hands over when the user saves: the snapshot, the
//! resource candidates and the configuration both flows share.

use anyhow::{Context, Result, anyhow, ensure};
use georef_annotation::{
    DEFAULT_PREVIEW_MAX, ImageApiVersion, ImageServiceInfo, ResourceDescriptor, preview_image_url,
};
use georef_core::{GeoPoint, ImageSize, ProjectionConfig, Quadrilateral};
use georef_linear::ClassifierConfig;
use log::debug;
use serde::{Deserialize, Serialize};

/// Configuration shared by the single-save and project flows.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct GeorefConfig {
    /// How the map places geographic coordinates on its pixel layer.
    pub projection: ProjectionConfig,
    pub classifier: ClassifierConfig,
    /// Round native pixel coordinates to whole pixels before building.
    pub round_resource_coords: bool,
    /// Longest preview edge requested from an image service.
    pub preview_max: u32,
}

impl Default for GeorefConfig {
    fn default() -> Self {
        Self {
            projection: ProjectionConfig::default(),
            classifier: ClassifierConfig::default(),
            round_resource_coords: false,
            preview_max: DEFAULT_PREVIEW_MAX,
        }
    }
}

impl GeorefConfig {
    pub fn validate(&self) -> Result<()> {
        let zoom = match &self.projection {
            ProjectionConfig::WebMercator(m) => m.zoom,
            ProjectionConfig::Simple(s) => s.zoom,
        };
        ensure!(zoom.is_finite(), "projection zoom must be finite");
        if let ProjectionConfig::WebMercator(m) = &self.projection {
            ensure!(
                m.pixel_origin.x.is_finite() && m.pixel_origin.y.is_finite(),
                "pixel origin must be finite"
            );
        }
        let threshold = self.classifier.perspective_threshold;
        ensure!(
            threshold.is_finite() && threshold > 0.0,
            "perspective threshold must be positive, got {threshold}"
        );
        ensure!(self.preview_max > 0, "preview_max must be positive");
        Ok(())
    }
}

/// Image service the editor displays.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ServiceSource {
    /// Service base URL (without `/info.json`).
    pub base: String,
    /// Unknown when the editor did not read the service description.
    #[serde(default)]
    pub version: Option<ImageApiVersion>,
}

/// Canvas the image belongs to.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CanvasSource {
    pub id: String,
    #[serde(default)]
    pub manifest: Option<String>,
}

/// Everything known about the georeferenced resource before resolution.
///
/// `width`/`height` are the native dimensions as reported by the canvas or
/// service the editor was opened from.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResourceSources {
    #[serde(default)]
    pub image_service: Option<ServiceSource>,
    #[serde(default)]
    pub canvas: Option<CanvasSource>,
    #[serde(default)]
    pub width: Option<u32>,
    #[serde(default)]
    pub height: Option<u32>,
}

impl ResourceSources {
    pub fn native_size(&self) -> Option<ImageSize> {
        match (self.width, self.height) {
            (Some(w), Some(h)) if w > 0 && h > 0 => Some(ImageSize::new(w, h)),
            _ => None,
        }
    }

    /// Preview URL of the image service, if there is one.
    pub fn preview_url(&self, max: u32) -> Option<String> {
        self.image_service
            .as_ref()
            .filter(|s| !s.base.trim().is_empty())
            .map(|s| preview_image_url(&s.base, max))
    }
}

/// One editor state at save time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EditorSnapshot {
    /// Image corners on the map, `[NW, NE, SW, SE]`.
    pub corners: Quadrilateral,
    /// Natural size of the displayed preview raster.
    pub preview: ImageSize,
    /// User-drawn mask polygon; its vertices become the GCPs.
    pub polygon: Vec<GeoPoint>,
    pub resource: ResourceSources,
}

impl EditorSnapshot {
    pub fn validate(&self) -> Result<()> {
        ensure!(
            !self.preview.is_empty(),
            "preview size must be non-zero, got {}x{}",
            self.preview.width,
            self.preview.height
        );
        ensure!(
            self.polygon.len() >= 3,
            "polygon needs at least 3 vertices, got {}",
            self.polygon.len()
        );
        for (i, v) in self.polygon.iter().enumerate() {
            ensure!(
                v.lat.is_finite() && v.lng.is_finite(),
                "polygon vertex {i} is not finite"
            );
        }
        Ok(())
    }
}

/// Recovers native dimensions from an image service description when the
/// editor did not know them.
pub trait NativeSizeProvider {
    fn image_service_info(&self, base: &str) -> Result<ImageServiceInfo>;
}

impl<F> NativeSizeProvider for F
where
    F: Fn(&str) -> Result<ImageServiceInfo>,
{
    fn image_service_info(&self, base: &str) -> Result<ImageServiceInfo> {
        self(base)
    }
}

/// Provider for callers without network access: always fails.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoFallback;

impl NativeSizeProvider for NoFallback {
    fn image_service_info(&self, base: &str) -> Result<ImageServiceInfo> {
        Err(anyhow!("no native size provider configured for {base}"))
    }
}

/// Pick the resource the annotation targets.
///
/// Priority: image service with known size, then canvas (with manifest
/// link) with known size, then the image service description fetched
/// through `provider`.
///
/// # Errors
///
/// No candidate has native dimensions, or the provider fails.
pub fn resolve_resource(
    sources: &ResourceSources,
    provider: &dyn NativeSizeProvider,
) -> Result<ResourceDescriptor> {
    let service = sources
        .image_service
        .as_ref()
        .filter(|s| !s.base.trim().is_empty());

    if let Some(size) = sources.native_size() {
        if let Some(s) = service {
            let version = s.version.unwrap_or(ImageApiVersion::V2);
            return Ok(ResourceDescriptor::image_service(&s.base, version, size));
        }
        if let Some(c) = sources.canvas.as_ref().filter(|c| c.manifest.is_some()) {
            return Ok(ResourceDescriptor::canvas(
                c.id.clone(),
                size,
                c.manifest.as_deref(),
            ));
        }
    }

    let s = service.ok_or_else(|| anyhow!("resource has no native size and no image service"))?;
    debug!("native size unknown; asking provider for {}", s.base);
    let info = provider
        .image_service_info(&s.base)
        .with_context(|| format!("failed to read image service description of {}", s.base))?;
    let mut descriptor = info
        .to_descriptor()?
        .ok_or_else(|| anyhow!("image service {} reports no width/height", s.base))?;
    if descriptor.id != s.base.trim_end_matches('/') {
        debug!("service reports id {}, keeping {}", descriptor.id, s.base);
        descriptor.id = s.base.trim_end_matches('/').to_string();
    }
    Ok(descriptor)
}
