//! Preview ↔ full-resolution pixel scaling.

use georef_core::{ImageSize, Pt2, Real};
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ResolutionError {
    #[error("preview size must be non-zero, got {width}x{height}")]
    EmptyPreview { width: u32, height: u32 },
}

/// Independent horizontal and vertical scale factors from preview pixels to
/// native pixels. No clamping and no rounding.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ResolutionScale {
    pub scale_x: Real,
    pub scale_y: Real,
}

impl ResolutionScale {
    pub fn new(preview: ImageSize, full: ImageSize) -> Result<Self, ResolutionError> {
        if preview.is_empty() {
            return Err(ResolutionError::EmptyPreview {
                width: preview.width,
                height: preview.height,
            });
        }
        Ok(Self {
            scale_x: full.width as Real / preview.width as Real,
            scale_y: full.height as Real / preview.height as Real,
        })
    }

    pub fn to_full(&self, p: &Pt2) -> Pt2 {
        Pt2::new(p.x * self.scale_x, p.y * self.scale_y)
    }

    pub fn apply_all(&self, points: &[Pt2]) -> Vec<Pt2> {
        points.iter().map(|p| self.to_full(p)).collect()
    }
}
