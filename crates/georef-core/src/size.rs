use serde::{Deserialize, Serialize};

use crate::{Pt2, Real};

/// Pixel dimensions of a raster.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ImageSize {
    pub width: u32,
    pub height: u32,
}

impl ImageSize {
    pub fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    /// `true` if either dimension is zero.
    pub fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }

    /// Image-pixel corners in the fixed `[NW, NE, SW, SE]` order:
    /// `(0,0), (w,0), (0,h), (w,h)`.
    pub fn corners(&self) -> [Pt2; 4] {
        let (w, h) = (self.width as Real, self.height as Real);
        [
            Pt2::new(0.0, 0.0),
            Pt2::new(w, 0.0),
            Pt2::new(0.0, h),
            Pt2::new(w, h),
        ]
    }

    /// Size of a preview no wider than `max_width`, keeping the aspect ratio.
    ///
    /// Images already narrower than `max_width` keep their native size. The
    /// scaled height is rounded to the nearest pixel.
    pub fn fit_width(&self, max_width: u32) -> Self {
        if self.is_empty() || self.width <= max_width {
            return *self;
        }
        let h = (self.height as Real * (max_width as Real / self.width as Real)).round();
        Self::new(max_width, h.max(1.0) as u32)
    }
}
