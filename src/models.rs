use image::RgbImage;
use serde::{Deserialize, Serialize};

/// A single detector output: corner box, confidence and class id.
///
/// The coordinate space depends on where the value came from: detectors
/// return patch-local boxes, [`Detection::translate`] moves them into
/// full-image space.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Detection {
    pub x1: f32,
    pub y1: f32,
    pub x2: f32,
    pub y2: f32,
    pub confidence: f32,
    pub class_id: usize,
}

impl Detection {
    pub fn new(x1: f32, y1: f32, x2: f32, y2: f32, confidence: f32, class_id: usize) -> Self {
        Self {
            x1,
            y1,
            x2,
            y2,
            confidence,
            class_id,
        }
    }

    /// Shift all four corners by the given offset. Nothing else changes.
    pub fn translate(&self, dx: f32, dy: f32) -> Self {
        Self {
            x1: self.x1 + dx,
            y1: self.y1 + dy,
            x2: self.x2 + dx,
            y2: self.y2 + dy,
            ..*self
        }
    }

    pub fn width(&self) -> f32 {
        (self.x2 - self.x1).max(0.0)
    }

    pub fn height(&self) -> f32 {
        (self.y2 - self.y1).max(0.0)
    }

    pub fn area(&self) -> f32 {
        self.width() * self.height()
    }

    /// Intersection over union with another box
    pub fn iou(&self, other: &Detection) -> f32 {
        let ix1 = self.x1.max(other.x1);
        let iy1 = self.y1.max(other.y1);
        let ix2 = self.x2.min(other.x2);
        let iy2 = self.y2.min(other.y2);

        let inter = (ix2 - ix1).max(0.0) * (iy2 - iy1).max(0.0);
        let union = self.area() + other.area() - inter;
        if union <= 0.0 {
            return 0.0;
        }
        inter / union
    }

    /// Finite coordinates and a confidence inside [0, 1]
    pub fn is_well_formed(&self) -> bool {
        [self.x1, self.y1, self.x2, self.y2].iter().all(|v| v.is_finite())
            && (0.0..=1.0).contains(&self.confidence)
    }
}

/// Fixed-size square window cut from the padded image
#[derive(Debug, Clone)]
pub struct Patch {
    /// Position in generation order (row-major)
    pub index: usize,
    pub x_offset: u32,
    pub y_offset: u32,
    pub image: RgbImage,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaddingInfo {
    pub was_padded: bool,
    pub original_height: u32,
    pub original_width: u32,
}

impl PaddingInfo {
    /// Size before padding as `(height, width)`
    pub fn original_size(&self) -> (u32, u32) {
        (self.original_height, self.original_width)
    }
}

/// Detections found in one patch plus its rendered visualization
#[derive(Debug, Clone)]
pub struct PatchResult {
    pub index: usize,
    pub x_offset: u32,
    pub y_offset: u32,
    /// Patch-local boxes that survived the confidence filter
    pub detections: Vec<Detection>,
    pub visualization: RgbImage,
}

/// Everything a single pipeline run produces
#[derive(Debug, Clone)]
pub struct DetectionOutput {
    pub patch_grid: RgbImage,
    /// Annotated image, cropped back to the input size
    pub annotated: RgbImage,
    /// Full-image boxes in patch order
    pub detections: Vec<Detection>,
    pub patches: Vec<PatchResult>,
    pub padding: PaddingInfo,
}
