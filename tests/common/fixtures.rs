use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use image::{DynamicImage, Rgb, RgbImage};
use patchscan::{Detection, Detector};

pub const WHITE: Rgb<u8> = Rgb([255, 255, 255]);
pub const GREEN: Rgb<u8> = Rgb([0, 255, 0]);
pub const BLACK: Rgb<u8> = Rgb([0, 0, 0]);

/// Black RGB image with a white rectangle covering `[x, x + w) × [y, y + h)`
pub fn image_with_square(width: u32, height: u32, x: u32, y: u32, w: u32, h: u32) -> DynamicImage {
    let img = RgbImage::from_fn(width, height, |px, py| {
        if px >= x && px < x + w && py >= y && py < y + h {
            WHITE
        } else {
            BLACK
        }
    });
    DynamicImage::ImageRgb8(img)
}

/// Gradient image so every patch has distinct content
pub fn gradient_image(width: u32, height: u32) -> RgbImage {
    RgbImage::from_fn(width, height, |x, y| {
        Rgb([(x % 251) as u8, (y % 241) as u8, ((x + y) % 239) as u8])
    })
}

/// Returns the same detections for every patch and counts calls
pub struct FixedDetector {
    pub detections: Vec<Detection>,
    pub calls: AtomicUsize,
}

impl FixedDetector {
    pub fn new(detections: Vec<Detection>) -> Arc<Self> {
        Arc::new(Self {
            detections,
            calls: AtomicUsize::new(0),
        })
    }

    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl Detector for FixedDetector {
    fn predict(&self, _patch: &RgbImage) -> anyhow::Result<Vec<Detection>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(self.detections.clone())
    }

    fn name(&self) -> &str {
        "fixed"
    }
}

/// Reports one box around all pure white pixels of the patch
pub struct BrightSpotDetector;

impl Detector for BrightSpotDetector {
    fn predict(&self, patch: &RgbImage) -> anyhow::Result<Vec<Detection>> {
        let mut bounds: Option<(u32, u32, u32, u32)> = None;
        for (x, y, pixel) in patch.enumerate_pixels() {
            if pixel.0 == [255, 255, 255] {
                bounds = Some(match bounds {
                    None => (x, y, x, y),
                    Some((x1, y1, x2, y2)) => (x1.min(x), y1.min(y), x2.max(x), y2.max(y)),
                });
            }
        }

        Ok(bounds
            .map(|(x1, y1, x2, y2)| {
                vec![Detection::new(
                    x1 as f32,
                    y1 as f32,
                    (x2 + 1) as f32,
                    (y2 + 1) as f32,
                    0.9,
                    0,
                )]
            })
            .unwrap_or_default())
    }

    fn name(&self) -> &str {
        "bright-spot"
    }
}

/// Always fails
pub struct FailingDetector;

impl Detector for FailingDetector {
    fn predict(&self, _patch: &RgbImage) -> anyhow::Result<Vec<Detection>> {
        anyhow::bail!("inference backend unavailable")
    }

    fn name(&self) -> &str {
        "failing"
    }
}

/// Returns a box with a NaN coordinate
pub struct MalformedDetector;

impl Detector for MalformedDetector {
    fn predict(&self, _patch: &RgbImage) -> anyhow::Result<Vec<Detection>> {
        Ok(vec![Detection::new(f32::NAN, 0.0, 10.0, 10.0, 0.8, 0)])
    }

    fn name(&self) -> &str {
        "malformed"
    }
}
