pub mod detector;
pub mod padding;
pub mod patches;
pub mod remap;
pub mod yolo;

use std::sync::Arc;
use std::time::Instant;

use image::{DynamicImage, RgbImage};
use rayon::prelude::*;
use tracing::{debug, info};

use crate::config::TilingConfig;
use crate::error::{TileError, TileResult};
use crate::models::{Detection, DetectionOutput, PaddingInfo, Patch, PatchResult};
use crate::render;
use detector::Detector;

/// Tiled detection over one image: pad, cut into patches, run the
/// detector on every patch, then merge the boxes back onto the input.
pub struct DetectionPipeline {
    detector: Arc<dyn Detector>,
    config: TilingConfig,
    parallel: bool,
}

impl DetectionPipeline {
    pub fn new(detector: Arc<dyn Detector>, config: TilingConfig) -> Self {
        Self {
            detector,
            config,
            parallel: false,
        }
    }

    /// Run patch inference on the rayon pool. Output order is unchanged.
    pub fn with_parallel(mut self, parallel: bool) -> Self {
        self.parallel = parallel;
        self
    }

    /// Run the whole pipeline. Either every patch succeeds or a failure is
    /// returned; there are no partial results. Sequential runs report the
    /// lowest failing patch, parallel runs may report any failing patch.
    pub fn run(&self, input: &DynamicImage) -> TileResult<DetectionOutput> {
        self.config.validate()?;

        let rgb = input.to_rgb8();
        if rgb.width() == 0 || rgb.height() == 0 {
            return Err(TileError::InvalidImage(format!(
                "image has no pixels ({}x{})",
                rgb.width(),
                rgb.height()
            )));
        }

        let started = Instant::now();
        let patch_size = self.config.patch_size;
        let (padded, padding) = padding::pad_to_patch_size(rgb, patch_size);
        if padding.was_padded {
            debug!(
                "Padded {}x{} image to {}x{}",
                padding.original_width,
                padding.original_height,
                padded.width(),
                padded.height()
            );
        }

        let patches = patches::generate_patches(&padded, patch_size, self.config.stride);
        info!(
            "Processing {} patches of {}px (stride {}) with {}",
            patches.len(),
            patch_size,
            self.config.stride,
            self.detector.name()
        );
        debug!(
            "IoU threshold {} is reserved; overlapping detections are not merged",
            self.config.iou_threshold
        );

        let patch_results: Vec<PatchResult> = if self.parallel {
            patches
                .par_iter()
                .map(|patch| self.detect_patch(patch))
                .collect::<TileResult<Vec<_>>>()?
        } else {
            patches
                .iter()
                .map(|patch| self.detect_patch(patch))
                .collect::<TileResult<Vec<_>>>()?
        };

        let detections: Vec<_> = patch_results
            .iter()
            .flat_map(|r| remap::remap_with_offset(&r.detections, r.x_offset, r.y_offset))
            .collect();

        let annotated = merge_detections(&padded, &detections, &padding);

        let visualizations: Vec<&RgbImage> = patch_results.iter().map(|r| &r.visualization).collect();
        let patch_grid = render::patch_grid(
            &visualizations,
            self.config.max_grid_columns,
            self.config.grid_padding,
        );

        info!(
            "Found {} detections across {} patches in {:.2?}",
            detections.len(),
            patch_results.len(),
            started.elapsed()
        );

        Ok(DetectionOutput {
            patch_grid,
            annotated,
            detections,
            patches: patch_results,
            padding,
        })
    }

    fn detect_patch(&self, patch: &Patch) -> TileResult<PatchResult> {
        let failure = |source: anyhow::Error| TileError::DetectorFailure {
            patch_index: patch.index,
            source,
        };

        let raw = self.detector.predict(&patch.image).map_err(failure)?;
        detector::validate_detections(&raw).map_err(failure)?;
        let raw_count = raw.len();
        let detections = detector::filter_by_confidence(raw, self.config.conf_threshold);

        debug!(
            "Patch {} at ({}, {}): {} of {} detections above {:.2}",
            patch.index,
            patch.x_offset,
            patch.y_offset,
            detections.len(),
            raw_count,
            self.config.conf_threshold
        );

        let mut visualization = patch.image.clone();
        render::draw_boxes(&mut visualization, &detections, true);

        Ok(PatchResult {
            index: patch.index,
            x_offset: patch.x_offset,
            y_offset: patch.y_offset,
            detections,
            visualization,
        })
    }
}

/// Draw full-image boxes onto a copy of the padded image, then crop back
/// to the input size.
pub fn merge_detections(
    padded: &RgbImage,
    detections: &[Detection],
    padding: &PaddingInfo,
) -> RgbImage {
    let mut canvas = padded.clone();
    render::draw_boxes(&mut canvas, detections, true);
    padding::crop_to_original(&canvas, padding)
}
