use std::path::Path;

use anyhow::{Context, Result};
use image::{RgbImage, imageops::FilterType};
use rten::Model;
use rten_tensor::NdTensor;
use rten_tensor::prelude::*;

use crate::detection::detector::Detector;
use crate::models::Detection;

/// Post-processing the model applies to its own raw output.
///
/// These are part of the black box and independent of the pipeline's
/// confidence threshold.
#[derive(Debug, Clone)]
pub struct YoloParams {
    /// Square input side expected by the network
    pub input_size: u32,
    pub min_confidence: f32,
    /// IoU used by the model's per-patch, per-class suppression
    pub nms_iou: f32,
    pub max_detections: usize,
    /// Only report these class ids (None keeps every class)
    pub classes: Option<Vec<usize>>,
}

impl Default for YoloParams {
    fn default() -> Self {
        Self {
            input_size: 640,
            min_confidence: 0.25,
            nms_iou: 0.7,
            max_detections: 300,
            classes: None,
        }
    }
}

/// YOLOv8/YOLO11-style detector evaluated with RTen.
///
/// Expects a single `[1, 3, n, n]` input scaled to [0, 1] and a single
/// `[1, 4 + classes, anchors]` output of centre boxes and class scores.
pub struct YoloDetector {
    model: Model,
    params: YoloParams,
    name: String,
}

impl YoloDetector {
    pub fn load(path: impl AsRef<Path>, params: YoloParams) -> Result<Self> {
        let path = path.as_ref();
        if !path.exists() {
            anyhow::bail!("Model file not found: {}", path.display());
        }

        let model = Model::load_file(path)
            .with_context(|| format!("Failed to load model {}", path.display()))?;

        let name = path
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_else(|| "yolo".to_string());

        Ok(Self {
            model,
            params,
            name,
        })
    }

    fn to_input_tensor(&self, patch: &RgbImage) -> NdTensor<f32, 4> {
        let size = self.params.input_size;
        let n = size as usize;

        let resized;
        let source = if patch.dimensions() == (size, size) {
            patch
        } else {
            resized = image::imageops::resize(patch, size, size, FilterType::Triangle);
            &resized
        };

        let mut input = NdTensor::<f32, 4>::zeros([1, 3, n, n]);
        for (x, y, pixel) in source.enumerate_pixels() {
            for c in 0..3 {
                input[[0, c, y as usize, x as usize]] = pixel[c] as f32 / 255.0;
            }
        }
        input
    }
}

impl Detector for YoloDetector {
    fn predict(&self, patch: &RgbImage) -> Result<Vec<Detection>> {
        let input = self.to_input_tensor(patch);

        let output: NdTensor<f32, 3> = self
            .model
            .run_one(input.view().into(), None)
            .context("Model inference failed")?
            .try_into()
            .context("Unexpected model output type")?;

        let candidates = decode_output(&output, &self.params, patch.width(), patch.height())?;

        Ok(non_max_suppression(
            candidates,
            self.params.nms_iou,
            self.params.max_detections,
        ))
    }

    fn name(&self) -> &str {
        &self.name
    }
}

/// Turn a raw `[1, 4 + classes, anchors]` output into corner boxes in
/// patch pixels.
///
/// Each anchor takes its best-scoring class; anchors under
/// `min_confidence` or outside the class allow-list are skipped. Boxes are
/// scaled from the network input size back to `patch_width × patch_height`.
/// No suppression is applied here.
pub fn decode_output(
    output: &NdTensor<f32, 3>,
    params: &YoloParams,
    patch_width: u32,
    patch_height: u32,
) -> Result<Vec<Detection>> {
    let [batch, rows, anchors] = output.shape();
    if batch != 1 || rows < 5 {
        anyhow::bail!(
            "Unexpected model output shape [{}, {}, {}]",
            batch,
            rows,
            anchors
        );
    }

    let sx = patch_width as f32 / params.input_size as f32;
    let sy = patch_height as f32 / params.input_size as f32;

    let mut candidates = Vec::new();
    for i in 0..anchors {
        let mut class_id = 0;
        let mut best = f32::MIN;
        for c in 0..rows - 4 {
            let score = output[[0, 4 + c, i]];
            if score > best {
                best = score;
                class_id = c;
            }
        }

        if best < params.min_confidence {
            continue;
        }
        if let Some(classes) = &params.classes {
            if !classes.contains(&class_id) {
                continue;
            }
        }

        let cx = output[[0, 0, i]];
        let cy = output[[0, 1, i]];
        let w = output[[0, 2, i]];
        let h = output[[0, 3, i]];

        candidates.push(Detection::new(
            (cx - w / 2.0) * sx,
            (cy - h / 2.0) * sy,
            (cx + w / 2.0) * sx,
            (cy + h / 2.0) * sy,
            best.clamp(0.0, 1.0),
            class_id,
        ));
    }

    Ok(candidates)
}

/// Greedy per-class suppression, highest confidence first
pub fn non_max_suppression(
    mut candidates: Vec<Detection>,
    iou_threshold: f32,
    max_detections: usize,
) -> Vec<Detection> {
    candidates.sort_by(|a, b| b.confidence.total_cmp(&a.confidence));

    let mut kept: Vec<Detection> = Vec::new();
    for candidate in candidates {
        if kept.len() >= max_detections {
            break;
        }
        let suppressed = kept
            .iter()
            .any(|k| k.class_id == candidate.class_id && k.iou(&candidate) > iou_threshold);
        if !suppressed {
            kept.push(candidate);
        }
    }
    kept
}
