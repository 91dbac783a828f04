use std::path::Path;

use serde::Serialize;

use crate::error::TileResult;
use crate::models::{Detection, DetectionOutput, PaddingInfo};

#[derive(Debug, Serialize)]
pub struct ImageSize {
    pub width: u32,
    pub height: u32,
}

#[derive(Debug, Serialize)]
pub struct PatchSummary {
    pub index: usize,
    pub x_offset: u32,
    pub y_offset: u32,
    pub detection_count: usize,
}

/// Machine-readable summary of one run
#[derive(Debug, Serialize)]
pub struct DetectionReport {
    pub image: ImageSize,
    pub padding: PaddingInfo,
    pub patch_count: usize,
    /// Full-image boxes
    pub detections: Vec<Detection>,
    pub patches: Vec<PatchSummary>,
}

impl DetectionReport {
    pub fn from_output(output: &DetectionOutput) -> Self {
        Self {
            image: ImageSize {
                width: output.annotated.width(),
                height: output.annotated.height(),
            },
            padding: output.padding,
            patch_count: output.patches.len(),
            detections: output.detections.clone(),
            patches: output
                .patches
                .iter()
                .map(|p| PatchSummary {
                    index: p.index,
                    x_offset: p.x_offset,
                    y_offset: p.y_offset,
                    detection_count: p.detections.len(),
                })
                .collect(),
        }
    }

    pub fn to_json(&self) -> TileResult<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn write(&self, path: &Path) -> TileResult<()> {
        std::fs::write(path, self.to_json()?)?;
        Ok(())
    }
}
