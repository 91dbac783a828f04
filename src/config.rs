use serde::{Deserialize, Serialize};

use crate::error::{TileError, TileResult};

pub const DEFAULT_PATCH_SIZE: u32 = 640;
pub const DEFAULT_STRIDE: u32 = 80;
pub const DEFAULT_CONF_THRESHOLD: f32 = 0.40;
pub const DEFAULT_IOU_THRESHOLD: f32 = 0.45;
pub const DEFAULT_MAX_GRID_COLUMNS: usize = 5;
pub const DEFAULT_GRID_PADDING: u32 = 10;

/// Tiling and assembly parameters for one pipeline
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TilingConfig {
    /// Side of the square patch, equal to the model input size
    pub patch_size: u32,
    /// Distance between consecutive patch origins
    pub stride: u32,
    /// Detections strictly below this confidence are dropped
    pub conf_threshold: f32,
    /// Reserved. Validated but never applied: overlapping boxes from
    /// neighbouring patches are all kept.
    pub iou_threshold: f32,
    pub max_grid_columns: usize,
    /// Gap between cells of the diagnostic grid, in pixels
    pub grid_padding: u32,
}

impl Default for TilingConfig {
    fn default() -> Self {
        Self {
            patch_size: DEFAULT_PATCH_SIZE,
            stride: DEFAULT_STRIDE,
            conf_threshold: DEFAULT_CONF_THRESHOLD,
            iou_threshold: DEFAULT_IOU_THRESHOLD,
            max_grid_columns: DEFAULT_MAX_GRID_COLUMNS,
            grid_padding: DEFAULT_GRID_PADDING,
        }
    }
}

impl TilingConfig {
    pub fn with_patch_size(mut self, patch_size: u32) -> Self {
        self.patch_size = patch_size;
        self
    }

    pub fn with_stride(mut self, stride: u32) -> Self {
        self.stride = stride;
        self
    }

    pub fn with_conf_threshold(mut self, threshold: f32) -> Self {
        self.conf_threshold = threshold;
        self
    }

    pub fn with_iou_threshold(mut self, threshold: f32) -> Self {
        self.iou_threshold = threshold;
        self
    }

    pub fn with_grid(mut self, max_columns: usize, padding: u32) -> Self {
        self.max_grid_columns = max_columns;
        self.grid_padding = padding;
        self
    }

    pub fn validate(&self) -> TileResult<()> {
        if self.patch_size == 0 {
            return Err(TileError::Configuration(
                "patch_size must be positive".to_string(),
            ));
        }
        if self.stride == 0 {
            return Err(TileError::Configuration("stride must be positive".to_string()));
        }
        if self.max_grid_columns == 0 {
            return Err(TileError::Configuration(
                "max_grid_columns must be positive".to_string(),
            ));
        }
        check_unit_interval("conf_threshold", self.conf_threshold)?;
        check_unit_interval("iou_threshold", self.iou_threshold)?;
        Ok(())
    }
}

fn check_unit_interval(name: &str, value: f32) -> TileResult<()> {
    if !value.is_finite() || !(0.0..=1.0).contains(&value) {
        return Err(TileError::Configuration(format!(
            "{} must be within [0, 1], got {}",
            name, value
        )));
    }
    Ok(())
}
