mod fixtures;
pub use fixtures::*;

// Re-export commonly used types from patchscan for tests
pub use patchscan::{
    Detection, DetectionOutput, DetectionPipeline, Detector, PaddingInfo, TileError, TilingConfig,
};
