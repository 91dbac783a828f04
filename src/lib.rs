pub mod config;
pub mod detection;
pub mod error;
pub mod image_io;
pub mod logging;
pub mod models;
pub mod render;
pub mod report;

pub use config::TilingConfig;
pub use detection::DetectionPipeline;
pub use detection::detector::Detector;
pub use detection::yolo::{YoloDetector, YoloParams};
pub use error::{TileError, TileResult};
pub use models::{Detection, DetectionOutput, PaddingInfo, Patch, PatchResult};
pub use report::DetectionReport;
