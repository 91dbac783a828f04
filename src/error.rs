use thiserror::Error;

#[derive(Debug, Error)]
pub enum TileError {
    #[error("Invalid image: {0}")]
    InvalidImage(String),

    #[error("Detector failed on patch {patch_index}: {source}")]
    DetectorFailure {
        patch_index: usize,
        #[source]
        source: anyhow::Error,
    },

    #[error("Invalid configuration: {0}")]
    Configuration(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to encode image: {0}")]
    Encode(#[from] image::ImageError),

    #[error("Failed to write report: {0}")]
    Report(#[from] serde_json::Error),
}

pub type TileResult<T> = Result<T, TileError>;
