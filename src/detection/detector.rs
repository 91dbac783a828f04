use image::RgbImage;

use crate::models::Detection;

/// The model boundary: one square patch in, patch-local boxes out.
///
/// Implementations are built once and shared read-only between requests,
/// so `predict` takes `&self`.
pub trait Detector: Send + Sync {
    fn predict(&self, patch: &RgbImage) -> anyhow::Result<Vec<Detection>>;

    /// Human-readable name (used in log output)
    fn name(&self) -> &str;
}

/// Drop detections strictly below `threshold`; equal values are kept
pub fn filter_by_confidence(detections: Vec<Detection>, threshold: f32) -> Vec<Detection> {
    detections
        .into_iter()
        .filter(|d| d.confidence >= threshold)
        .collect()
}

/// Reject non-finite boxes or confidences outside [0, 1]
pub fn validate_detections(detections: &[Detection]) -> anyhow::Result<()> {
    if let Some((i, bad)) = detections
        .iter()
        .enumerate()
        .find(|(_, d)| !d.is_well_formed())
    {
        anyhow::bail!("Malformed detection #{}: {:?}", i, bad);
    }
    Ok(())
}
