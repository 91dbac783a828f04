use crate::models::{Detection, Patch};

/// Move a patch's local boxes into full-image coordinates
pub fn remap_to_image(detections: &[Detection], patch: &Patch) -> Vec<Detection> {
    remap_with_offset(detections, patch.x_offset, patch.y_offset)
}

pub fn remap_with_offset(detections: &[Detection], x_offset: u32, y_offset: u32) -> Vec<Detection> {
    let (dx, dy) = (x_offset as f32, y_offset as f32);
    detections.iter().map(|d| d.translate(dx, dy)).collect()
}
