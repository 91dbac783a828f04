use image::RgbImage;

use crate::models::Patch;

/// Top-left corners of every full patch, `y` outer and `x` inner.
///
/// Origins run from 0 to `side - patch_size` inclusive in steps of
/// `stride`. When the stride does not divide the remainder, the trailing
/// strip gets no extra patch. Empty if either side is below `patch_size`.
pub fn patch_origins(width: u32, height: u32, patch_size: u32, stride: u32) -> Vec<(u32, u32)> {
    if patch_size == 0 || stride == 0 || width < patch_size || height < patch_size {
        return Vec::new();
    }

    let step = stride as usize;
    let mut origins = Vec::new();
    for y in (0..=height - patch_size).step_by(step) {
        for x in (0..=width - patch_size).step_by(step) {
            origins.push((x, y));
        }
    }
    origins
}

/// Number of patches [`patch_origins`] would produce, without allocating
pub fn patch_count(width: u32, height: u32, patch_size: u32, stride: u32) -> usize {
    if patch_size == 0 || stride == 0 || width < patch_size || height < patch_size {
        return 0;
    }
    let per_axis = |side: u32| ((side - patch_size) / stride + 1) as usize;
    per_axis(height) * per_axis(width)
}

/// Cut the image into `patch_size × patch_size` windows in row-major order
pub fn generate_patches(img: &RgbImage, patch_size: u32, stride: u32) -> Vec<Patch> {
    let (width, height) = img.dimensions();

    patch_origins(width, height, patch_size, stride)
        .into_iter()
        .enumerate()
        .map(|(index, (x, y))| Patch {
            index,
            x_offset: x,
            y_offset: y,
            image: image::imageops::crop_imm(img, x, y, patch_size, patch_size).to_image(),
        })
        .collect()
}
