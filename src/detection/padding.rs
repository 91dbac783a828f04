use image::{Rgb, RgbImage};

use crate::models::PaddingInfo;

/// Pad bottom/right with black pixels until both sides reach `patch_size`.
/// Images that already fit are returned untouched.
pub fn pad_to_patch_size(img: RgbImage, patch_size: u32) -> (RgbImage, PaddingInfo) {
    let (width, height) = img.dimensions();
    let info = PaddingInfo {
        was_padded: width < patch_size || height < patch_size,
        original_height: height,
        original_width: width,
    };

    if !info.was_padded {
        return (img, info);
    }

    let mut canvas = RgbImage::from_pixel(
        width.max(patch_size),
        height.max(patch_size),
        Rgb([0u8, 0u8, 0u8]),
    );
    image::imageops::replace(&mut canvas, &img, 0, 0);

    (canvas, info)
}

/// Top-left `height × width` region of `img`; no resampling
pub fn crop_to_original(img: &RgbImage, info: &PaddingInfo) -> RgbImage {
    if !info.was_padded {
        return img.clone();
    }
    image::imageops::crop_imm(img, 0, 0, info.original_width, info.original_height).to_image()
}
