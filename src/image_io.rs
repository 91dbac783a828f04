use std::path::{Path, PathBuf};

use image::{DynamicImage, ImageReader, RgbImage};

use crate::error::{TileError, TileResult};

/// Decode an image file, guessing the format from its content
pub fn load_image(path: &Path) -> TileResult<DynamicImage> {
    let reader = ImageReader::open(path)
        .map_err(|e| TileError::InvalidImage(format!("{}: {}", path.display(), e)))?
        .with_guessed_format()
        .map_err(|e| TileError::InvalidImage(format!("{}: {}", path.display(), e)))?;

    reader
        .decode()
        .map_err(|e| TileError::InvalidImage(format!("Failed to decode {}: {}", path.display(), e)))
}

/// Decode an in-memory encoded image (PNG, JPEG, ...)
pub fn decode_image(bytes: &[u8]) -> TileResult<DynamicImage> {
    image::load_from_memory(bytes)
        .map_err(|e| TileError::InvalidImage(format!("Failed to decode image: {}", e)))
}

pub fn save_png(img: &RgbImage, path: &Path) -> TileResult<()> {
    img.save_with_format(path, image::ImageFormat::Png)?;
    Ok(())
}

/// Prepare a debug output directory. It must be empty or not exist yet.
pub fn prepare_debug_dir(dir: &Path) -> TileResult<PathBuf> {
    if dir.exists() {
        let entries = std::fs::read_dir(dir)?;
        if entries.count() > 0 {
            return Err(TileError::Configuration(format!(
                "Debug directory is not empty: {}",
                dir.display()
            )));
        }
    } else {
        std::fs::create_dir_all(dir)?;
    }
    Ok(dir.to_path_buf())
}
