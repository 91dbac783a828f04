use std::borrow::Borrow;

use image::{Rgb, RgbImage};

use crate::render::font;

/// Height of the caption strip above each cell
pub const LABEL_HEIGHT: u32 = 20;
const LABEL_INSET: i32 = 5;
const LABEL_SCALE: u32 = 2;
const BACKGROUND: Rgb<u8> = Rgb([255, 255, 255]);
const LABEL_COLOR: Rgb<u8> = Rgb([0, 0, 0]);

/// Pixel size of the grid for `count` cells of `cell_width × cell_height`
pub fn grid_dimensions(
    count: usize,
    cell_width: u32,
    cell_height: u32,
    max_cols: usize,
    padding: u32,
) -> (u32, u32) {
    if count == 0 || max_cols == 0 {
        return (0, 0);
    }
    let cols = max_cols.min(count) as u32;
    let rows = count.div_ceil(cols as usize) as u32;

    let width = cols * cell_width + (cols - 1) * padding;
    let height = rows * cell_height + (rows - 1) * padding + LABEL_HEIGHT * rows;
    (width, height)
}

/// Top-left of cell `index` (its caption strip), in grid pixels
pub fn cell_origin(index: usize, cell_width: u32, cell_height: u32, cols: usize, padding: u32) -> (u32, u32) {
    let row = (index / cols) as u32;
    let col = (index % cols) as u32;
    (
        col * (cell_width + padding),
        row * (cell_height + padding + LABEL_HEIGHT),
    )
}

/// Lay out patch visualizations on a white canvas, captioned
/// "Patch {index}" in generation order.
///
/// All cells take the first image's size. An empty slice gives a 0×0 image.
pub fn patch_grid<I: Borrow<RgbImage>>(images: &[I], max_cols: usize, padding: u32) -> RgbImage {
    let Some(first) = images.first() else {
        return RgbImage::new(0, 0);
    };
    let first: &RgbImage = first.borrow();
    let max_cols = max_cols.max(1);
    let (cell_width, cell_height) = first.dimensions();
    let cols = max_cols.min(images.len());

    let (width, height) = grid_dimensions(images.len(), cell_width, cell_height, cols, padding);
    let mut grid = RgbImage::from_pixel(width, height, BACKGROUND);

    for (idx, img) in images.iter().enumerate() {
        let img: &RgbImage = img.borrow();
        let (x, y) = cell_origin(idx, cell_width, cell_height, cols, padding);

        image::imageops::replace(&mut grid, img, x as i64, (y + LABEL_HEIGHT) as i64);
        font::draw_text_mut(
            &mut grid,
            x as i32 + LABEL_INSET,
            y as i32,
            &format!("Patch {}", idx),
            LABEL_COLOR,
            LABEL_SCALE,
        );
    }

    grid
}
