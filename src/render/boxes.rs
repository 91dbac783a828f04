use image::{Rgb, RgbImage};
use imageproc::drawing::draw_hollow_rect_mut;
use imageproc::rect::Rect;

use crate::models::Detection;
use crate::render::font;

pub const BOX_COLOR: Rgb<u8> = Rgb([0, 255, 0]);
pub const BOX_THICKNESS: i32 = 2;
/// Gap between the label baseline and the box's top edge
pub const LABEL_OFFSET: i32 = 10;
pub const LABEL_SCALE: u32 = 2;

/// Draw every box onto `img` in order, optionally with its confidence
/// ("0.87") just above the top-left corner. Later boxes paint over
/// earlier ones. Coordinates are truncated to whole pixels.
pub fn draw_boxes(img: &mut RgbImage, detections: &[Detection], with_scores: bool) {
    let (width, height) = img.dimensions();

    for det in detections {
        draw_box(img, det);

        if with_scores {
            let label = format!("{:.2}", det.confidence);
            let baseline = to_pixel(det.y1, height) - LABEL_OFFSET;
            let top = baseline - font::text_height(LABEL_SCALE) as i32;
            font::draw_text_mut(img, to_pixel(det.x1, width), top, &label, BOX_COLOR, LABEL_SCALE);
        }
    }
}

/// Truncate to a whole pixel, clamped to `[-side, 2 * side]`.
/// Anything past that is off-canvas either way and the clamp keeps the
/// edge arithmetic below well inside `i32`.
fn to_pixel(v: f32, side: u32) -> i32 {
    let limit = i64::from(side).min(i64::from(i32::MAX / 4));
    (v as i64).clamp(-limit, 2 * limit) as i32
}

fn draw_box(img: &mut RgbImage, det: &Detection) {
    let (width, height) = img.dimensions();
    let (x1, x2) = ordered(to_pixel(det.x1, width), to_pixel(det.x2, width));
    let (y1, y2) = ordered(to_pixel(det.y1, height), to_pixel(det.y2, height));

    for inset in 0..BOX_THICKNESS {
        let width = x2 - x1 + 1 - 2 * inset;
        let height = y2 - y1 + 1 - 2 * inset;
        if width <= 0 || height <= 0 {
            break;
        }
        let rect = Rect::at(x1 + inset, y1 + inset).of_size(width as u32, height as u32);
        draw_hollow_rect_mut(img, rect, BOX_COLOR);
    }
}

fn ordered(a: i32, b: i32) -> (i32, i32) {
    if a <= b { (a, b) } else { (b, a) }
}
