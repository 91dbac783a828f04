pub mod boxes;
pub mod font;
pub mod grid;

pub use boxes::draw_boxes;
pub use grid::patch_grid;
