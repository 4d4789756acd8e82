//! Output of tagged documents: JSON and visual overlays.

mod json;
mod visualize;

pub use json::{from_json, read_json_file, to_json, write_json_file, JsonFormat};
pub use visualize::{
    draw_outline, tag_color, visualize, visualize_image, visualize_pdf, write_visualization,
};
