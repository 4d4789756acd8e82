//! Token windows for the token-classification model.
//!
//! Each page's words are encoded into sub-word tokens, aligned back to their
//! source words, and laid out in a fixed-length [`TokenWindow`] with
//! normalized boxes and a label mask marking the first sub-token of each
//! word.

mod encoder;
mod window;

pub use encoder::{HfWordEncoder, WordEncoder, WordEncoding};
pub use window::{normalize_bbox, TokenWindow, Windower, BBOX_SCALE, IGNORE_INDEX};
