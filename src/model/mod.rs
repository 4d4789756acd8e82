//! Structured resume model.
//!
//! A [`Document`] holds pages of lines of words, each with a bounding box in
//! top-left page coordinates and an entity tag. Scoring profiles and results
//! live alongside it.

mod document;
mod line;
mod page;
mod score;
mod tag;

pub use document::Document;
pub use line::{BBox, Line, Word};
pub use page::Page;
pub use score::{
    DegradationReason, FieldDegradation, Identity, Score, ScoreFactor, ScoringField,
    SentenceMatch, TagFieldMap,
};
pub use tag::{LabelSet, NerTag};
