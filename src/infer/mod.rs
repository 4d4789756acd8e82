//! Token classification over windows.
//!
//! A [`TokenClassifier`] scores every window position against the label
//! vocabulary; the [`InferenceEngine`] runs it on a bounded thread pool and
//! reduces the scores to label ids.

mod classifier;
mod engine;

pub use classifier::{RtenClassifier, TokenClassifier, ATTENTION_MASK, BBOX, INPUT_IDS};
pub use engine::{argmax, InferenceEngine, WindowFailurePolicy, WindowPrediction};
