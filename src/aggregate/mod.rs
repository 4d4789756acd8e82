//! Word and line tagging from model predictions and contact rules.

mod aggregator;
mod contact;

pub use aggregator::LabelAggregator;
pub use contact::{ContactDetector, ContactMatches, DEFAULT_SCAN_LINES};
