//! Parallel window inference.

use std::sync::Arc;

use rayon::prelude::*;
use rayon::{ThreadPool, ThreadPoolBuilder};
use serde::{Deserialize, Serialize};

use super::TokenClassifier;
use crate::error::{Error, Result};
use crate::tokenize::TokenWindow;

/// How a failing window affects the rest of the document.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WindowFailurePolicy {
    /// Fail the document with the first error in window order
    Abort,
    /// Log the error and tag the window's page `O`
    #[default]
    Isolate,
}

/// Outcome of one window.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WindowPrediction {
    /// Label id for every position of the window
    Labels(Vec<usize>),
    /// The window failed and was isolated
    Failed { message: String },
}

impl WindowPrediction {
    /// Label ids, if the window succeeded.
    pub fn labels(&self) -> Option<&[usize]> {
        match self {
            WindowPrediction::Labels(labels) => Some(labels),
            WindowPrediction::Failed { .. } => None,
        }
    }

    /// Check if the window failed.
    pub fn is_failed(&self) -> bool {
        matches!(self, WindowPrediction::Failed { .. })
    }
}

/// Index of the largest score; the first one wins ties.
pub fn argmax(scores: &[f32]) -> Option<usize> {
    let mut best: Option<(usize, f32)> = None;
    for (i, s) in scores.iter().enumerate() {
        match best {
            Some((_, b)) if *s <= b => {}
            _ => best = Some((i, *s)),
        }
    }
    best.map(|(i, _)| i)
}

/// Runs a classifier over windows on a dedicated thread pool.
pub struct InferenceEngine {
    classifier: Arc<dyn TokenClassifier>,
    pool: ThreadPool,
    policy: WindowFailurePolicy,
}

impl InferenceEngine {
    /// Create an engine with `workers` inference threads.
    pub fn new(
        classifier: Arc<dyn TokenClassifier>,
        workers: usize,
        policy: WindowFailurePolicy,
    ) -> Result<Self> {
        if workers == 0 {
            return Err(Error::Config(
                "inference_workers must be at least 1".to_string(),
            ));
        }
        let pool = ThreadPoolBuilder::new()
            .num_threads(workers)
            .thread_name(|i| format!("cvtag-infer-{}", i))
            .build()
            .map_err(|e| Error::Config(format!("cannot start inference pool: {}", e)))?;

        Ok(Self {
            classifier,
            pool,
            policy,
        })
    }

    /// Number of labels the classifier predicts.
    pub fn num_labels(&self) -> usize {
        self.classifier.num_labels()
    }

    /// Failure policy in effect.
    pub fn policy(&self) -> WindowFailurePolicy {
        self.policy
    }

    /// Predict labels for every window, in window order.
    pub fn predict(&self, windows: &[TokenWindow]) -> Result<Vec<WindowPrediction>> {
        let results: Vec<Result<Vec<usize>>> = self.pool.install(|| {
            windows
                .par_iter()
                .enumerate()
                .map(|(i, w)| self.predict_window(i, w))
                .collect()
        });

        let mut predictions = Vec::with_capacity(results.len());
        for result in results {
            match result {
                Ok(labels) => predictions.push(WindowPrediction::Labels(labels)),
                Err(e) => match self.policy {
                    WindowFailurePolicy::Abort => return Err(e),
                    WindowFailurePolicy::Isolate => {
                        log::warn!("{}; tagging the page O", e);
                        predictions.push(WindowPrediction::Failed {
                            message: e.to_string(),
                        });
                    }
                },
            }
        }
        Ok(predictions)
    }

    fn predict_window(&self, index: usize, window: &TokenWindow) -> Result<Vec<usize>> {
        let shape_error = |message: String| Error::Inference {
            window: index,
            message,
        };

        let logits = self.classifier.logits(window).map_err(|e| match e {
            Error::Inference { message, .. } => shape_error(message),
            other => shape_error(other.to_string()),
        })?;

        if logits.len() != window.len() {
            return Err(shape_error(format!(
                "expected {} rows of logits, got {}",
                window.len(),
                logits.len()
            )));
        }

        let num_labels = self.classifier.num_labels();
        logits
            .iter()
            .enumerate()
            .map(|(pos, row)| {
                if row.len() != num_labels {
                    return Err(shape_error(format!(
                        "position {} has {} scores, expected {}",
                        pos,
                        row.len(),
                        num_labels
                    )));
                }
                argmax(row).ok_or_else(|| shape_error("empty label vocabulary".to_string()))
            })
            .collect()
    }
}
