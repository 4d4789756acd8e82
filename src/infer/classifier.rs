//! Token-classification backends.

use std::path::Path;

use rten::{Model, NodeId};
use rten_tensor::prelude::*;
use rten_tensor::{NdTensor, Tensor};

use crate::error::{Error, Result};
use crate::tokenize::TokenWindow;

/// Model input names, in the order the windows provide them.
pub const INPUT_IDS: &str = "input_ids";
pub const BBOX: &str = "bbox";
pub const ATTENTION_MASK: &str = "attention_mask";

/// Produces per-position label scores for a window.
pub trait TokenClassifier: Send + Sync {
    /// Size of the label vocabulary the scores range over.
    fn num_labels(&self) -> usize;

    /// Scores of shape `window.len() × num_labels()`.
    fn logits(&self, window: &TokenWindow) -> Result<Vec<Vec<f32>>>;
}

/// Frozen token-classification model run with rten.
///
/// The model takes `input_ids`, `bbox` and `attention_mask` and its first
/// output holds the logits, `[1, sequence, labels]`.
pub struct RtenClassifier {
    model: Model,
    input_ids: NodeId,
    bbox: NodeId,
    attention_mask: NodeId,
    output: NodeId,
    num_labels: usize,
}

impl RtenClassifier {
    /// Load and validate a `.rten` model for a vocabulary of `num_labels`.
    pub fn from_file<P: AsRef<Path>>(path: P, num_labels: usize) -> Result<Self> {
        let path = path.as_ref();
        let model = Model::load_file(path).map_err(|e| {
            Error::ModelLoad(format!("failed to load model {}: {}", path.display(), e))
        })?;
        Self::new(model, num_labels)
    }

    /// Validate an already loaded model.
    pub fn new(model: Model, num_labels: usize) -> Result<Self> {
        let input = |name: &str| {
            model
                .find_node(name)
                .filter(|id| model.input_ids().contains(id))
                .ok_or_else(|| Error::ModelLoad(format!("model has no `{}` input", name)))
        };
        let input_ids = input(INPUT_IDS)?;
        let bbox = input(BBOX)?;
        let attention_mask = input(ATTENTION_MASK)?;

        let output = *model
            .output_ids()
            .first()
            .ok_or_else(|| Error::ModelLoad("model has no outputs".to_string()))?;

        // The label dimension can only be checked when it is static.
        let static_labels = model
            .node_info(output)
            .and_then(|info| info.shape())
            .and_then(|shape| match shape.last() {
                Some(rten::Dimension::Fixed(n)) => Some(*n),
                _ => None,
            });
        if let Some(n) = static_labels {
            if n != num_labels {
                return Err(Error::ModelLoad(format!(
                    "model predicts {} labels but the vocabulary has {}",
                    n, num_labels
                )));
            }
        }

        log::debug!(
            "Token classifier loaded ({} labels, static shape: {})",
            num_labels,
            static_labels.is_some()
        );

        Ok(Self {
            model,
            input_ids,
            bbox,
            attention_mask,
            output,
            num_labels,
        })
    }
}

impl TokenClassifier for RtenClassifier {
    fn num_labels(&self) -> usize {
        self.num_labels
    }

    fn logits(&self, window: &TokenWindow) -> Result<Vec<Vec<f32>>> {
        let len = window.len();
        let as_i32 = |v: &[i64]| v.iter().map(|x| *x as i32).collect::<Vec<_>>();

        let input_ids = NdTensor::from_data([1, len], as_i32(&window.input_ids));
        let attention_mask = NdTensor::from_data([1, len], as_i32(&window.attention_mask));
        let flat_boxes: Vec<i32> = window
            .bbox
            .iter()
            .flat_map(|b| b.iter().map(|x| *x as i32))
            .collect();
        let bbox = NdTensor::from_data([1, len, 4], flat_boxes);

        let inference_error = |message: String| Error::Inference {
            window: window.page_index,
            message,
        };

        let mut outputs = self
            .model
            .run(
                vec![
                    (self.input_ids, input_ids.into()),
                    (self.bbox, bbox.into()),
                    (self.attention_mask, attention_mask.into()),
                ],
                &[self.output],
                None,
            )
            .map_err(|e| inference_error(e.to_string()))?;

        let logits: Tensor<f32> = outputs
            .pop()
            .and_then(|v| v.into_tensor::<f32>())
            .ok_or_else(|| inference_error("model output is not a float tensor".to_string()))?;

        let shape = logits.shape().to_vec();
        let (rows, cols) = match shape.as_slice() {
            [1, rows, cols] | [rows, cols] => (*rows, *cols),
            other => {
                return Err(inference_error(format!(
                    "unexpected logits shape {:?}",
                    other
                )))
            }
        };

        let data = logits.to_vec();
        Ok(data.chunks(cols.max(1)).take(rows).map(<[f32]>::to_vec).collect())
    }
}
