//! Maps window predictions back onto words and lines.

use super::ContactDetector;
use crate::error::{Error, Result};
use crate::infer::WindowPrediction;
use crate::model::{Document, LabelSet, NerTag};
use crate::tokenize::TokenWindow;

/// Writes word and line tags into a document.
#[derive(Debug, Clone)]
pub struct LabelAggregator {
    contacts: ContactDetector,
}

impl LabelAggregator {
    /// Create an aggregator with a contact detector.
    pub fn new(contacts: ContactDetector) -> Self {
        Self { contacts }
    }

    /// Tag every word and line of `doc`.
    ///
    /// `windows` and `predictions` are paired by index. Each word takes the
    /// label predicted at its first sub-token; words of pages without a
    /// successful window, words cut by truncation and words the encoder
    /// produced no tokens for are tagged `O`.
    pub fn apply(
        &self,
        doc: &mut Document,
        windows: &[TokenWindow],
        predictions: &[WindowPrediction],
        labels: &LabelSet,
    ) -> Result<()> {
        if windows.len() != predictions.len() {
            return Err(Error::Inference {
                window: windows.len().min(predictions.len()),
                message: format!(
                    "{} windows but {} predictions",
                    windows.len(),
                    predictions.len()
                ),
            });
        }

        let mut page_tags: Vec<Vec<NerTag>> = doc
            .pages
            .iter()
            .map(|page| vec![NerTag::O; page.word_count()])
            .collect();
        for (window, prediction) in windows.iter().zip(predictions) {
            let Some(ids) = prediction.labels() else {
                continue;
            };
            let Some(tags) = page_tags.get_mut(window.page_index) else {
                continue;
            };
            // Each word takes the label at its first sub-token.
            for (pos, word) in window.labeled_words() {
                if let (Some(slot), Some(id)) = (tags.get_mut(word), ids.get(pos)) {
                    *slot = labels.tag(*id);
                }
            }
        }

        let contacts = self.contacts.scan(doc);
        let mut overridden = 0usize;

        for (page, tags) in doc.pages.iter_mut().zip(page_tags) {
            let mut tags = tags.into_iter();
            for line in page.lines_mut() {
                for word in &mut line.words {
                    word.ner_tag = tags.next().unwrap_or(NerTag::O);
                    if let Some(tag) = contacts.tag_for(&word.text) {
                        if word.ner_tag != tag {
                            overridden += 1;
                        }
                        word.ner_tag = tag;
                    }
                }
                line.aggregate_tag();
            }
        }

        if overridden > 0 {
            log::debug!("Contact rules overrode {} word tags", overridden);
        }
        Ok(())
    }
}
