//! Word-level encoders producing token ids aligned to words.

use std::path::Path;

use tokenizers::Tokenizer;

use crate::error::{Error, Result};

/// Token ids of a pre-split word sequence, special tokens included.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct WordEncoding {
    /// Token ids
    pub ids: Vec<u32>,
    /// Index of the source word of each token; `None` for special tokens
    pub word_ids: Vec<Option<usize>>,
}

impl WordEncoding {
    /// Number of tokens.
    pub fn len(&self) -> usize {
        self.ids.len()
    }

    /// Check if there are no tokens.
    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }
}

/// Encodes words into sub-word tokens.
pub trait WordEncoder: Send + Sync {
    /// Encode pre-split words, adding the model's special tokens.
    fn encode_words(&self, words: &[&str]) -> Result<WordEncoding>;

    /// Id used for padding.
    fn pad_id(&self) -> u32;
}

/// [`WordEncoder`] backed by a HuggingFace `tokenizer.json`.
pub struct HfWordEncoder {
    tokenizer: Tokenizer,
    pad_id: u32,
}

impl HfWordEncoder {
    /// Load a tokenizer file.
    ///
    /// Built-in truncation and padding are disabled; windows are sized by
    /// the [`Windower`](super::Windower).
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let tokenizer = Tokenizer::from_file(path.as_ref()).map_err(|e| {
            Error::Tokenizer(format!(
                "cannot load tokenizer {}: {}",
                path.as_ref().display(),
                e
            ))
        })?;
        Self::new(tokenizer)
    }

    /// Wrap an already constructed tokenizer.
    pub fn new(mut tokenizer: Tokenizer) -> Result<Self> {
        let pad_id = tokenizer
            .get_padding()
            .map(|p| p.pad_id)
            .or_else(|| tokenizer.token_to_id("<pad>"))
            .or_else(|| tokenizer.token_to_id("[PAD]"))
            .unwrap_or(0);

        tokenizer
            .with_truncation(None)
            .map_err(|e| Error::Tokenizer(format!("cannot disable truncation: {}", e)))?;
        tokenizer.with_padding(None);

        Ok(Self { tokenizer, pad_id })
    }
}

impl WordEncoder for HfWordEncoder {
    fn encode_words(&self, words: &[&str]) -> Result<WordEncoding> {
        let encoding = self
            .tokenizer
            .encode(words.to_vec(), true)
            .map_err(|e| Error::Tokenizer(format!("encoding failed: {}", e)))?;

        Ok(WordEncoding {
            ids: encoding.get_ids().to_vec(),
            word_ids: encoding
                .get_word_ids()
                .iter()
                .map(|w| w.map(|w| w as usize))
                .collect(),
        })
    }

    fn pad_id(&self) -> u32 {
        self.pad_id
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    /// WordPiece tokenizer with `[CLS] $A [SEP]` framing, built-in
    /// truncation to 3 tokens and fixed padding to 16.
    const TOKENIZER_JSON: &str = r###"{
        "version": "1.0",
        "truncation": {"direction": "Right", "max_length": 3, "strategy": "LongestFirst", "stride": 0},
        "padding": {
            "strategy": {"Fixed": 16},
            "direction": "Right",
            "pad_to_multiple_of": null,
            "pad_id": 7,
            "pad_type_id": 0,
            "pad_token": "[PAD]"
        },
        "added_tokens": [],
        "normalizer": null,
        "pre_tokenizer": {"type": "WhitespaceSplit"},
        "post_processor": {
            "type": "TemplateProcessing",
            "single": [
                {"SpecialToken": {"id": "[CLS]", "type_id": 0}},
                {"Sequence": {"id": "A", "type_id": 0}},
                {"SpecialToken": {"id": "[SEP]", "type_id": 0}}
            ],
            "pair": [
                {"SpecialToken": {"id": "[CLS]", "type_id": 0}},
                {"Sequence": {"id": "A", "type_id": 0}},
                {"SpecialToken": {"id": "[SEP]", "type_id": 0}},
                {"Sequence": {"id": "B", "type_id": 1}},
                {"SpecialToken": {"id": "[SEP]", "type_id": 1}}
            ],
            "special_tokens": {
                "[CLS]": {"id": "[CLS]", "ids": [1], "tokens": ["[CLS]"]},
                "[SEP]": {"id": "[SEP]", "ids": [2], "tokens": ["[SEP]"]}
            }
        },
        "decoder": null,
        "model": {
            "type": "WordPiece",
            "unk_token": "[UNK]",
            "continuing_subword_prefix": "##",
            "max_input_chars_per_word": 100,
            "vocab": {
                "[UNK]": 0, "[CLS]": 1, "[SEP]": 2, "python": 3,
                "kube": 4, "##rnetes": 5, "docker": 6, "[PAD]": 7
            }
        }
    }"###;

    fn encoder() -> HfWordEncoder {
        HfWordEncoder::new(Tokenizer::from_str(TOKENIZER_JSON).unwrap()).unwrap()
    }

    #[test]
    fn test_word_ids_align_with_sub_tokens() {
        let encoding = encoder()
            .encode_words(&["python", "kubernetes", "docker", "rust"])
            .unwrap();

        // Neither the built-in truncation nor the fixed padding applies.
        assert_eq!(encoding.ids, vec![1, 3, 4, 5, 6, 0, 2]);
        assert_eq!(
            encoding.word_ids,
            vec![None, Some(0), Some(1), Some(1), Some(2), Some(3), None]
        );
    }

    #[test]
    fn test_empty_input_has_only_special_tokens() {
        let encoding = encoder().encode_words(&[]).unwrap();
        assert_eq!(encoding.ids, vec![1, 2]);
        assert_eq!(encoding.word_ids, vec![None, None]);
    }

    #[test]
    fn test_pad_id_from_padding_params() {
        assert_eq!(encoder().pad_id(), 7);
    }

    #[test]
    fn test_missing_tokenizer_file() {
        let dir = tempfile::tempdir().unwrap();
        assert!(matches!(
            HfWordEncoder::from_file(dir.path().join("tokenizer.json")),
            Err(Error::Tokenizer(_))
        ));
    }
}
