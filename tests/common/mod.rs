//! Shared fixtures: generated PDFs and fake model components.

#![allow(dead_code)]

use std::path::Path;
use std::sync::Arc;

use cvtag::error::Result;
use cvtag::extract::ExtractorRegistry;
use cvtag::infer::TokenClassifier;
use cvtag::tokenize::{TokenWindow, WordEncoder, WordEncoding};
use cvtag::{FieldScorer, LabelSet, NerTag, Pipeline, PipelineComponents, PipelineConfig};
use lopdf::content::{Content, Operation};
use lopdf::{dictionary, Object, Stream};

pub const CLS: u32 = 101;
pub const SEP: u32 = 102;
pub const PAD: u32 = 0;
pub const SKILL_TOKEN: u32 = 10;
pub const OTHER_TOKEN: u32 = 11;

/// Write a one-page PDF showing each `(text, x, y)` line in 12pt Courier.
pub fn write_pdf(path: &Path, lines: &[(&str, f32, f32)]) {
    let mut doc = lopdf::Document::with_version("1.5");
    let pages_id = doc.new_object_id();
    let font_id = doc.add_object(dictionary! {
        "Type" => "Font",
        "Subtype" => "Type1",
        "BaseFont" => "Courier",
    });
    let resources_id = doc.add_object(dictionary! {
        "Font" => dictionary! {
            "F1" => Object::Reference(font_id),
        },
    });

    let mut operations = Vec::new();
    for (text, x, y) in lines {
        operations.push(Operation::new("BT", vec![]));
        operations.push(Operation::new("Tf", vec!["F1".into(), Object::Integer(12)]));
        operations.push(Operation::new("Td", vec![Object::Real(*x), Object::Real(*y)]));
        operations.push(Operation::new("Tj", vec![Object::string_literal(*text)]));
        operations.push(Operation::new("ET", vec![]));
    }
    let content = Content { operations }.encode().unwrap();
    let content_id = doc.add_object(Stream::new(dictionary! {}, content));

    let page_id = doc.add_object(dictionary! {
        "Type" => "Page",
        "Parent" => Object::Reference(pages_id),
        "Contents" => Object::Reference(content_id),
        "Resources" => Object::Reference(resources_id),
        "MediaBox" => Object::Array(vec![
            Object::Integer(0),
            Object::Integer(0),
            Object::Integer(595),
            Object::Integer(842),
        ]),
    });
    doc.objects.insert(
        pages_id,
        Object::Dictionary(dictionary! {
            "Type" => "Pages",
            "Kids" => Object::Array(vec![Object::Reference(page_id)]),
            "Count" => Object::Integer(1),
        }),
    );
    let catalog_id = doc.add_object(dictionary! {
        "Type" => "Catalog",
        "Pages" => Object::Reference(pages_id),
    });
    doc.trailer.set("Root", Object::Reference(catalog_id));
    doc.save(path).unwrap();
}

/// The resume used across integration tests.
pub fn write_resume(path: &Path) {
    write_pdf(
        path,
        &[
            ("Jane Doe", 72.0, 760.0),
            ("jane.doe@mail.com", 72.0, 740.0),
            ("python", 72.0, 700.0),
            ("docker", 72.0, 680.0),
            ("Experience at Acme", 72.0, 640.0),
        ],
    );
}

/// One token per word: skill keywords get `SKILL_TOKEN`, everything else
/// `OTHER_TOKEN`.
pub struct KeywordEncoder;

impl WordEncoder for KeywordEncoder {
    fn encode_words(&self, words: &[&str]) -> Result<WordEncoding> {
        let mut encoding = WordEncoding {
            ids: vec![CLS],
            word_ids: vec![None],
        };
        for (i, word) in words.iter().enumerate() {
            let lower = word.to_lowercase();
            let id = if lower == "python" || lower == "docker" {
                SKILL_TOKEN
            } else {
                OTHER_TOKEN
            };
            encoding.ids.push(id);
            encoding.word_ids.push(Some(i));
        }
        encoding.ids.push(SEP);
        encoding.word_ids.push(None);
        Ok(encoding)
    }

    fn pad_id(&self) -> u32 {
        PAD
    }
}

/// Predicts `Hardskill` for skill tokens and `O` elsewhere.
pub struct KeywordClassifier {
    labels: LabelSet,
}

impl KeywordClassifier {
    pub fn new(labels: LabelSet) -> Self {
        Self { labels }
    }
}

impl TokenClassifier for KeywordClassifier {
    fn num_labels(&self) -> usize {
        self.labels.len()
    }

    fn logits(&self, window: &TokenWindow) -> Result<Vec<Vec<f32>>> {
        let skill = self.labels.id_of(&NerTag::Hardskill).unwrap_or(0);
        let outside = self.labels.id_of(&NerTag::O).unwrap_or(0);
        Ok(window
            .input_ids
            .iter()
            .map(|id| {
                let mut row = vec![0.0; self.labels.len()];
                if *id == i64::from(SKILL_TOKEN) {
                    row[skill] = 5.0;
                } else {
                    row[outside] = 5.0;
                }
                row
            })
            .collect())
    }
}

/// A pipeline over the fake encoder and classifier.
pub fn keyword_pipeline(config: PipelineConfig) -> Result<Pipeline> {
    let labels = LabelSet::default();
    pipeline_with_classifier(config, Arc::new(KeywordClassifier::new(labels.clone())))
}

/// A pipeline over the fake encoder and the given classifier.
pub fn pipeline_with_classifier(
    config: PipelineConfig,
    classifier: Arc<dyn TokenClassifier>,
) -> Result<Pipeline> {
    pipeline_with(config, Arc::new(KeywordEncoder), classifier)
}

/// A pipeline over the given encoder and classifier.
pub fn pipeline_with(
    config: PipelineConfig,
    encoder: Arc<dyn WordEncoder>,
    classifier: Arc<dyn TokenClassifier>,
) -> Result<Pipeline> {
    Pipeline::new(PipelineComponents {
        extractors: ExtractorRegistry::default(),
        encoder,
        classifier,
        labels: LabelSet::default(),
        scorer: FieldScorer::default(),
        config,
    })
}
