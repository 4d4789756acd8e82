//! End-to-end tests: extraction, windowing, inference, tagging and scoring.

mod common;

use std::sync::Arc;

use common::{
    keyword_pipeline, pipeline_with, pipeline_with_classifier, write_resume, KeywordClassifier,
    KeywordEncoder,
};
use cvtag::error::{Error, Result};
use cvtag::infer::TokenClassifier;
use cvtag::tokenize::{TokenWindow, WordEncoder, WordEncoding};
use cvtag::{
    DegradationReason, FieldDegradation, NerTag, PipelineConfig, ScoreFactor, ScoringField,
    WindowFailurePolicy,
};
use tempfile::TempDir;

fn line_tag(doc: &cvtag::Document, text: &str) -> NerTag {
    doc.pages[0]
        .lines()
        .iter()
        .find(|l| l.text == text)
        .map(|l| l.ner_tag.clone())
        .unwrap_or_else(|| panic!("no line {:?}", text))
}

#[test]
fn test_parse_tags_lines() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("jane.pdf");
    write_resume(&path);

    let pipeline = keyword_pipeline(PipelineConfig::new().with_inference_workers(2)).unwrap();
    let doc = pipeline.parse(&path).unwrap();

    assert_eq!(doc.page_count(), 1);
    assert_eq!(doc.pages[0].line_count(), 5);
    assert_eq!(line_tag(&doc, "python"), NerTag::Hardskill);
    assert_eq!(line_tag(&doc, "docker"), NerTag::Hardskill);
    assert_eq!(line_tag(&doc, "Jane Doe"), NerTag::O);
    // The model says O; the contact rule wins.
    assert_eq!(line_tag(&doc, "jane.doe@mail.com"), NerTag::Email);
}

/// Produces no tokens for one word, like a normalizer stripping icon glyphs.
struct DropWordEncoder {
    dropped: &'static str,
}

impl WordEncoder for DropWordEncoder {
    fn encode_words(&self, words: &[&str]) -> Result<WordEncoding> {
        let full = KeywordEncoder.encode_words(words)?;
        let mut encoding = WordEncoding {
            ids: Vec::new(),
            word_ids: Vec::new(),
        };
        for (id, word) in full.ids.into_iter().zip(full.word_ids) {
            if word.map_or(false, |w| words[w] == self.dropped) {
                continue;
            }
            encoding.ids.push(id);
            encoding.word_ids.push(word);
        }
        Ok(encoding)
    }

    fn pad_id(&self) -> u32 {
        KeywordEncoder.pad_id()
    }
}

#[test]
fn test_word_without_tokens_does_not_shift_labels() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("jane.pdf");
    write_resume(&path);

    let pipeline = pipeline_with(
        PipelineConfig::new(),
        Arc::new(DropWordEncoder { dropped: "Doe" }),
        Arc::new(KeywordClassifier::new(cvtag::LabelSet::default())),
    )
    .unwrap();
    let doc = pipeline.parse(&path).unwrap();

    let tag_of = |text: &str| {
        doc.iter_words()
            .find(|w| w.text == text)
            .map(|w| w.ner_tag.clone())
            .unwrap_or_else(|| panic!("no word {:?}", text))
    };
    assert_eq!(tag_of("Doe"), NerTag::O);
    assert_eq!(tag_of("python"), NerTag::Hardskill);
    assert_eq!(tag_of("docker"), NerTag::Hardskill);
    assert_eq!(tag_of("Experience"), NerTag::O);
    assert_eq!(line_tag(&doc, "docker"), NerTag::Hardskill);
}

#[test]
fn test_parse_is_idempotent() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("jane.pdf");
    write_resume(&path);

    let pipeline = keyword_pipeline(PipelineConfig::new()).unwrap();
    assert_eq!(pipeline.parse(&path).unwrap(), pipeline.parse(&path).unwrap());
}

#[test]
fn test_truncated_tail_is_outside() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("jane.pdf");
    write_resume(&path);

    // [CLS] + 3 words + [SEP]: "python" and later words lose their labels.
    let pipeline = keyword_pipeline(PipelineConfig::new().with_max_length(5)).unwrap();
    let doc = pipeline.parse(&path).unwrap();

    assert_eq!(line_tag(&doc, "python"), NerTag::O);
    assert_eq!(line_tag(&doc, "docker"), NerTag::O);
    assert_eq!(line_tag(&doc, "jane.doe@mail.com"), NerTag::Email);
}

#[test]
fn test_score_from_directory() {
    let dir = TempDir::new().unwrap();
    write_resume(&dir.path().join("b_jane.pdf"));
    std::fs::write(dir.path().join("a_broken.pdf"), b"not a pdf").unwrap();
    std::fs::write(dir.path().join("notes.txt"), b"ignored").unwrap();

    let pipeline = keyword_pipeline(PipelineConfig::new()).unwrap();
    let job = ScoreFactor::new("backend")
        .with_field(ScoringField::Hardskill, ["python", "kubernetes"]);
    let run = pipeline.score_from_directory(dir.path(), &job).unwrap();

    assert_eq!(run.skipped.len(), 1);
    assert!(run.skipped[0].path.ends_with("a_broken.pdf"));
    assert_eq!(run.scores.len(), 1);
    assert_eq!(run.documents.len(), 1);

    let score = &run.scores[0];
    assert!((score.hardskill - 1.0).abs() < 1e-9);
    assert!((score.total - 1.0).abs() < 1e-9);
    assert_eq!(score.identity.email, "jane.doe@mail.com");
    assert!(score.degraded.contains(&FieldDegradation {
        field: ScoringField::Education,
        reason: DegradationReason::BothEmpty,
    }));
    assert_eq!(run.resumes[0].hardskill, vec!["python", "docker"]);
    assert_eq!(run.ranked()[0].total, score.total);
}

#[test]
fn test_scoring_is_deterministic() {
    let dir = TempDir::new().unwrap();
    write_resume(&dir.path().join("one.pdf"));
    write_resume(&dir.path().join("two.pdf"));

    let pipeline = keyword_pipeline(PipelineConfig::new()).unwrap();
    let job = ScoreFactor::new("backend")
        .with_field(ScoringField::Hardskill, ["python developer", "docker"]);

    let first = pipeline.score_from_directory(dir.path(), &job).unwrap();
    let second = pipeline.score_from_directory(dir.path(), &job).unwrap();
    let totals = |run: &cvtag::ScoringRun| -> Vec<u64> {
        run.scores.iter().map(|s| s.total.to_bits()).collect()
    };
    assert_eq!(totals(&first), totals(&second));
}

/// Fails on every window.
struct BrokenClassifier;

impl TokenClassifier for BrokenClassifier {
    fn num_labels(&self) -> usize {
        cvtag::LabelSet::default().len()
    }

    fn logits(&self, window: &TokenWindow) -> Result<Vec<Vec<f32>>> {
        Err(Error::Inference {
            window: window.page_index,
            message: "device lost".to_string(),
        })
    }
}

#[test]
fn test_window_failure_isolated() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("jane.pdf");
    write_resume(&path);

    let pipeline =
        pipeline_with_classifier(PipelineConfig::new(), Arc::new(BrokenClassifier)).unwrap();
    let doc = pipeline.parse(&path).unwrap();

    assert_eq!(line_tag(&doc, "python"), NerTag::O);
    assert_eq!(line_tag(&doc, "jane.doe@mail.com"), NerTag::Email);
}

#[test]
fn test_window_failure_aborts() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("jane.pdf");
    write_resume(&path);

    let config = PipelineConfig::new().with_window_failure(WindowFailurePolicy::Abort);
    let pipeline = pipeline_with_classifier(config, Arc::new(BrokenClassifier)).unwrap();
    assert!(matches!(
        pipeline.parse(&path),
        Err(Error::Inference { window: 0, .. })
    ));
}

#[test]
fn test_label_count_mismatch() {
    struct TwoLabels;
    impl TokenClassifier for TwoLabels {
        fn num_labels(&self) -> usize {
            2
        }
        fn logits(&self, _window: &TokenWindow) -> Result<Vec<Vec<f32>>> {
            Ok(Vec::new())
        }
    }

    assert!(matches!(
        pipeline_with_classifier(PipelineConfig::new(), Arc::new(TwoLabels)),
        Err(Error::ModelLoad(_))
    ));
}

#[test]
fn test_from_config_requires_model() {
    assert!(matches!(
        cvtag::Pipeline::from_config(PipelineConfig::new()),
        Err(Error::Config(_))
    ));
}
