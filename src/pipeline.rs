//! End-to-end resume processing.
//!
//! A [`Pipeline`] owns every component needed to turn a resume file into a
//! tagged [`Document`]: the extractor registry, the windower, the inference
//! engine and the label aggregator. Components are built once and shared
//! across documents.
//!
//! # Example
//!
//! ```no_run
//! use cvtag::{Pipeline, PipelineConfig, ScoreFactor, ScoringField};
//!
//! fn main() -> cvtag::Result<()> {
//!     let config = PipelineConfig::from_yaml_file("cvtag.yaml")?;
//!     let pipeline = Pipeline::from_config(config)?;
//!
//!     let job = ScoreFactor::new("backend")
//!         .with_field(ScoringField::Hardskill, ["python", "kubernetes"]);
//!     let run = pipeline.score_from_directory("resumes/", &job)?;
//!     for score in run.ranked() {
//!         println!("{}: {:.3}", score.identity.id, score.total);
//!     }
//!     Ok(())
//! }
//! ```

use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::aggregate::{ContactDetector, LabelAggregator};
use crate::config::PipelineConfig;
use crate::error::{Error, Result};
use crate::extract::ExtractorRegistry;
use crate::infer::{InferenceEngine, RtenClassifier, TokenClassifier};
use crate::model::{Document, LabelSet, Score, ScoreFactor};
use crate::score::FieldScorer;
use crate::tokenize::{HfWordEncoder, Windower, WordEncoder};

/// Parts a pipeline is assembled from.
pub struct PipelineComponents {
    pub extractors: ExtractorRegistry,
    pub encoder: Arc<dyn WordEncoder>,
    pub classifier: Arc<dyn TokenClassifier>,
    pub labels: LabelSet,
    pub scorer: FieldScorer,
    pub config: PipelineConfig,
}

/// A file left out of a scoring run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SkippedFile {
    pub path: PathBuf,
    pub reason: String,
}

/// Result of scoring a directory of resumes.
#[derive(Debug, Clone, Default)]
pub struct ScoringRun {
    /// One score per parsed resume, in file order
    pub scores: Vec<Score>,
    /// Resume profiles, parallel to `scores`
    pub resumes: Vec<ScoreFactor>,
    /// Tagged documents, parallel to `scores`
    pub documents: Vec<Document>,
    /// Files that failed to parse
    pub skipped: Vec<SkippedFile>,
}

impl ScoringRun {
    /// Scores sorted by total, best first; equal totals keep file order.
    pub fn ranked(&self) -> Vec<&Score> {
        let mut ranked: Vec<&Score> = self.scores.iter().collect();
        ranked.sort_by(|a, b| b.total.total_cmp(&a.total));
        ranked
    }
}

/// Resume structuring and scoring pipeline.
pub struct Pipeline {
    extractors: ExtractorRegistry,
    windower: Windower,
    engine: InferenceEngine,
    aggregator: LabelAggregator,
    labels: LabelSet,
    scorer: FieldScorer,
    config: PipelineConfig,
}

impl Pipeline {
    /// Assemble a pipeline from prepared components.
    pub fn new(components: PipelineComponents) -> Result<Self> {
        let PipelineComponents {
            extractors,
            encoder,
            classifier,
            labels,
            scorer,
            config,
        } = components;
        config.validate()?;

        if classifier.num_labels() != labels.len() {
            return Err(Error::ModelLoad(format!(
                "classifier predicts {} labels but the vocabulary has {}",
                classifier.num_labels(),
                labels.len()
            )));
        }

        let windower = Windower::new(encoder, config.max_length)?;
        let engine =
            InferenceEngine::new(classifier, config.inference_workers, config.window_failure)?;
        let aggregator = LabelAggregator::new(ContactDetector::new(config.contact_scan_lines)?);

        log::info!(
            "Pipeline ready: {} labels, window {}, {} inference workers, extensions {:?}",
            labels.len(),
            config.max_length,
            config.inference_workers,
            extractors.supported_extensions()
        );

        Ok(Self {
            extractors,
            windower,
            engine,
            aggregator,
            labels,
            scorer,
            config,
        })
    }

    /// Load the model, tokenizer and labels named in the configuration.
    pub fn from_config(config: PipelineConfig) -> Result<Self> {
        config.validate()?;

        let labels = match &config.labels_path {
            Some(path) => LabelSet::from_yaml_file(path)?,
            None => LabelSet::default(),
        };
        let tokenizer_path = config
            .tokenizer_path
            .as_ref()
            .ok_or_else(|| Error::Config("tokenizer_path is not set".to_string()))?;
        let model_path = config
            .model_path
            .as_ref()
            .ok_or_else(|| Error::Config("model_path is not set".to_string()))?;

        let encoder: Arc<dyn WordEncoder> = Arc::new(HfWordEncoder::from_file(tokenizer_path)?);
        let classifier: Arc<dyn TokenClassifier> =
            Arc::new(RtenClassifier::from_file(model_path, labels.len())?);
        let extractors = ExtractorRegistry::from_config(&config)?;

        Self::new(PipelineComponents {
            extractors,
            encoder,
            classifier,
            labels,
            scorer: FieldScorer::default(),
            config,
        })
    }

    /// Configuration in use.
    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    /// Label vocabulary in use.
    pub fn labels(&self) -> &LabelSet {
        &self.labels
    }

    /// Check if a file has an extension the pipeline can read.
    pub fn supports_path(&self, path: &Path) -> bool {
        self.extractors.supports_path(path)
    }

    /// Extract and tag a resume.
    pub fn parse<P: AsRef<Path>>(&self, path: P) -> Result<Document> {
        let path = path.as_ref();
        let mut doc = self.extractors.extract(path)?;
        let windows = self.windower.window(&doc)?;
        let predictions = self.engine.predict(&windows)?;
        self.aggregator
            .apply(&mut doc, &windows, &predictions, &self.labels)?;

        let failed = predictions.iter().filter(|p| p.is_failed()).count();
        if failed > 0 {
            log::warn!(
                "{}: {} of {} pages tagged O after inference failures",
                path.display(),
                failed,
                predictions.len()
            );
        }
        log::info!(
            "Parsed {}: {} pages, {} lines, {} words",
            path.display(),
            doc.page_count(),
            doc.line_count(),
            doc.word_count()
        );
        Ok(doc)
    }

    /// Parse every supported file in `dir` and score it against `job`.
    ///
    /// Files are visited in sorted path order. Files with unsupported
    /// extensions are ignored; files that fail with a document-local error
    /// are logged and recorded in [`ScoringRun::skipped`].
    pub fn score_from_directory<P: AsRef<Path>>(
        &self,
        dir: P,
        job: &ScoreFactor,
    ) -> Result<ScoringRun> {
        let dir = dir.as_ref();
        let mut paths: Vec<PathBuf> = std::fs::read_dir(dir)?
            .filter_map(|entry| entry.ok().map(|e| e.path()))
            .filter(|p| p.is_file() && self.supports_path(p))
            .collect();
        paths.sort();

        let mut run = ScoringRun::default();
        for path in paths {
            match self.parse(&path) {
                Ok(doc) => run.documents.push(doc),
                Err(e) if e.is_document_local() => {
                    log::warn!("Skipping {}: {}", path.display(), e);
                    run.skipped.push(SkippedFile {
                        path,
                        reason: e.to_string(),
                    });
                }
                Err(e) => return Err(e),
            }
        }

        let (fitted, profiles) = self.scorer.fit(&run.documents, job);
        run.scores = fitted.compare(&profiles, job);
        run.resumes = profiles;

        log::info!(
            "Scored {} resumes from {} ({} skipped)",
            run.scores.len(),
            dir.display(),
            run.skipped.len()
        );
        Ok(run)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Identity;

    fn score(id: &str, total: f64) -> Score {
        let mut s = Score::new(Identity {
            id: id.to_string(),
            ..Identity::default()
        });
        s.total = total;
        s
    }

    #[test]
    fn test_ranked_order() {
        let run = ScoringRun {
            scores: vec![score("a", 0.5), score("b", 2.0), score("c", 0.5)],
            ..ScoringRun::default()
        };
        let ids: Vec<&str> = run.ranked().iter().map(|s| s.identity.id.as_str()).collect();
        assert_eq!(ids, vec!["b", "a", "c"]);
    }
}
