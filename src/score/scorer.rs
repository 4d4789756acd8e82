//! Field-wise similarity of tagged resumes against a requirement profile.

use super::vectorizer::{cosine, SparseVector, TfidfVectorizer};
use crate::model::{
    DegradationReason, Document, FieldDegradation, NerTag, Score, ScoreFactor, ScoringField,
    SentenceMatch, TagFieldMap,
};

/// Builds resume profiles and fits the shared vectorizer.
#[derive(Debug, Clone, Default)]
pub struct FieldScorer {
    fields: TagFieldMap,
}

impl FieldScorer {
    /// Create a scorer with a tag-to-field mapping.
    pub fn new(fields: TagFieldMap) -> Self {
        Self { fields }
    }

    /// Tag-to-field mapping in use.
    pub fn fields(&self) -> &TagFieldMap {
        &self.fields
    }

    /// Build the profile of a tagged resume.
    ///
    /// On each line, words carrying a scored tag are joined per tag and the
    /// result is appended to that tag's field. Identity fields collect the
    /// words tagged as name, email, phone and address.
    pub fn profile(&self, doc: &Document) -> ScoreFactor {
        let mut factor = ScoreFactor::new(doc.source_path.to_string_lossy());
        let mut name = Vec::new();
        let mut email = Vec::new();
        let mut phone = Vec::new();
        let mut location = Vec::new();

        for page in &doc.pages {
            for line in page.lines() {
                let mut per_tag: Vec<(ScoringField, Vec<&str>)> = Vec::new();
                for word in &line.words {
                    match word.ner_tag {
                        NerTag::Name => name.push(word.text.as_str()),
                        NerTag::Email => email.push(word.text.as_str()),
                        NerTag::Phone => phone.push(word.text.as_str()),
                        NerTag::Address => location.push(word.text.as_str()),
                        _ => {}
                    }
                    if let Some(field) = self.fields.field_for(&word.ner_tag) {
                        match per_tag.iter_mut().find(|(f, _)| *f == field) {
                            Some((_, words)) => words.push(word.text.as_str()),
                            None => per_tag.push((field, vec![word.text.as_str()])),
                        }
                    }
                }
                for (field, words) in per_tag {
                    factor.field_mut(field).push(words.join(" "));
                }
            }
        }

        factor.identity.name = name.join(" ");
        factor.identity.email = email.join(" ");
        factor.identity.phone = phone.join(" ");
        factor.identity.location = location.join(" ");
        factor
    }

    /// Build the resume profiles and fit one vectorizer over every field
    /// sentence of the resumes and the requirement profile.
    pub fn fit(&self, resumes: &[Document], job: &ScoreFactor) -> (FittedScorer, Vec<ScoreFactor>) {
        let profiles: Vec<ScoreFactor> = resumes.iter().map(|doc| self.profile(doc)).collect();
        let corpus = profiles
            .iter()
            .flat_map(ScoreFactor::sentences)
            .chain(job.sentences());
        let vectorizer = TfidfVectorizer::fit(corpus);
        (FittedScorer { vectorizer }, profiles)
    }

    /// Fit and compare in one step.
    pub fn score(&self, resumes: &[Document], job: &ScoreFactor) -> Vec<Score> {
        let (fitted, profiles) = self.fit(resumes, job);
        fitted.compare(&profiles, job)
    }
}

/// A scorer whose vocabulary is fixed; safe to share across threads.
#[derive(Debug, Clone)]
pub struct FittedScorer {
    vectorizer: TfidfVectorizer,
}

impl FittedScorer {
    /// Create from an already fitted vectorizer.
    pub fn new(vectorizer: TfidfVectorizer) -> Self {
        Self { vectorizer }
    }

    /// The fitted vectorizer.
    pub fn vectorizer(&self) -> &TfidfVectorizer {
        &self.vectorizer
    }

    /// Score every profile against the requirement profile.
    pub fn compare(&self, profiles: &[ScoreFactor], job: &ScoreFactor) -> Vec<Score> {
        profiles.iter().map(|p| self.compare_one(p, job)).collect()
    }

    /// Score a single profile.
    ///
    /// A field with no sentences on either side scores exactly zero and is
    /// recorded as degraded. Otherwise each resume sentence takes its best
    /// cosine similarity against the requirement sentences and the field
    /// score is the sum of those.
    pub fn compare_one(&self, profile: &ScoreFactor, job: &ScoreFactor) -> Score {
        let mut score = Score::new(profile.identity.clone());

        for field in ScoringField::ALL {
            let resume_sentences = profile.field(field);
            let job_sentences = job.field(field);

            let reason = match (resume_sentences.is_empty(), job_sentences.is_empty()) {
                (true, true) => Some(DegradationReason::BothEmpty),
                (false, true) => Some(DegradationReason::EmptyJobField),
                (true, false) => Some(DegradationReason::EmptyResumeField),
                (false, false) => None,
            };
            if let Some(reason) = reason {
                score.set_field(field, 0.0);
                score.degraded.push(FieldDegradation { field, reason });
                continue;
            }

            let job_vectors: Vec<SparseVector> = job_sentences
                .iter()
                .map(|s| self.vectorizer.transform(s))
                .collect();

            let matches: Vec<SentenceMatch> = resume_sentences
                .iter()
                .map(|sentence| {
                    let v = self.vectorizer.transform(sentence);
                    let best = job_vectors
                        .iter()
                        .map(|j| cosine(&v, j))
                        .fold(0.0f64, f64::max);
                    SentenceMatch {
                        sentence: sentence.clone(),
                        best,
                    }
                })
                .collect();

            score.set_field(field, matches.iter().map(|m| m.best).sum());
            score.evidence.insert(field, matches);
        }

        score
    }
}
