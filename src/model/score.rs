//! Scoring profiles and results.

use super::NerTag;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// A field that contributes to the resume score.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScoringField {
    Hardskill,
    Softskill,
    Education,
    Experience,
    Language,
    Project,
}

impl ScoringField {
    /// All scoring fields in output order.
    pub const ALL: [ScoringField; 6] = [
        ScoringField::Hardskill,
        ScoringField::Softskill,
        ScoringField::Education,
        ScoringField::Experience,
        ScoringField::Language,
        ScoringField::Project,
    ];

    /// Lowercase field name.
    pub fn as_str(&self) -> &'static str {
        match self {
            ScoringField::Hardskill => "hardskill",
            ScoringField::Softskill => "softskill",
            ScoringField::Education => "education",
            ScoringField::Experience => "experience",
            ScoringField::Language => "language",
            ScoringField::Project => "project",
        }
    }
}

impl fmt::Display for ScoringField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Immutable mapping from entity tags to scoring fields.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TagFieldMap {
    entries: Vec<(NerTag, ScoringField)>,
}

impl TagFieldMap {
    /// Build a mapping from explicit pairs.
    pub fn new(entries: Vec<(NerTag, ScoringField)>) -> Self {
        Self { entries }
    }

    /// Scoring field for a tag, if the tag is scored.
    pub fn field_for(&self, tag: &NerTag) -> Option<ScoringField> {
        self.entries
            .iter()
            .find(|(t, _)| t == tag)
            .map(|(_, f)| *f)
    }

    /// Iterate over the mapping.
    pub fn iter(&self) -> impl Iterator<Item = &(NerTag, ScoringField)> {
        self.entries.iter()
    }
}

impl Default for TagFieldMap {
    fn default() -> Self {
        Self::new(vec![
            (NerTag::Hardskill, ScoringField::Hardskill),
            (NerTag::Softskill, ScoringField::Softskill),
            (NerTag::Education, ScoringField::Education),
            (NerTag::Experience, ScoringField::Experience),
            (NerTag::Language, ScoringField::Language),
            (NerTag::Project, ScoringField::Project),
        ])
    }
}

/// Identity block shared by profiles and scores.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Identity {
    pub id: String,
    pub name: String,
    pub email: String,
    pub phone: String,
    pub location: String,
    pub job_title: String,
}

/// A requirement profile (job) or a resume profile.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScoreFactor {
    #[serde(flatten)]
    pub identity: Identity,
    pub hardskill: Vec<String>,
    pub softskill: Vec<String>,
    pub education: Vec<String>,
    pub experience: Vec<String>,
    pub language: Vec<String>,
    pub project: Vec<String>,
}

impl ScoreFactor {
    /// Create an empty profile with the given id.
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            identity: Identity {
                id: id.into(),
                ..Identity::default()
            },
            ..Self::default()
        }
    }

    /// Set the sentences of a field.
    pub fn with_field<I, S>(mut self, field: ScoringField, sentences: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        *self.field_mut(field) = sentences.into_iter().map(Into::into).collect();
        self
    }

    /// Set the job title.
    pub fn with_job_title(mut self, title: impl Into<String>) -> Self {
        self.identity.job_title = title.into();
        self
    }

    /// Sentences of a field.
    pub fn field(&self, field: ScoringField) -> &[String] {
        match field {
            ScoringField::Hardskill => &self.hardskill,
            ScoringField::Softskill => &self.softskill,
            ScoringField::Education => &self.education,
            ScoringField::Experience => &self.experience,
            ScoringField::Language => &self.language,
            ScoringField::Project => &self.project,
        }
    }

    /// Mutable sentences of a field.
    pub fn field_mut(&mut self, field: ScoringField) -> &mut Vec<String> {
        match field {
            ScoringField::Hardskill => &mut self.hardskill,
            ScoringField::Softskill => &mut self.softskill,
            ScoringField::Education => &mut self.education,
            ScoringField::Experience => &mut self.experience,
            ScoringField::Language => &mut self.language,
            ScoringField::Project => &mut self.project,
        }
    }

    /// All field sentences in field order.
    pub fn sentences(&self) -> impl Iterator<Item = &String> {
        ScoringField::ALL.iter().flat_map(move |f| self.field(*f).iter())
    }
}

/// Why a field was not scored.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DegradationReason {
    /// The requirement profile has no sentences for the field
    EmptyJobField,
    /// The resume has no sentences for the field
    EmptyResumeField,
    /// Neither side has sentences
    BothEmpty,
}

/// A field scored as zero because a side was empty.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldDegradation {
    pub field: ScoringField,
    pub reason: DegradationReason,
}

/// Best match of one resume sentence against the requirement sentences.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SentenceMatch {
    pub sentence: String,
    pub best: f64,
}

/// Field-wise similarity of a resume against a requirement profile.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Score {
    #[serde(flatten)]
    pub identity: Identity,
    pub hardskill: f64,
    pub softskill: f64,
    pub education: f64,
    pub experience: f64,
    pub language: f64,
    pub project: f64,
    pub total: f64,
    pub degraded: Vec<FieldDegradation>,
    pub evidence: BTreeMap<ScoringField, Vec<SentenceMatch>>,
}

impl Score {
    /// Create a zero score for the given identity.
    pub fn new(identity: Identity) -> Self {
        Self {
            identity,
            ..Self::default()
        }
    }

    /// Value of a field.
    pub fn field(&self, field: ScoringField) -> f64 {
        match field {
            ScoringField::Hardskill => self.hardskill,
            ScoringField::Softskill => self.softskill,
            ScoringField::Education => self.education,
            ScoringField::Experience => self.experience,
            ScoringField::Language => self.language,
            ScoringField::Project => self.project,
        }
    }

    /// Set a field and recompute the total.
    pub fn set_field(&mut self, field: ScoringField, value: f64) {
        match field {
            ScoringField::Hardskill => self.hardskill = value,
            ScoringField::Softskill => self.softskill = value,
            ScoringField::Education => self.education = value,
            ScoringField::Experience => self.experience = value,
            ScoringField::Language => self.language = value,
            ScoringField::Project => self.project = value,
        }
        self.total = ScoringField::ALL.iter().map(|f| self.field(*f)).sum();
    }

    /// Check if a field was degraded.
    pub fn is_degraded(&self, field: ScoringField) -> bool {
        self.degraded.iter().any(|d| d.field == field)
    }
}
