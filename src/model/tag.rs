//! Entity tags and the label vocabulary.

use std::collections::BTreeMap;
use std::fmt;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// An entity tag assigned to a word or line.
///
/// Serialized as its label string (`"B-Hardskill"`, `"O"`).
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum NerTag {
    Address,
    Certificate,
    Education,
    Email,
    Experience,
    Gpa,
    Hardskill,
    Honor,
    Language,
    Link,
    Name,
    Phone,
    Project,
    Publication,
    Softskill,
    /// Any other label, kept verbatim (`B-Award`, `I-Email`)
    Custom(String),
    /// Outside any entity
    #[default]
    O,
}

impl NerTag {
    /// Built-in entity names, in default vocabulary order.
    const BUILTIN: [NerTag; 15] = [
        NerTag::Address,
        NerTag::Certificate,
        NerTag::Education,
        NerTag::Email,
        NerTag::Experience,
        NerTag::Gpa,
        NerTag::Hardskill,
        NerTag::Honor,
        NerTag::Language,
        NerTag::Link,
        NerTag::Name,
        NerTag::Phone,
        NerTag::Project,
        NerTag::Publication,
        NerTag::Softskill,
    ];

    /// Parse an entity name without the `B-` prefix (case-insensitive).
    pub fn from_entity(name: &str) -> Self {
        let name = name.trim();
        Self::BUILTIN
            .iter()
            .find(|t| t.entity().eq_ignore_ascii_case(name))
            .cloned()
            .unwrap_or_else(|| NerTag::Custom(format!("B-{}", name)))
    }

    /// Parse a label string such as `B-Email` or `O`.
    ///
    /// Labels that are not `B-<entity>` (for example `I-Email` or a bare
    /// `Email`) are kept verbatim as [`NerTag::Custom`], so
    /// `parse(tag.label())` always returns the same tag.
    pub fn parse(label: &str) -> Self {
        let label = label.trim();
        if label.is_empty() || label == "O" {
            return NerTag::O;
        }
        match label.strip_prefix("B-") {
            Some(name) => Self::from_entity(name),
            None => NerTag::Custom(label.to_string()),
        }
    }

    /// Entity name without prefix (`"Hardskill"`), `"O"` for outside.
    pub fn entity(&self) -> &str {
        match self {
            NerTag::Address => "Address",
            NerTag::Certificate => "Certificate",
            NerTag::Education => "Education",
            NerTag::Email => "Email",
            NerTag::Experience => "Experience",
            NerTag::Gpa => "GPA",
            NerTag::Hardskill => "Hardskill",
            NerTag::Honor => "Honor",
            NerTag::Language => "Language",
            NerTag::Link => "Link",
            NerTag::Name => "Name",
            NerTag::Phone => "Phone",
            NerTag::Project => "Project",
            NerTag::Publication => "Publication",
            NerTag::Softskill => "Softskill",
            NerTag::Custom(label) => label.strip_prefix("B-").unwrap_or(label),
            NerTag::O => "O",
        }
    }

    /// Full label string.
    pub fn label(&self) -> String {
        match self {
            NerTag::O => "O".to_string(),
            NerTag::Custom(label) => label.clone(),
            other => format!("B-{}", other.entity()),
        }
    }

    /// Check if this is the outside tag.
    pub fn is_outside(&self) -> bool {
        matches!(self, NerTag::O)
    }
}

impl fmt::Display for NerTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.label())
    }
}

impl From<String> for NerTag {
    fn from(s: String) -> Self {
        NerTag::parse(&s)
    }
}

impl From<&str> for NerTag {
    fn from(s: &str) -> Self {
        NerTag::parse(s)
    }
}

impl From<NerTag> for String {
    fn from(tag: NerTag) -> Self {
        tag.label()
    }
}

/// Ordered label vocabulary mapping model output ids to tags.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LabelSet {
    labels: Vec<NerTag>,
}

/// YAML class file: `names` is either an index map or a list.
#[derive(Debug, Deserialize)]
struct ClassFile {
    names: ClassNames,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum ClassNames {
    Indexed(BTreeMap<usize, String>),
    Listed(Vec<String>),
}

impl LabelSet {
    /// Create a vocabulary from explicit tags.
    pub fn new(labels: Vec<NerTag>) -> Result<Self> {
        if labels.is_empty() {
            return Err(Error::ModelLoad("label vocabulary is empty".to_string()));
        }
        Ok(Self { labels })
    }

    /// Build a vocabulary from entity names: `B-<name>` for each, then `O`.
    pub fn from_entities<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut labels: Vec<NerTag> = names
            .into_iter()
            .map(|n| NerTag::from_entity(n.as_ref()))
            .collect();
        labels.push(NerTag::O);
        Self { labels }
    }

    /// Parse a YAML class file.
    pub fn from_yaml_str(yaml: &str) -> Result<Self> {
        let file: ClassFile = serde_yaml::from_str(yaml)
            .map_err(|e| Error::ModelLoad(format!("invalid class file: {}", e)))?;
        let names: Vec<String> = match file.names {
            ClassNames::Indexed(map) => map.into_values().collect(),
            ClassNames::Listed(list) => list,
        };
        if names.is_empty() {
            return Err(Error::ModelLoad("class file lists no names".to_string()));
        }
        Ok(Self::from_entities(names))
    }

    /// Load a YAML class file from disk.
    pub fn from_yaml_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let yaml = std::fs::read_to_string(path.as_ref()).map_err(|e| {
            Error::ModelLoad(format!(
                "cannot read class file {}: {}",
                path.as_ref().display(),
                e
            ))
        })?;
        Self::from_yaml_str(&yaml)
    }

    /// Number of labels.
    pub fn len(&self) -> usize {
        self.labels.len()
    }

    /// Check if the vocabulary is empty.
    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }

    /// Tag for a model output id; out-of-range ids map to `O`.
    pub fn tag(&self, id: usize) -> NerTag {
        self.labels.get(id).cloned().unwrap_or(NerTag::O)
    }

    /// Id of a tag, if present.
    pub fn id_of(&self, tag: &NerTag) -> Option<usize> {
        self.labels.iter().position(|t| t == tag)
    }

    /// Iterate over the labels in id order.
    pub fn iter(&self) -> impl Iterator<Item = &NerTag> {
        self.labels.iter()
    }
}

impl Default for LabelSet {
    fn default() -> Self {
        let mut labels = NerTag::BUILTIN.to_vec();
        labels.push(NerTag::O);
        Self { labels }
    }
}
