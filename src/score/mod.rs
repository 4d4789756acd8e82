//! Resume scoring against a requirement profile.
//!
//! Tagged resumes are reduced to per-field sentence lists, a TF-IDF model is
//! fitted once over all sentences, and each field is scored by summing the
//! best cosine match of every resume sentence.

mod scorer;
pub mod stopwords;
mod vectorizer;

pub use scorer::{FieldScorer, FittedScorer};
pub use vectorizer::{cosine, tokenize, SparseVector, TfidfVectorizer};
