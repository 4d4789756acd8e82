//! TF-IDF vectors over a fitted vocabulary.
//!
//! Text is lowercased and split into runs of two or more word characters;
//! English stop words are dropped. Term counts are weighted with a smoothed
//! inverse document frequency, `ln((1 + n) / (1 + df)) + 1`, and each vector
//! is L2-normalized.

use std::collections::BTreeMap;

use super::stopwords::is_stop_word;

/// Sparse vector keyed by vocabulary index, in index order.
pub type SparseVector = BTreeMap<usize, f64>;

fn is_word_char(c: char) -> bool {
    c.is_alphanumeric() || c == '_'
}

/// Split text into lowercase tokens of at least two word characters.
pub fn tokenize(text: &str) -> Vec<String> {
    text.to_lowercase()
        .split(|c: char| !is_word_char(c))
        .filter(|t| t.chars().count() >= 2)
        .filter(|t| !is_stop_word(t))
        .map(str::to_string)
        .collect()
}

/// A fitted TF-IDF model.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TfidfVectorizer {
    vocabulary: BTreeMap<String, usize>,
    idf: Vec<f64>,
}

impl TfidfVectorizer {
    /// Fit the vocabulary and idf weights on a corpus.
    pub fn fit<I, S>(corpus: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut document_frequency: BTreeMap<String, usize> = BTreeMap::new();
        let mut n_docs = 0usize;

        for doc in corpus {
            n_docs += 1;
            let mut terms = tokenize(doc.as_ref());
            terms.sort();
            terms.dedup();
            for term in terms {
                *document_frequency.entry(term).or_insert(0) += 1;
            }
        }

        let n = n_docs as f64;
        let mut vocabulary = BTreeMap::new();
        let mut idf = Vec::with_capacity(document_frequency.len());
        // BTreeMap iteration gives the sorted vocabulary order.
        for (index, (term, df)) in document_frequency.into_iter().enumerate() {
            idf.push(((1.0 + n) / (1.0 + df as f64)).ln() + 1.0);
            vocabulary.insert(term, index);
        }

        log::debug!(
            "TF-IDF fitted on {} sentences, {} terms",
            n_docs,
            vocabulary.len()
        );
        Self { vocabulary, idf }
    }

    /// Number of terms in the vocabulary.
    pub fn vocabulary_len(&self) -> usize {
        self.vocabulary.len()
    }

    /// Index of a term, if it is in the vocabulary.
    pub fn term_index(&self, term: &str) -> Option<usize> {
        self.vocabulary.get(term).copied()
    }

    /// Vectorize a text; terms outside the vocabulary are ignored.
    pub fn transform(&self, text: &str) -> SparseVector {
        let mut vector = SparseVector::new();
        for term in tokenize(text) {
            if let Some(index) = self.term_index(&term) {
                *vector.entry(index).or_insert(0.0) += 1.0;
            }
        }
        for (index, value) in vector.iter_mut() {
            *value *= self.idf[*index];
        }

        let norm = vector.values().map(|v| v * v).sum::<f64>().sqrt();
        if norm > 0.0 {
            for value in vector.values_mut() {
                *value /= norm;
            }
        }
        vector
    }
}

/// Cosine similarity of two normalized sparse vectors; `0` if either is zero.
pub fn cosine(a: &SparseVector, b: &SparseVector) -> f64 {
    let (small, large) = if a.len() <= b.len() { (a, b) } else { (b, a) };
    small
        .iter()
        .filter_map(|(i, x)| large.get(i).map(|y| x * y))
        .sum()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tokenize() {
        assert_eq!(
            tokenize("Built the CI/CD system in Rust & Go, 5 years"),
            vec!["built", "ci", "cd", "rust", "years"]
        );
    }

    #[test]
    fn test_fit_sorted_vocabulary() {
        let v = TfidfVectorizer::fit(["python docker", "python kubernetes"]);
        assert_eq!(v.vocabulary_len(), 3);
        assert_eq!(v.term_index("docker"), Some(0));
        assert_eq!(v.term_index("kubernetes"), Some(1));
        assert_eq!(v.term_index("python"), Some(2));
    }

    #[test]
    fn test_idf_weights() {
        let v = TfidfVectorizer::fit(["python docker", "python kubernetes"]);
        // python: df = 2, n = 2 => idf 1; docker: df = 1 => ln(1.5) + 1.
        let vec = v.transform("python docker");
        let python = vec[&2];
        let docker = vec[&0];
        let ratio = docker / python;
        assert!((ratio - (1.5f64.ln() + 1.0)).abs() < 1e-12);
        let norm: f64 = vec.values().map(|x| x * x).sum();
        assert!((norm - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_cosine() {
        let v = TfidfVectorizer::fit(["python", "docker", "kubernetes"]);
        let a = v.transform("python");
        assert!((cosine(&a, &v.transform("Python!")) - 1.0).abs() < 1e-12);
        assert_eq!(cosine(&a, &v.transform("docker")), 0.0);
        assert_eq!(cosine(&a, &v.transform("the and")), 0.0);
    }
}
