//! TF-IDF vectorization over normalized descriptions.
//!
//! Tokens are runs of two or more word characters, stop words removed.
//! Weights follow the smoothed scheme `tf * (ln((1 + n) / (1 + df)) + 1)`
//! and every vector is L2-normalized, so the dot product of two vectors is
//! their cosine similarity.

use ahash::AHashMap;
use once_cell::sync::Lazy;
use regex::Regex;

use crate::stopwords::is_stop_word;

static TOKEN_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\b\w\w+\b").expect("valid token pattern"));

/// Sparse term-weight vector, entries sorted by term id
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SparseVector {
    entries: Vec<(u32, f32)>,
}

impl SparseVector {
    /// Build from unsorted `(term, weight)` pairs
    pub fn from_entries(mut entries: Vec<(u32, f32)>) -> Self {
        entries.sort_unstable_by_key(|&(term, _)| term);
        Self { entries }
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    #[inline]
    pub fn nnz(&self) -> usize {
        self.entries.len()
    }

    pub fn entries(&self) -> &[(u32, f32)] {
        &self.entries
    }

    pub fn norm(&self) -> f32 {
        self.entries.iter().map(|(_, w)| w * w).sum::<f32>().sqrt()
    }

    /// Merge-join dot product
    pub fn dot(&self, other: &SparseVector) -> f32 {
        let (mut i, mut j) = (0, 0);
        let mut sum = 0.0f32;
        while i < self.entries.len() && j < other.entries.len() {
            let (ta, wa) = self.entries[i];
            let (tb, wb) = other.entries[j];
            match ta.cmp(&tb) {
                std::cmp::Ordering::Less => i += 1,
                std::cmp::Ordering::Greater => j += 1,
                std::cmp::Ordering::Equal => {
                    sum += wa * wb;
                    i += 1;
                    j += 1;
                }
            }
        }
        sum
    }

    /// Cosine similarity clamped to [0, 1]; zero vectors score 0
    pub fn cosine(&self, other: &SparseVector) -> f32 {
        let norm_a = self.norm();
        let norm_b = other.norm();
        if norm_a == 0.0 || norm_b == 0.0 {
            return 0.0;
        }
        (self.dot(other) / (norm_a * norm_b)).clamp(0.0, 1.0)
    }

    fn normalize(&mut self) {
        let norm = self.norm();
        if norm > f32::EPSILON {
            let inv = 1.0 / norm;
            for (_, w) in &mut self.entries {
                *w *= inv;
            }
        }
    }
}

/// Tokenize text the way the vectorizer sees it
pub fn tokenize(text: &str) -> Vec<String> {
    TOKEN_RE
        .find_iter(text)
        .map(|m| m.as_str().to_lowercase())
        .filter(|t| !is_stop_word(t))
        .collect()
}

/// Vocabulary and idf weights learned from one set of documents
#[derive(Debug, Clone, Default)]
pub struct TfidfModel {
    terms: Vec<String>,
    term_ids: AHashMap<String, u32>,
    idf: Vec<f32>,
}

impl TfidfModel {
    #[inline]
    pub fn vocabulary_size(&self) -> usize {
        self.terms.len()
    }

    pub fn term_id(&self, term: &str) -> Option<u32> {
        self.term_ids.get(term).copied()
    }

    pub fn term(&self, id: u32) -> Option<&str> {
        self.terms.get(id as usize).map(String::as_str)
    }

    pub fn idf(&self, term: &str) -> Option<f32> {
        self.term_id(term).map(|id| self.idf[id as usize])
    }

    /// Vectorize a document against the learned vocabulary; unknown terms are ignored
    pub fn transform(&self, document: &str) -> SparseVector {
        let mut counts: AHashMap<u32, u32> = AHashMap::new();
        for token in tokenize(document) {
            if let Some(id) = self.term_id(&token) {
                *counts.entry(id).or_insert(0) += 1;
            }
        }
        self.weigh(counts)
    }

    fn weigh(&self, counts: AHashMap<u32, u32>) -> SparseVector {
        let entries = counts
            .into_iter()
            .map(|(id, tf)| (id, tf as f32 * self.idf[id as usize]))
            .collect();
        let mut vector = SparseVector::from_entries(entries);
        vector.normalize();
        vector
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct TfidfVectorizer;

impl TfidfVectorizer {
    pub fn new() -> Self {
        Self
    }

    /// Learn the vocabulary from `documents` and return one vector per document
    ///
    /// Term ids follow first appearance, so the output never depends on hash
    /// iteration order.
    pub fn fit_transform<S: AsRef<str>>(&self, documents: &[S]) -> (TfidfModel, Vec<SparseVector>) {
        let mut model = TfidfModel::default();
        let mut doc_freq: Vec<u32> = Vec::new();
        let mut doc_counts: Vec<AHashMap<u32, u32>> = Vec::with_capacity(documents.len());

        for doc in documents {
            let mut counts: AHashMap<u32, u32> = AHashMap::new();
            for token in tokenize(doc.as_ref()) {
                let id = match model.term_ids.get(&token) {
                    Some(&id) => id,
                    None => {
                        let id = model.terms.len() as u32;
                        model.term_ids.insert(token.clone(), id);
                        model.terms.push(token);
                        doc_freq.push(0);
                        id
                    }
                };
                let count = counts.entry(id).or_insert(0);
                if *count == 0 {
                    doc_freq[id as usize] += 1;
                }
                *count += 1;
            }
            doc_counts.push(counts);
        }

        let n = documents.len() as f32;
        model.idf = doc_freq
            .iter()
            .map(|&df| ((1.0 + n) / (1.0 + df as f32)).ln() + 1.0)
            .collect();

        let vectors = doc_counts.into_iter().map(|counts| model.weigh(counts)).collect();
        (model, vectors)
    }
}
