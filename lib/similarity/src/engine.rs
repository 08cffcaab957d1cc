//! Similarity engine
//!
//! Turns a candidate sequence into a TF-IDF vector space and answers cosine
//! similarity queries between its rows.

use ahash::{AHashMap, AHashSet};
use skinmatch_core::{description, Error, Product, ProductId, Result};
use std::borrow::Cow;

use crate::tfidf::{SparseVector, TfidfModel, TfidfVectorizer};

/// Row-oriented access to pairwise similarity scores
pub trait SimilarityLookup {
    /// Number of rows
    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Similarity of `row` against every row, indexed by row
    fn row(&self, row: usize) -> Cow<'_, [f32]>;
}

#[derive(Debug, Clone, Copy, Default)]
pub struct SimilarityEngine {
    vectorizer: TfidfVectorizer,
}

impl SimilarityEngine {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build the vector space for `candidates`
    ///
    /// Candidates are deduplicated by normalized description (first one
    /// wins) and blank descriptions are dropped before vectorizing, so the
    /// resulting rows are a subset of the input. The index remembers which
    /// product each row came from.
    pub fn build(&self, candidates: &[&Product]) -> SimilarityIndex {
        let described: Vec<(&ProductId, String)> = candidates
            .iter()
            .map(|p| (&p.id, description(p)))
            .collect();
        let input = described.len();

        let unique = dedup_by_description(described);
        let non_blank: Vec<(&ProductId, String)> = unique
            .into_iter()
            .filter(|(_, text)| !text.trim().is_empty())
            .collect();
        let rows = dedup_by_description(non_blank);

        let (ids, descriptions): (Vec<ProductId>, Vec<String>) =
            rows.into_iter().map(|(id, text)| (id.clone(), text)).unzip();
        let (model, vectors) = self.vectorizer.fit_transform(&descriptions);

        let mut rows_by_id = AHashMap::with_capacity(ids.len());
        for (row, id) in ids.iter().enumerate() {
            rows_by_id.entry(id.clone()).or_insert(row);
        }

        tracing::debug!(
            candidates = input,
            rows = ids.len(),
            vocabulary = model.vocabulary_size(),
            "Built similarity index"
        );

        SimilarityIndex {
            ids,
            descriptions,
            rows_by_id,
            vectors,
            model,
        }
    }
}

fn dedup_by_description<'a>(rows: Vec<(&'a ProductId, String)>) -> Vec<(&'a ProductId, String)> {
    let mut seen: AHashSet<String> = AHashSet::with_capacity(rows.len());
    rows.into_iter()
        .filter(|(_, text)| seen.insert(text.clone()))
        .collect()
}

/// TF-IDF vectors for one candidate set
#[derive(Debug, Clone)]
pub struct SimilarityIndex {
    ids: Vec<ProductId>,
    descriptions: Vec<String>,
    rows_by_id: AHashMap<ProductId, usize>,
    vectors: Vec<SparseVector>,
    model: TfidfModel,
}

impl SimilarityIndex {
    #[inline]
    pub fn len(&self) -> usize {
        self.ids.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    pub fn product_id(&self, row: usize) -> Option<&ProductId> {
        self.ids.get(row)
    }

    pub fn description(&self, row: usize) -> Option<&str> {
        self.descriptions.get(row).map(String::as_str)
    }

    pub fn model(&self) -> &TfidfModel {
        &self.model
    }

    /// Row holding `id`
    ///
    /// Fails with [`Error::ReferenceNotFound`] when the product was collapsed
    /// into an earlier duplicate or had a blank description.
    pub fn reference_row(&self, id: &str) -> Result<usize> {
        self.rows_by_id
            .get(id)
            .copied()
            .ok_or_else(|| Error::ReferenceNotFound(id.to_string()))
    }

    /// Cosine similarity between two rows
    pub fn similarity(&self, a: usize, b: usize) -> f32 {
        match (self.vectors.get(a), self.vectors.get(b)) {
            (Some(va), Some(vb)) => va.dot(vb).clamp(0.0, 1.0),
            _ => 0.0,
        }
    }

    /// Materialize the full symmetric matrix
    pub fn matrix(&self) -> SimilarityMatrix {
        let size = self.len();
        let mut data = vec![0.0f32; size * size];
        for i in 0..size {
            for j in i..size {
                let score = self.similarity(i, j);
                data[i * size + j] = score;
                data[j * size + i] = score;
            }
        }
        SimilarityMatrix { size, data }
    }
}

impl SimilarityLookup for SimilarityIndex {
    fn len(&self) -> usize {
        self.ids.len()
    }

    fn row(&self, row: usize) -> Cow<'_, [f32]> {
        Cow::Owned((0..self.len()).map(|other| self.similarity(row, other)).collect())
    }
}

/// Dense M x M cosine similarity matrix
#[derive(Debug, Clone, PartialEq)]
pub struct SimilarityMatrix {
    size: usize,
    data: Vec<f32>,
}

impl SimilarityMatrix {
    #[inline]
    pub fn size(&self) -> usize {
        self.size
    }

    #[inline]
    pub fn get(&self, i: usize, j: usize) -> f32 {
        self.data[i * self.size + j]
    }
}

impl SimilarityLookup for SimilarityMatrix {
    fn len(&self) -> usize {
        self.size
    }

    fn row(&self, row: usize) -> Cow<'_, [f32]> {
        Cow::Borrowed(&self.data[row * self.size..(row + 1) * self.size])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn products() -> Vec<Product> {
        vec![
            Product::new("A").with_highlights("vegan, cruelty-free"),
            Product::new("B").with_highlights("vegan"),
            Product::new("C").with_highlights("fragrance-free"),
        ]
    }

    #[test]
    fn test_build_keeps_all_distinct_rows() {
        let products = products();
        let refs: Vec<&Product> = products.iter().collect();
        let index = SimilarityEngine::new().build(&refs);

        assert_eq!(index.len(), 3);
        assert_eq!(index.reference_row("C").unwrap(), 2);
        assert_eq!(index.product_id(1).map(ProductId::as_str), Some("B"));
        assert_eq!(index.description(0), Some("vegan, cruelty-free"));
    }

    #[test]
    fn test_duplicates_and_blanks_are_dropped() {
        let products = vec![
            Product::new("blank"),
            Product::new("first").with_highlights("Vegan").with_ingredients("Aqua"),
            Product::new("copy").with_highlights("<b>VEGAN</b>").with_ingredients("aqua"),
            Product::new("other").with_ingredients("Zinc Oxide"),
        ];
        let refs: Vec<&Product> = products.iter().collect();
        let index = SimilarityEngine::new().build(&refs);

        assert_eq!(index.len(), 2);
        assert_eq!(index.reference_row("first").unwrap(), 0);
        assert_eq!(index.reference_row("other").unwrap(), 1);
        assert!(matches!(index.reference_row("copy"), Err(Error::ReferenceNotFound(id)) if id == "copy"));
        assert!(matches!(index.reference_row("blank"), Err(Error::ReferenceNotFound(_))));
    }

    #[test]
    fn test_serialized_list_is_not_a_duplicate_of_plain_text() {
        let products = vec![
            Product::new("A").with_highlights("['Vegan']"),
            Product::new("B").with_highlights("Vegan"),
            Product::new("C").with_highlights("spf"),
        ];
        let refs: Vec<&Product> = products.iter().collect();
        let index = SimilarityEngine::new().build(&refs);

        assert_eq!(index.len(), 3);
        let b = index.reference_row("B").unwrap();
        assert_eq!(b, 1);
        assert!((index.similarity(b, 0) - 1.0).abs() < 1e-6);
        assert_eq!(index.similarity(b, 2), 0.0);

        let ranked = crate::select_top_n(&index, b, 2).unwrap();
        assert_eq!(ranked, vec![0, 2]);
    }

    #[test]
    fn test_matrix_is_symmetric_and_bounded() {
        let products = products();
        let refs: Vec<&Product> = products.iter().collect();
        let matrix = SimilarityEngine::new().build(&refs).matrix();

        assert_eq!(matrix.size(), 3);
        for i in 0..3 {
            for j in 0..3 {
                let s = matrix.get(i, j);
                assert!((0.0..=1.0).contains(&s));
                assert_eq!(s, matrix.get(j, i));
            }
        }
        assert!(matrix.get(0, 1) > matrix.get(0, 2));
        assert_eq!(matrix.get(1, 2), 0.0);
    }

    #[test]
    fn test_lazy_row_matches_matrix() {
        let products = products();
        let refs: Vec<&Product> = products.iter().collect();
        let index = SimilarityEngine::new().build(&refs);
        let matrix = index.matrix();
        assert_eq!(index.row(0).as_ref(), matrix.row(0).as_ref());
    }

    #[test]
    fn test_empty_candidates() {
        let index = SimilarityEngine::new().build(&[]);
        assert!(index.is_empty());
        assert!(index.matrix().is_empty());
    }
}
