//! # SkinMatch Similarity
//!
//! Content-based similarity over product descriptions.
//!
//! ## Features
//!
//! - **TF-IDF vectors**: smoothed idf, English stop words removed, unit-length rows
//! - **Cosine similarity**: lazily per row, or as a full symmetric matrix
//! - **Top-N selection**: stable ranking that never returns the reference
//! - **Similarity cache**: optional LRU memo keyed by catalog version and filters
//!
//! ## Example
//!
//! ```rust
//! use skinmatch_core::{Catalog, Product, UserProfile};
//! use skinmatch_similarity::{Recommender, RecommendOptions};
//!
//! let catalog = Catalog::new(1, vec![
//!     Product::new("A").with_highlights("vegan, cruelty-free"),
//!     Product::new("B").with_highlights("vegan"),
//!     Product::new("C").with_highlights("fragrance-free"),
//! ]).unwrap();
//!
//! let ids = Recommender::new()
//!     .recommend(&catalog, "A", 2, &RecommendOptions::default(), &UserProfile::default())
//!     .unwrap();
//! assert_eq!(ids[0].as_str(), "B");
//! ```
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────┐     ┌─────────────┐     ┌─────────────┐
//! │   Catalog   │────>│   Filters   │────>│   Engine    │
//! │  (arena)    │     │ (candidates)│     │  (TF-IDF)   │
//! └─────────────┘     └─────────────┘     └─────────────┘
//!                                                │
//!                     ┌─────────────┐            │
//!                     │  Selector   │<───────────┘
//!                     │  (top N)    │
//!                     └─────────────┘
//! ```

pub mod cache;
pub mod engine;
pub mod recommend;
pub mod select;
pub mod stopwords;
pub mod tfidf;

pub use cache::{AppliedFilters, CacheKey, CacheStats, FilterSignature, SimilarityCache};
pub use engine::{SimilarityEngine, SimilarityIndex, SimilarityLookup, SimilarityMatrix};
pub use recommend::{filter_candidates, recommend, Recommendation, RecommendOptions, Recommender};
pub use select::select_top_n;
pub use tfidf::{tokenize, SparseVector, TfidfModel, TfidfVectorizer};
