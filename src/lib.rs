//! # SkinMatch
//!
//! Content-based skincare product recommendations.
//!
//! Given a reference product, SkinMatch narrows the catalog with optional
//! keyword, skin-type and allergen filters, vectorizes the remaining product
//! descriptions with TF-IDF and returns the most cosine-similar products.
//!
//! ## Quick Start
//!
//! ### As a Server
//!
//! ```bash
//! skinmatch --catalog ./data/products.json serve --http-port 8080
//! ```
//!
//! ### As a Library
//!
//! ```rust
//! use skinmatch::prelude::*;
//!
//! let catalog = Catalog::new(1, vec![
//!     Product::new("A").with_highlights("['Vegan']").with_ingredients("Aloe, Water"),
//!     Product::new("B").with_highlights("['Vegan']").with_ingredients("Aloe, Glycerin"),
//!     Product::new("C").with_highlights("['Cruelty-Free']").with_ingredients("Water, Fragrance"),
//! ]).unwrap();
//!
//! let options = RecommendOptions::default().with_keyword("vegan");
//! let ids = Recommender::new()
//!     .recommend(&catalog, "A", 5, &options, &UserProfile::default())
//!     .unwrap();
//! assert_eq!(ids, vec![ProductId::from("B")]);
//! ```
//!
//! ## Crate Structure
//!
//! - `skinmatch-core` - products, field values, normalization, filters
//! - `skinmatch-similarity` - TF-IDF, cosine similarity, top-N, cache
//! - `skinmatch-storage` - catalog loading and the versioned catalog store
//! - `skinmatch-api` - REST API

pub use skinmatch_core::{
    categories, description, exclude_all, exclude_matching, include_matching, list_products,
    matching_skin_type, normalize, popular_for, Catalog, Error, FieldValue, Filter,
    FilterCondition, Product, ProductField, ProductFilter, ProductId, ProductQuery, Result,
    SkinType, UserProfile,
};

pub use skinmatch_similarity::{
    recommend, select_top_n, Recommendation, RecommendOptions, Recommender, SimilarityCache,
    SimilarityEngine, SimilarityIndex, SimilarityMatrix,
};

pub use skinmatch_storage::{load_catalog, CatalogStore};

pub use skinmatch_api::{AppState, RestApi, ServerConfig};

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::{
        Catalog, CatalogStore, Error, FieldValue, Product, ProductId, RecommendOptions,
        Recommender, Result, SimilarityCache, SkinType, UserProfile,
    };
}
