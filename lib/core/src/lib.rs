//! # SkinMatch Core
//!
//! Core data model and text plumbing for the SkinMatch recommender.
//!
//! - [`Product`] / [`Catalog`] - product rows and the immutable arena holding them
//! - [`FieldValue`] - missing / text / list / literal field values, parsed once on load
//! - [`normalize`] - markup stripping, ASCII folding, whitespace collapsing
//! - [`Filter`] - keyword, allergen and skin-type candidate filters
//! - [`browse`] - catalog listing, categories and popularity ranking
//!
//! ## Example
//!
//! ```rust
//! use skinmatch_core::{Catalog, Product, ProductField, include_matching};
//!
//! let catalog = Catalog::new(1, vec![
//!     Product::new("P1").with_highlights("['Vegan', 'Cruelty-Free']"),
//!     Product::new("P2").with_highlights("Fragrance Free"),
//! ]).unwrap();
//!
//! let vegan = include_matching(&catalog.candidates(), ProductField::Highlights, "vegan");
//! assert_eq!(vegan.len(), 1);
//! ```

pub mod browse;
pub mod error;
pub mod field;
pub mod filter;
pub mod normalize;
pub mod product;
pub mod profile;

pub use browse::{categories, list_products, popular_for, Page, ProductQuery};
pub use error::{Error, Result};
pub use field::FieldValue;
pub use filter::{
    exclude_all, exclude_matching, include_matching, matching_skin_type, Filter, FilterCondition,
    ProductFilter,
};
pub use normalize::{description, normalize, normalize_field};
pub use product::{Catalog, Product, ProductField, ProductId};
pub use profile::{SkinType, UserProfile};
