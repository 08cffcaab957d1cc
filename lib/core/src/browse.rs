//! Read-only catalog browsing.
//!
//! Listing with filters and paging, the category index, and the popularity
//! ranking used when no reference product is given. Out-of-stock rows are
//! hidden from listings and rankings.

use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::collections::BTreeSet;

use crate::{Catalog, Product, SkinType};

/// Page size when a listing does not ask for one
pub const DEFAULT_PAGE_LIMIT: usize = 50;
/// Size of the popular-products ranking
pub const POPULAR_LIMIT: usize = 20;

/// Listing filters; every filter is a case-insensitive substring match
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct ProductQuery {
    /// Primary or secondary category
    pub category: Option<String>,
    /// Assigned skin type; products without one never match
    pub skin_type: Option<String>,
    /// Product or brand name
    pub search: Option<String>,
    pub limit: Option<usize>,
    pub offset: Option<usize>,
}

/// One page of a listing
#[derive(Debug, Clone, Serialize)]
pub struct Page<'a> {
    pub products: Vec<&'a Product>,
    /// Matches before paging
    pub total: usize,
    pub limit: usize,
    pub offset: usize,
}

impl ProductQuery {
    pub fn matches(&self, product: &Product) -> bool {
        if let Some(category) = non_blank(&self.category) {
            let hit = ["primary_category", "secondary_category"]
                .iter()
                .any(|key| contains_ci(product.text_attribute(key), category));
            if !hit {
                return false;
            }
        }
        if let Some(skin_type) = non_blank(&self.skin_type) {
            if !contains_ci(product.skin_type.as_deref(), skin_type) {
                return false;
            }
        }
        if let Some(search) = non_blank(&self.search) {
            let hit = ["product_name", "brand_name"]
                .iter()
                .any(|key| contains_ci(product.text_attribute(key), search));
            if !hit {
                return false;
            }
        }
        true
    }
}

/// In-stock products matching `query`, most loved first, then paged
pub fn list_products<'a>(catalog: &'a Catalog, query: &ProductQuery) -> Page<'a> {
    let mut matches: Vec<&Product> = catalog
        .products()
        .iter()
        .filter(|p| p.in_stock() && query.matches(p))
        .collect();
    matches.sort_by(|a, b| by_loves(a, b));

    let limit = query.limit.unwrap_or(DEFAULT_PAGE_LIMIT);
    let offset = query.offset.unwrap_or(0);
    let total = matches.len();
    let products = matches.into_iter().skip(offset).take(limit).collect();

    Page {
        products,
        total,
        limit,
        offset,
    }
}

/// Distinct non-blank primary categories, sorted
pub fn categories(catalog: &Catalog) -> Vec<String> {
    catalog
        .products()
        .iter()
        .filter_map(|p| p.text_attribute("primary_category"))
        .map(str::trim)
        .filter(|c| !c.is_empty())
        .collect::<BTreeSet<_>>()
        .into_iter()
        .map(str::to_string)
        .collect()
}

/// Most loved in-stock products, ties broken by rating
///
/// With a skin type, products are kept when their assigned skin type
/// mentions it or mentions "all", or when they have none.
pub fn popular_for(catalog: &Catalog, skin_type: Option<SkinType>, limit: usize) -> Vec<&Product> {
    let mut ranked: Vec<&Product> = catalog
        .products()
        .iter()
        .filter(|p| p.in_stock())
        .filter(|p| match (skin_type, p.skin_type.as_deref().map(str::trim)) {
            (None, _) | (Some(_), None) | (Some(_), Some("")) => true,
            (Some(wanted), target) => contains_ci(target, wanted.as_str()) || contains_ci(target, "all"),
        })
        .collect();
    ranked.sort_by(|a, b| by_loves(a, b).then_with(|| by_number(b, a, "rating")));
    ranked.truncate(limit);
    ranked
}

// Descending; products without a count sort last
fn by_loves(a: &Product, b: &Product) -> Ordering {
    by_number(b, a, "loves_count")
}

fn by_number(a: &Product, b: &Product, key: &str) -> Ordering {
    let a = a.number_attribute(key).unwrap_or(f64::NEG_INFINITY);
    let b = b.number_attribute(key).unwrap_or(f64::NEG_INFINITY);
    a.total_cmp(&b)
}

fn non_blank(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|v| !v.is_empty())
}

fn contains_ci(haystack: Option<&str>, needle: &str) -> bool {
    haystack.is_some_and(|h| h.to_lowercase().contains(&needle.to_lowercase()))
}
