//! Text normalization for product descriptions.
//!
//! `normalize` strips markup, drops non-ASCII characters, collapses
//! whitespace and lowercases. Applying it twice gives the same result as
//! applying it once.

use once_cell::sync::Lazy;
use regex::Regex;

use crate::{FieldValue, Product};

// `(?s)` so a tag broken across lines is still removed in one pass
static TAG_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?s)<.*?>").expect("valid tag pattern"));
static WHITESPACE_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s+").expect("valid whitespace pattern"));

/// Canonicalize free text. Missing input yields an empty string.
pub fn normalize(text: Option<&str>) -> String {
    let Some(text) = text else {
        return String::new();
    };

    let without_tags = TAG_RE.replace_all(text, "");
    let ascii: String = without_tags.chars().filter(char::is_ascii).collect();
    let collapsed = WHITESPACE_RE.replace_all(&ascii, " ");
    collapsed.trim().to_ascii_lowercase()
}

/// Normalize the text a field value was read from
pub fn normalize_field(value: &FieldValue) -> String {
    normalize(value.source_text().as_deref())
}

/// The text a product is compared on: highlights then ingredients
pub fn description(product: &Product) -> String {
    let joined = format!(
        "{} {}",
        normalize_field(&product.highlights),
        normalize_field(&product.ingredients)
    );
    normalize(Some(&joined))
}
