use ahash::AHashMap;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::{Error, FieldValue, Result};

/// Catalog-unique product identifier (e.g. `"P433469"`)
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ProductId(String);

impl ProductId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for ProductId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<String> for ProductId {
    fn from(s: String) -> Self {
        ProductId(s)
    }
}

impl From<&str> for ProductId {
    fn from(s: &str) -> Self {
        ProductId(s.to_string())
    }
}

impl std::borrow::Borrow<str> for ProductId {
    fn borrow(&self) -> &str {
        &self.0
    }
}

/// A catalog row
///
/// Only `ingredients`, `highlights` and `skin_type` are read by the
/// recommendation core. Everything else is kept in `attributes` and passed
/// through untouched.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Product {
    #[serde(rename = "product_id", alias = "id")]
    pub id: ProductId,
    #[serde(default)]
    pub ingredients: FieldValue,
    #[serde(default)]
    pub highlights: FieldValue,
    #[serde(default, alias = "assigned_skin_type", skip_serializing_if = "Option::is_none")]
    pub skin_type: Option<String>,
    #[serde(flatten)]
    pub attributes: Map<String, Value>,
}

/// The two text fields the filters and the similarity engine work on
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProductField {
    Ingredients,
    Highlights,
}

impl Product {
    #[inline]
    #[must_use]
    pub fn new(id: impl Into<ProductId>) -> Self {
        Self {
            id: id.into(),
            ingredients: FieldValue::Missing,
            highlights: FieldValue::Missing,
            skin_type: None,
            attributes: Map::new(),
        }
    }

    #[must_use]
    pub fn with_ingredients(mut self, ingredients: impl Into<FieldValue>) -> Self {
        self.ingredients = ingredients.into();
        self
    }

    #[must_use]
    pub fn with_highlights(mut self, highlights: impl Into<FieldValue>) -> Self {
        self.highlights = highlights.into();
        self
    }

    #[must_use]
    pub fn with_skin_type(mut self, skin_type: impl Into<String>) -> Self {
        self.skin_type = Some(skin_type.into());
        self
    }

    #[must_use]
    pub fn with_attribute(mut self, key: impl Into<String>, value: Value) -> Self {
        self.attributes.insert(key.into(), value);
        self
    }

    pub fn field(&self, field: ProductField) -> &FieldValue {
        match field {
            ProductField::Ingredients => &self.ingredients,
            ProductField::Highlights => &self.highlights,
        }
    }

    /// Display name, when the payload carries one
    pub fn name(&self) -> Option<&str> {
        self.attributes
            .get("product_name")
            .or_else(|| self.attributes.get("name"))
            .and_then(Value::as_str)
    }

    /// String attribute, `None` when absent or not a string
    pub fn text_attribute(&self, key: &str) -> Option<&str> {
        self.attributes.get(key).and_then(Value::as_str)
    }

    /// Numeric attribute; numeric strings such as `"4.5"` are accepted
    pub fn number_attribute(&self, key: &str) -> Option<f64> {
        match self.attributes.get(key)? {
            Value::Number(n) => n.as_f64(),
            Value::String(s) => s.trim().parse().ok(),
            _ => None,
        }
    }

    /// False only when the row carries a truthy `out_of_stock` flag
    pub fn in_stock(&self) -> bool {
        match self.attributes.get("out_of_stock") {
            Some(Value::Bool(flag)) => !flag,
            Some(Value::Number(n)) => n.as_f64() == Some(0.0),
            Some(Value::String(s)) => matches!(s.trim(), "" | "0" | "false" | "False"),
            _ => true,
        }
    }
}

/// Immutable product arena for one catalog snapshot
///
/// Products keep their insertion order; every "row index" handed out by the
/// filters and the similarity engine refers back to products by id, never by
/// a position that could shift.
#[derive(Debug, Clone, Default)]
pub struct Catalog {
    version: u64,
    products: Vec<Product>,
    by_id: AHashMap<ProductId, usize>,
}

impl Catalog {
    /// Build a snapshot, rejecting duplicate ids
    pub fn new(version: u64, products: Vec<Product>) -> Result<Self> {
        let mut by_id = AHashMap::with_capacity(products.len());
        for (pos, product) in products.iter().enumerate() {
            if by_id.insert(product.id.clone(), pos).is_some() {
                return Err(Error::DuplicateProduct(product.id.to_string()));
            }
        }
        Ok(Self {
            version,
            products,
            by_id,
        })
    }

    #[inline]
    pub fn version(&self) -> u64 {
        self.version
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.products.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.products.is_empty()
    }

    pub fn get(&self, id: &str) -> Option<&Product> {
        self.by_id.get(id).map(|&pos| &self.products[pos])
    }

    pub fn contains(&self, id: &str) -> bool {
        self.by_id.contains_key(id)
    }

    pub fn products(&self) -> &[Product] {
        &self.products
    }

    /// All products as a borrowed candidate sequence, in catalog order
    pub fn candidates(&self) -> Vec<&Product> {
        self.products.iter().collect()
    }
}
