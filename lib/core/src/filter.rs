// Candidate filters over product fields
use crate::{FieldValue, Product, ProductField, SkinType};

pub trait Filter {
    fn matches(&self, product: &Product) -> bool;

    /// Keep the products this filter matches, in order. The input is not touched.
    fn apply<'a>(&self, products: &[&'a Product]) -> Vec<&'a Product> {
        products.iter().copied().filter(|p| self.matches(p)).collect()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FilterCondition {
    /// Keyword appears in the field (any list element, or the text). Non-list
    /// literals never match.
    Contains { field: ProductField, keyword: String },
    /// Keyword absent from the field. For lists this holds when at least one
    /// element lacks the keyword; non-list literals always pass.
    Lacks { field: ProductField, keyword: String },
    /// Product targets the skin type, targets "all", or says nothing
    SuitsSkin(SkinType),
    And(Vec<FilterCondition>),
}

pub struct ProductFilter {
    condition: FilterCondition,
}

impl ProductFilter {
    pub fn new(condition: FilterCondition) -> Self {
        Self { condition }
    }

    pub fn condition(&self) -> &FilterCondition {
        &self.condition
    }

    fn matches_condition(condition: &FilterCondition, product: &Product) -> bool {
        match condition {
            FilterCondition::Contains { field, keyword } => {
                let needle = keyword.to_lowercase();
                match product.field(*field) {
                    FieldValue::List { items, .. } => items.iter().any(|i| contains_ci(i, &needle)),
                    FieldValue::Text(text) => contains_ci(text, &needle),
                    FieldValue::Scalar(_) | FieldValue::Missing => false,
                }
            }
            FilterCondition::Lacks { field, keyword } => {
                let needle = keyword.to_lowercase();
                match product.field(*field) {
                    // An empty list has no element lacking the keyword, so it is dropped
                    FieldValue::List { items, .. } => items.iter().any(|i| !contains_ci(i, &needle)),
                    FieldValue::Text(text) => !contains_ci(text, &needle),
                    FieldValue::Scalar(_) | FieldValue::Missing => true,
                }
            }
            FilterCondition::SuitsSkin(skin_type) => match product.skin_type.as_deref() {
                None => true,
                Some(target) => {
                    let target = target.trim();
                    target.is_empty()
                        || target.eq_ignore_ascii_case("all")
                        || target.eq_ignore_ascii_case(skin_type.as_str())
                }
            },
            FilterCondition::And(conditions) => {
                conditions.iter().all(|c| Self::matches_condition(c, product))
            }
        }
    }
}

impl Filter for ProductFilter {
    fn matches(&self, product: &Product) -> bool {
        Self::matches_condition(&self.condition, product)
    }
}

#[inline]
fn contains_ci(haystack: &str, lowered_needle: &str) -> bool {
    haystack.to_lowercase().contains(lowered_needle)
}

/// Keep products whose `field` contains `keyword` (case-insensitive)
pub fn include_matching<'a>(
    products: &[&'a Product],
    field: ProductField,
    keyword: &str,
) -> Vec<&'a Product> {
    ProductFilter::new(FilterCondition::Contains {
        field,
        keyword: keyword.to_string(),
    })
    .apply(products)
}

/// Keep products whose `field` lacks `keyword` (case-insensitive)
///
/// For list values a product passes as soon as one element lacks the
/// keyword, even if other elements contain it.
pub fn exclude_matching<'a>(
    products: &[&'a Product],
    field: ProductField,
    keyword: &str,
) -> Vec<&'a Product> {
    ProductFilter::new(FilterCondition::Lacks {
        field,
        keyword: keyword.to_string(),
    })
    .apply(products)
}

/// Apply [`exclude_matching`] once per keyword, narrowing each time
pub fn exclude_all<'a, S: AsRef<str>>(
    products: &[&'a Product],
    field: ProductField,
    keywords: &[S],
) -> Vec<&'a Product> {
    let mut remaining = products.to_vec();
    for keyword in keywords {
        remaining = exclude_matching(&remaining, field, keyword.as_ref());
    }
    remaining
}

/// Keep products suitable for `skin_type`
pub fn matching_skin_type<'a>(products: &[&'a Product], skin_type: SkinType) -> Vec<&'a Product> {
    ProductFilter::new(FilterCondition::SuitsSkin(skin_type)).apply(products)
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn ids(products: &[&Product]) -> Vec<String> {
        products.iter().map(|p| p.id.to_string()).collect()
    }

    fn catalog() -> Vec<Product> {
        vec![
            Product::new("list").with_highlights("['Vegan', 'Cruelty-Free']"),
            Product::new("text").with_highlights("Hydrating and vegan formula"),
            Product::new("other").with_highlights("['Fragrance Free']"),
            Product::new("missing"),
        ]
    }

    #[test]
    fn test_include_matching() {
        let products = catalog();
        let refs: Vec<&Product> = products.iter().collect();

        let kept = include_matching(&refs, ProductField::Highlights, "VEGAN");
        assert_eq!(ids(&kept), vec!["list", "text"]);
        // Input untouched
        assert_eq!(refs.len(), 4);
    }

    #[test]
    fn test_include_missing_never_matches() {
        let products = catalog();
        let refs: Vec<&Product> = products.iter().collect();
        let kept = include_matching(&refs, ProductField::Highlights, "");
        assert_eq!(ids(&kept), vec!["list", "text", "other"]);
    }

    #[test]
    fn test_exclude_text_field() {
        let products = vec![
            Product::new("X").with_ingredients("Water, Parfum, Glycerin"),
            Product::new("Y").with_ingredients("Water, Glycerin"),
        ];
        let refs: Vec<&Product> = products.iter().collect();
        let kept = exclude_matching(&refs, ProductField::Ingredients, "parfum");
        assert_eq!(ids(&kept), vec!["Y"]);
    }

    #[test]
    fn test_exclude_list_keeps_partial_matches() {
        let products = vec![
            // One clean entry is enough to survive
            Product::new("mixed").with_ingredients(vec!["Water".to_string(), "Parfum".to_string()]),
            Product::new("only").with_ingredients(vec!["Parfum (Fragrance)".to_string()]),
            Product::new("empty").with_ingredients("[]"),
            Product::new("missing"),
        ];
        let refs: Vec<&Product> = products.iter().collect();
        let kept = exclude_matching(&refs, ProductField::Ingredients, "parfum");
        assert_eq!(ids(&kept), vec!["mixed", "missing"]);
    }

    #[test]
    fn test_exclude_all_is_sequential() {
        let products = vec![
            Product::new("a").with_ingredients("Water, Parfum"),
            Product::new("b").with_ingredients("Water, Methylparaben"),
            Product::new("c").with_ingredients("Water, Glycerin"),
        ];
        let refs: Vec<&Product> = products.iter().collect();
        let kept = exclude_all(&refs, ProductField::Ingredients, &["parfum", "paraben"]);
        assert_eq!(ids(&kept), vec!["c"]);

        let none: [&str; 0] = [];
        assert_eq!(exclude_all(&refs, ProductField::Ingredients, &none).len(), 3);
    }

    #[test]
    fn test_non_list_literals() {
        let products = vec![
            Product::new("quoted").with_highlights("'Vegan'"),
            Product::new("number").with_highlights("42"),
            Product::new("tuple").with_highlights("('Vegan', 'Clean')"),
            Product::new("plain").with_highlights("Vegan 42"),
        ];
        let refs: Vec<&Product> = products.iter().collect();

        assert_eq!(ids(&include_matching(&refs, ProductField::Highlights, "vegan")), vec!["plain"]);
        assert_eq!(ids(&include_matching(&refs, ProductField::Highlights, "4")), vec!["plain"]);
        assert_eq!(
            ids(&exclude_matching(&refs, ProductField::Highlights, "4")),
            vec!["quoted", "number", "tuple"]
        );
        assert_eq!(
            ids(&exclude_matching(&refs, ProductField::Highlights, "vegan")),
            vec!["quoted", "number", "tuple"]
        );
    }

    #[test]
    fn test_matching_skin_type() {
        let products = vec![
            Product::new("oily").with_skin_type("Oily"),
            Product::new("dry").with_skin_type("dry"),
            Product::new("all").with_skin_type("ALL"),
            Product::new("blank").with_skin_type(""),
            Product::new("none"),
        ];
        let refs: Vec<&Product> = products.iter().collect();
        let kept = matching_skin_type(&refs, SkinType::Oily);
        assert_eq!(ids(&kept), vec!["oily", "all", "blank", "none"]);
    }

    #[test]
    fn test_and_condition() {
        let filter = ProductFilter::new(FilterCondition::And(vec![
            FilterCondition::Contains {
                field: ProductField::Highlights,
                keyword: "vegan".to_string(),
            },
            FilterCondition::SuitsSkin(SkinType::Dry),
        ]));
        let ok = Product::new("a").with_highlights("Vegan").with_skin_type("dry");
        let wrong_skin = Product::new("b").with_highlights("Vegan").with_skin_type("oily");
        assert!(filter.matches(&ok));
        assert!(!filter.matches(&wrong_skin));
    }

    fn product_strategy() -> impl Strategy<Value = Product> {
        (
            "[a-z]{1,6}",
            proptest::option::of("[a-zA-Z ,]{0,20}"),
            proptest::collection::vec("[a-zA-Z ]{0,10}", 0..4),
        )
            .prop_map(|(id, text, list)| {
                let product = Product::new(id).with_ingredients(list);
                match text {
                    Some(t) => product.with_highlights(t.as_str()),
                    None => product,
                }
            })
    }

    proptest! {
        #[test]
        fn filters_never_grow(products in proptest::collection::vec(product_strategy(), 0..12),
                              keyword in "[a-z]{0,3}") {
            let refs: Vec<&Product> = products.iter().collect();
            for field in [ProductField::Highlights, ProductField::Ingredients] {
                prop_assert!(include_matching(&refs, field, &keyword).len() <= refs.len());
                prop_assert!(exclude_matching(&refs, field, &keyword).len() <= refs.len());
            }
        }
    }
}
