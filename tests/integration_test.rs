// Integration tests for SkinMatch
use skinmatch_core::{Catalog, Error, Product, ProductId, SkinType, UserProfile};
use skinmatch_similarity::{RecommendOptions, Recommender, SimilarityCache, SimilarityEngine};
use skinmatch_storage::{load_catalog, CatalogStore};
use std::io::Write;
use std::sync::Arc;

fn ids(values: &[&str]) -> Vec<ProductId> {
    values.iter().map(|v| ProductId::from(*v)).collect()
}

fn catalog_file(json: &str) -> tempfile::NamedTempFile {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    file.write_all(json.as_bytes()).unwrap();
    file.flush().unwrap();
    file
}

#[test]
fn test_recommend_ranks_by_shared_terms() {
    let catalog = Catalog::new(
        1,
        vec![
            Product::new("A").with_highlights("vegan, cruelty-free"),
            Product::new("B").with_highlights("vegan"),
            Product::new("C").with_highlights("fragrance-free"),
        ],
    )
    .unwrap();

    let result = Recommender::new()
        .recommend(&catalog, "A", 2, &RecommendOptions::default(), &UserProfile::default())
        .unwrap();
    assert_eq!(result, ids(&["B", "C"]));
}

#[test]
fn test_allergen_scenario() {
    let catalog = Catalog::new(
        1,
        vec![
            Product::new("R").with_ingredients("Water, Glycerin"),
            // Text mentioning the allergen is dropped
            Product::new("X").with_ingredients("Water, Parfum"),
            Product::new("Y").with_ingredients("Water, Aloe"),
            // A list keeps the product as long as one entry is clean
            Product::new("Z").with_ingredients("['Parfum', 'Water']"),
        ],
    )
    .unwrap();

    let options = RecommendOptions::default().with_allergy_filter();
    let profile = UserProfile::new(None, vec!["parfum".to_string()]);
    let recommendation = Recommender::new()
        .recommend_detailed(&catalog, "R", 5, &options, &profile)
        .unwrap();

    assert_eq!(recommendation.candidates, 3);
    assert!(!recommendation.ids.contains(&ProductId::from("X")));
    assert!(recommendation.ids.contains(&ProductId::from("Y")));
    assert!(recommendation.ids.contains(&ProductId::from("Z")));
}

#[test]
fn test_only_reference_left() {
    let catalog = Catalog::new(
        1,
        vec![
            Product::new("A").with_highlights("['Vegan']"),
            Product::new("B").with_highlights("['Paraben Free']"),
            Product::new("C").with_highlights("['Oil Free']"),
        ],
    )
    .unwrap();

    let options = RecommendOptions::default().with_keyword("vegan");
    let result = Recommender::new().recommend(&catalog, "A", 3, &options, &UserProfile::default());
    assert!(matches!(result, Err(Error::InsufficientCandidates { remaining: 1 })));
}

#[test]
fn test_missing_reference() {
    let catalog = Catalog::new(1, vec![Product::new("A"), Product::new("B")]).unwrap();
    let result = Recommender::new().recommend(
        &catalog,
        "nope",
        3,
        &RecommendOptions::default(),
        &UserProfile::default(),
    );
    assert!(matches!(result, Err(Error::ProductNotFound(id)) if id == "nope"));
}

#[test]
fn test_filtered_reference_is_still_compared() {
    let catalog = Catalog::new(
        1,
        vec![
            Product::new("A")
                .with_highlights("['Hydrating']")
                .with_ingredients("Aloe, Water")
                .with_skin_type("oily"),
            Product::new("B")
                .with_highlights("['Hydrating']")
                .with_ingredients("Aloe, Glycerin")
                .with_skin_type("dry"),
            Product::new("C")
                .with_highlights("['Matte']")
                .with_ingredients("Clay, Water")
                .with_skin_type("all"),
        ],
    )
    .unwrap();

    let options = RecommendOptions::default().with_skin_type_filter();
    let profile = UserProfile::new(Some(SkinType::Dry), vec![]);
    let recommendation = Recommender::new()
        .recommend_detailed(&catalog, "A", 5, &options, &profile)
        .unwrap();

    assert!(recommendation.reference_reinserted);
    assert_eq!(recommendation.candidates, 2);
    assert_eq!(recommendation.ids, ids(&["B", "C"]));
}

#[test]
fn test_catalog_file_end_to_end() {
    let file = catalog_file(
        r#"[
            {"product_id": "P1", "product_name": "Gel", "highlights": "['Vegan', 'Oil Free']", "ingredients": "<b>Aloe</b> Water"},
            {"product_id": "P2", "product_name": "Serum", "highlights": "['Vegan']", "ingredients": "Aloe, Niacinamide"},
            {"product_id": "P3", "product_name": "Cream", "highlights": null, "ingredients": "Shea Butter"},
            {"product_id": "P4", "product_name": "Toner", "highlights": ["Oil Free"], "ingredients": "Witch Hazel, Water"}
        ]"#,
    );

    let catalog = load_catalog(file.path(), 1).unwrap();
    assert_eq!(catalog.len(), 4);
    assert!(catalog.get("P3").unwrap().highlights.is_missing());
    assert_eq!(
        catalog.get("P4").unwrap().highlights.items(),
        Some(&["Oil Free".to_string()][..])
    );

    let result = Recommender::new()
        .recommend(&catalog, "P1", 2, &RecommendOptions::default(), &UserProfile::default())
        .unwrap();
    // P4 shares "oil free" and "water", P2 only "vegan" and "aloe"
    assert_eq!(result, ids(&["P4", "P2"]));
}

#[test]
fn test_cached_recommendations_follow_catalog_versions() {
    let store = CatalogStore::new(vec![
        Product::new("A").with_highlights("vegan aloe"),
        Product::new("B").with_highlights("vegan aloe gel"),
        Product::new("C").with_highlights("clay mask"),
    ])
    .unwrap();
    let cache = Arc::new(SimilarityCache::new(4));
    let recommender = Recommender::new().with_cache(cache.clone());
    let options = RecommendOptions::default();
    let profile = UserProfile::default();

    let first = recommender.recommend(&store.snapshot(), "A", 1, &options, &profile).unwrap();
    let again = recommender.recommend(&store.snapshot(), "A", 1, &options, &profile).unwrap();
    assert_eq!(first, ids(&["B"]));
    assert_eq!(first, again);
    assert_eq!(cache.stats().hits, 1);

    store
        .replace(vec![
            Product::new("A").with_highlights("vegan aloe"),
            Product::new("B").with_highlights("clay mask"),
            Product::new("C").with_highlights("vegan aloe gel"),
        ])
        .unwrap();
    let updated = recommender.recommend(&store.snapshot(), "A", 1, &options, &profile).unwrap();
    assert_eq!(updated, ids(&["C"]));
    assert_eq!(cache.stats().misses, 2);
}

#[test]
fn test_bounded_and_deterministic() {
    let products: Vec<Product> = (0..20)
        .map(|i| {
            Product::new(format!("P{i}"))
                .with_highlights(format!("['shade {}', 'finish {}']", i % 3, i % 5))
                .with_ingredients(format!("water, extract{}, oil{}", i % 4, i % 7))
        })
        .collect();
    let catalog = Catalog::new(1, products).unwrap();
    let recommender = Recommender::new();
    let options = RecommendOptions::default();
    let profile = UserProfile::default();

    let first = recommender.recommend(&catalog, "P0", 7, &options, &profile).unwrap();
    let second = recommender.recommend(&catalog, "P0", 7, &options, &profile).unwrap();
    assert_eq!(first, second);
    assert_eq!(first.len(), 7);
    assert!(!first.contains(&ProductId::from("P0")));

    let all = recommender.recommend(&catalog, "P0", 100, &options, &profile).unwrap();
    assert!(all.len() <= 19);
    assert!(recommender.recommend(&catalog, "P0", 0, &options, &profile).unwrap().is_empty());
}

#[test]
fn test_engine_matrix_matches_lazy_rows() {
    let products = vec![
        Product::new("A").with_highlights("vegan aloe"),
        Product::new("B").with_highlights("vegan gel"),
        Product::new("C").with_highlights("clay"),
    ];
    let refs: Vec<&Product> = products.iter().collect();
    let index = SimilarityEngine::default().build(&refs);
    let matrix = index.matrix();

    for a in 0..index.len() {
        for b in 0..index.len() {
            assert!((matrix.get(a, b) - index.similarity(a, b)).abs() < 1e-6);
        }
    }
}
