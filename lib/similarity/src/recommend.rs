//! The recommendation pipeline
//!
//! ```text
//! catalog -> keyword -> skin type -> allergens -> (re-insert reference)
//!         -> SimilarityEngine -> select_top_n -> product ids
//! ```

use serde::{Deserialize, Serialize};
use skinmatch_core::{
    exclude_all, include_matching, matching_skin_type, Catalog, Error, Product, ProductField,
    ProductId, Result, UserProfile,
};
use std::sync::Arc;

use crate::cache::{AppliedFilters, CacheKey, FilterSignature, SimilarityCache};
use crate::engine::{SimilarityEngine, SimilarityIndex};
use crate::select::select_top_n;

/// Which filters a request asks for
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecommendOptions {
    #[serde(default)]
    pub filter_by_skin_type: bool,
    #[serde(default)]
    pub filter_by_allergies: bool,
    #[serde(default)]
    pub keyword: Option<String>,
}

impl RecommendOptions {
    #[must_use]
    pub fn with_keyword(mut self, keyword: impl Into<String>) -> Self {
        self.keyword = Some(keyword.into());
        self
    }

    #[must_use]
    pub fn with_skin_type_filter(mut self) -> Self {
        self.filter_by_skin_type = true;
        self
    }

    #[must_use]
    pub fn with_allergy_filter(mut self) -> Self {
        self.filter_by_allergies = true;
        self
    }

    /// Resolve against a profile: filters without data to act on are skipped
    pub fn applied(&self, profile: &UserProfile) -> AppliedFilters {
        AppliedFilters {
            keyword: self.keyword.clone().filter(|k| !k.is_empty()),
            skin_type: profile.skin_type.filter(|_| self.filter_by_skin_type),
            allergies: if self.filter_by_allergies {
                profile.allergies.clone()
            } else {
                Vec::new()
            },
        }
    }
}

/// Outcome of one recommendation request
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Recommendation {
    /// Most similar first, never the reference
    pub ids: Vec<ProductId>,
    /// Products left after filtering, before the reference was re-inserted
    pub candidates: usize,
    pub reference_reinserted: bool,
    pub applied: AppliedFilters,
}

#[derive(Clone, Default)]
pub struct Recommender {
    engine: SimilarityEngine,
    cache: Option<Arc<SimilarityCache>>,
}

impl Recommender {
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_cache(mut self, cache: Arc<SimilarityCache>) -> Self {
        self.cache = Some(cache);
        self
    }

    pub fn cache(&self) -> Option<&Arc<SimilarityCache>> {
        self.cache.as_ref()
    }

    pub fn recommend(
        &self,
        catalog: &Catalog,
        reference_id: &str,
        count: usize,
        options: &RecommendOptions,
        profile: &UserProfile,
    ) -> Result<Vec<ProductId>> {
        self.recommend_detailed(catalog, reference_id, count, options, profile)
            .map(|r| r.ids)
    }

    pub fn recommend_detailed(
        &self,
        catalog: &Catalog,
        reference_id: &str,
        count: usize,
        options: &RecommendOptions,
        profile: &UserProfile,
    ) -> Result<Recommendation> {
        let reference = catalog
            .get(reference_id)
            .ok_or_else(|| Error::ProductNotFound(reference_id.to_string()))?;

        let applied = options.applied(profile);
        let mut candidates = filter_candidates(catalog, &applied);
        let remaining = candidates.len();

        if remaining < 2 {
            return Err(Error::InsufficientCandidates { remaining });
        }

        let reinserted = !candidates.iter().any(|p| p.id == reference.id);
        if reinserted {
            candidates.insert(0, reference);
        }

        tracing::debug!(
            reference = %reference.id,
            catalog = catalog.len(),
            candidates = remaining,
            reinserted,
            "Filtered candidates"
        );

        let index = self.index_for(catalog, &candidates, &applied, reinserted.then(|| reference.id.clone()));
        let reference_row = index.reference_row(reference_id)?;
        let rows = select_top_n(&*index, reference_row, count)?;

        let ids = rows
            .into_iter()
            .filter_map(|row| index.product_id(row).cloned())
            .collect();

        Ok(Recommendation {
            ids,
            candidates: remaining,
            reference_reinserted: reinserted,
            applied,
        })
    }

    fn index_for(
        &self,
        catalog: &Catalog,
        candidates: &[&Product],
        applied: &AppliedFilters,
        reinserted: Option<ProductId>,
    ) -> Arc<SimilarityIndex> {
        match &self.cache {
            Some(cache) => {
                let key = CacheKey {
                    catalog_version: catalog.version(),
                    signature: FilterSignature {
                        filters: applied.clone(),
                        reinserted,
                    },
                };
                cache.get_or_build(key, || self.engine.build(candidates))
            }
            None => Arc::new(self.engine.build(candidates)),
        }
    }
}

/// Run the filter pipeline in its fixed order
pub fn filter_candidates<'a>(catalog: &'a Catalog, applied: &AppliedFilters) -> Vec<&'a Product> {
    let mut candidates = catalog.candidates();

    if let Some(keyword) = &applied.keyword {
        candidates = include_matching(&candidates, ProductField::Highlights, keyword);
    }
    if let Some(skin_type) = applied.skin_type {
        candidates = matching_skin_type(&candidates, skin_type);
    }
    if !applied.allergies.is_empty() {
        candidates = exclude_all(&candidates, ProductField::Ingredients, &applied.allergies);
    }
    candidates
}

/// One-off recommendation without caching
pub fn recommend(
    catalog: &Catalog,
    reference_id: &str,
    count: usize,
    options: &RecommendOptions,
    profile: &UserProfile,
) -> Result<Vec<ProductId>> {
    Recommender::new().recommend(catalog, reference_id, count, options, profile)
}
