//! Bounded memo of similarity indexes.
//!
//! An index depends only on the catalog snapshot and the candidate set the
//! filters produced, so it is keyed by the catalog version plus a
//! [`FilterSignature`]. Least recently used entries are evicted first.

use ahash::AHashMap;
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use skinmatch_core::{ProductId, SkinType};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use crate::engine::SimilarityIndex;

/// Filters actually applied to produce a candidate set
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct AppliedFilters {
    pub keyword: Option<String>,
    pub skin_type: Option<SkinType>,
    pub allergies: Vec<String>,
}

/// Everything besides the catalog that determines a candidate set
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct FilterSignature {
    pub filters: AppliedFilters,
    /// Reference that had to be put back in front of the filtered set
    pub reinserted: Option<ProductId>,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CacheKey {
    pub catalog_version: u64,
    pub signature: FilterSignature,
}

impl std::fmt::Display for CacheKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let filters = &self.signature.filters;
        write!(
            f,
            "v{}:kw={}:skin={}:allergies={}:ref={}",
            self.catalog_version,
            filters.keyword.as_deref().unwrap_or("-"),
            filters.skin_type.map(|s| s.as_str()).unwrap_or("-"),
            filters.allergies.join("|"),
            self.signature.reinserted.as_ref().map(ProductId::as_str).unwrap_or("-"),
        )
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct CacheStats {
    pub entries: usize,
    pub capacity: usize,
    pub hits: u64,
    pub misses: u64,
}

struct CacheInner {
    entries: AHashMap<CacheKey, (Arc<SimilarityIndex>, u64)>,
    tick: u64,
}

pub struct SimilarityCache {
    capacity: usize,
    inner: Mutex<CacheInner>,
    hits: AtomicU64,
    misses: AtomicU64,
}

impl SimilarityCache {
    /// A cache holding at most `capacity` indexes; 0 disables caching
    pub fn new(capacity: usize) -> Self {
        Self {
            capacity,
            inner: Mutex::new(CacheInner {
                entries: AHashMap::with_capacity(capacity),
                tick: 0,
            }),
            hits: AtomicU64::new(0),
            misses: AtomicU64::new(0),
        }
    }

    #[inline]
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn get(&self, key: &CacheKey) -> Option<Arc<SimilarityIndex>> {
        let mut inner = self.inner.lock();
        inner.tick += 1;
        let tick = inner.tick;
        inner.entries.get_mut(key).map(|(index, used)| {
            *used = tick;
            index.clone()
        })
    }

    pub fn insert(&self, key: CacheKey, index: Arc<SimilarityIndex>) {
        if self.capacity == 0 {
            return;
        }
        let mut inner = self.inner.lock();
        inner.tick += 1;
        let tick = inner.tick;

        if !inner.entries.contains_key(&key) && inner.entries.len() >= self.capacity {
            let oldest = inner
                .entries
                .iter()
                .min_by_key(|(_, (_, used))| *used)
                .map(|(k, _)| k.clone());
            if let Some(oldest) = oldest {
                tracing::debug!(key = %oldest, "Evicting similarity index");
                inner.entries.remove(&oldest);
            }
        }
        inner.entries.insert(key, (index, tick));
    }

    /// Cached index for `key`, building and storing it on a miss
    ///
    /// The lock is not held while building; two concurrent misses for the
    /// same key both build and the later insert wins.
    pub fn get_or_build<F>(&self, key: CacheKey, build: F) -> Arc<SimilarityIndex>
    where
        F: FnOnce() -> SimilarityIndex,
    {
        if let Some(index) = self.get(&key) {
            self.hits.fetch_add(1, Ordering::Relaxed);
            return index;
        }
        self.misses.fetch_add(1, Ordering::Relaxed);
        let index = Arc::new(build());
        self.insert(key, index.clone());
        index
    }

    /// Drop every entry built from a catalog older than `version`
    pub fn retain_version(&self, version: u64) {
        self.inner
            .lock()
            .entries
            .retain(|key, _| key.catalog_version >= version);
    }

    pub fn clear(&self) {
        self.inner.lock().entries.clear();
    }

    pub fn stats(&self) -> CacheStats {
        CacheStats {
            entries: self.inner.lock().entries.len(),
            capacity: self.capacity,
            hits: self.hits.load(Ordering::Relaxed),
            misses: self.misses.load(Ordering::Relaxed),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::SimilarityEngine;
    use skinmatch_core::Product;

    fn key(version: u64, keyword: &str) -> CacheKey {
        CacheKey {
            catalog_version: version,
            signature: FilterSignature {
                filters: AppliedFilters {
                    keyword: Some(keyword.to_string()),
                    ..Default::default()
                },
                reinserted: None,
            },
        }
    }

    fn index() -> SimilarityIndex {
        let products = vec![Product::new("A").with_highlights("vegan")];
        let refs: Vec<&Product> = products.iter().collect();
        SimilarityEngine::new().build(&refs)
    }

    #[test]
    fn test_hit_after_miss() {
        let cache = SimilarityCache::new(4);
        let mut builds = 0;
        let first = cache.get_or_build(key(1, "vegan"), || {
            builds += 1;
            index()
        });
        let second = cache.get_or_build(key(1, "vegan"), || {
            builds += 1;
            index()
        });
        assert_eq!(builds, 1);
        assert!(Arc::ptr_eq(&first, &second));

        let stats = cache.stats();
        assert_eq!((stats.hits, stats.misses, stats.entries), (1, 1, 1));
    }

    #[test]
    fn test_evicts_least_recently_used() {
        let cache = SimilarityCache::new(2);
        cache.insert(key(1, "a"), Arc::new(index()));
        cache.insert(key(1, "b"), Arc::new(index()));
        // Touch "a" so "b" becomes the oldest
        assert!(cache.get(&key(1, "a")).is_some());
        cache.insert(key(1, "c"), Arc::new(index()));

        assert!(cache.get(&key(1, "a")).is_some());
        assert!(cache.get(&key(1, "b")).is_none());
        assert!(cache.get(&key(1, "c")).is_some());
    }

    #[test]
    fn test_zero_capacity_never_stores() {
        let cache = SimilarityCache::new(0);
        cache.get_or_build(key(1, "a"), index);
        cache.get_or_build(key(1, "a"), index);
        let stats = cache.stats();
        assert_eq!((stats.hits, stats.misses, stats.entries), (0, 2, 0));
    }

    #[test]
    fn test_retain_version() {
        let cache = SimilarityCache::new(4);
        cache.insert(key(1, "a"), Arc::new(index()));
        cache.insert(key(2, "a"), Arc::new(index()));
        cache.retain_version(2);
        assert!(cache.get(&key(1, "a")).is_none());
        assert!(cache.get(&key(2, "a")).is_some());
    }

    #[test]
    fn test_key_display() {
        assert_eq!(key(3, "spf").to_string(), "v3:kw=spf:skin=-:allergies=:ref=-");
    }
}
