use chrono::{DateTime, Utc};
use parking_lot::RwLock;
use serde::Serialize;
use skinmatch_core::{Catalog, Error, Product, Result};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::loader::read_products;

/// Summary of the snapshot currently served
#[derive(Debug, Clone, Serialize)]
pub struct CatalogInfo {
    pub version: u64,
    pub products: usize,
    pub loaded_at: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source: Option<PathBuf>,
}

/// Holds the current catalog snapshot
///
/// Readers take an `Arc<Catalog>` and keep using it for the whole request;
/// replacing the catalog only swaps the pointer, so in-flight requests are
/// never affected.
pub struct CatalogStore {
    current: RwLock<(Arc<Catalog>, DateTime<Utc>)>,
    source: Option<PathBuf>,
}

impl CatalogStore {
    /// Store serving `products` as version 1
    pub fn new(products: Vec<Product>) -> Result<Self> {
        let catalog = Catalog::new(1, products)?;
        Ok(Self {
            current: RwLock::new((Arc::new(catalog), Utc::now())),
            source: None,
        })
    }

    /// Store backed by a JSON catalog file, loaded immediately
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        let mut store = Self::new(read_products(&path)?)?;
        store.source = Some(path);
        Ok(store)
    }

    pub fn snapshot(&self) -> Arc<Catalog> {
        self.current.read().0.clone()
    }

    pub fn info(&self) -> CatalogInfo {
        let current = self.current.read();
        CatalogInfo {
            version: current.0.version(),
            products: current.0.len(),
            loaded_at: current.1,
            source: self.source.clone(),
        }
    }

    /// Swap in a new product set under the next version
    ///
    /// The version is taken and the snapshot swapped under one write lock, so
    /// the served version only ever increases. A rejected product set does
    /// not consume a version.
    pub fn replace(&self, products: Vec<Product>) -> Result<Arc<Catalog>> {
        let mut current = self.current.write();
        let version = current.0.version() + 1;
        let catalog = Arc::new(Catalog::new(version, products)?);
        *current = (catalog.clone(), Utc::now());
        drop(current);

        tracing::info!(version, products = catalog.len(), "Catalog replaced");
        Ok(catalog)
    }

    /// Re-read the backing file; the old snapshot stays in place on failure
    pub fn reload(&self) -> Result<Arc<Catalog>> {
        let path = self
            .source
            .as_ref()
            .ok_or_else(|| Error::InvalidConfig("catalog store has no backing file".to_string()))?;
        self.replace(read_products(path)?)
    }
}
