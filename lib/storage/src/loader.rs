// Catalog file loading
use skinmatch_core::{Catalog, Error, Product, Result};
use std::fs::File;
use std::io::BufReader;
use std::path::Path;

/// Read a JSON array of product objects into a catalog snapshot
pub fn load_catalog<P: AsRef<Path>>(path: P, version: u64) -> Result<Catalog> {
    let products = read_products(path)?;
    Catalog::new(version, products)
}

pub fn read_products<P: AsRef<Path>>(path: P) -> Result<Vec<Product>> {
    let path = path.as_ref();
    let file = File::open(path)?;
    let products: Vec<Product> = serde_json::from_reader(BufReader::new(file))
        .map_err(|e| Error::Serialization(format!("{}: {}", path.display(), e)))?;
    tracing::info!(path = %path.display(), products = products.len(), "Read catalog file");
    Ok(products)
}

/// Parse a catalog from an in-memory JSON document
pub fn parse_catalog(json: &str, version: u64) -> Result<Catalog> {
    let products: Vec<Product> = serde_json::from_str(json)?;
    Catalog::new(version, products)
}
