pub mod loader;
pub mod store;

pub use loader::{load_catalog, parse_catalog, read_products};
pub use store::{CatalogInfo, CatalogStore};
