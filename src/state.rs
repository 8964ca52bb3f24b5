//! Application state shared by the CLI handlers.
//!
//! The store and the catalog provider are constructed once here and passed
//! down explicitly; nothing in the crate reaches for a global store.

use std::sync::Arc;

use crate::cache::QueryStore;
use crate::config::Settings;
use crate::external::catalog::{CatalogProvider, DummyJsonCatalog};
use crate::services::{CatalogFetcher, ProductService, ProductStore};

/// Application state containing all shared services and resources.
///
/// Cloning is cheap; the store and service share their state through `Arc`
/// internally.
#[derive(Clone)]
pub struct AppState {
    pub settings: Settings,
    pub store: ProductStore,
    pub products: ProductService,
}

impl AppState {
    /// Build the state against the configured remote catalog.
    pub fn new(settings: Settings) -> Self {
        let catalog: Arc<dyn CatalogProvider> = Arc::new(DummyJsonCatalog::new(&settings.api));
        Self::with_catalog(settings, catalog)
    }

    /// Build the state around a specific provider. Used by the demo's
    /// failure mode and by tests.
    pub fn with_catalog(settings: Settings, catalog: Arc<dyn CatalogProvider>) -> Self {
        let fetcher = Arc::new(CatalogFetcher::new(
            Arc::clone(&catalog),
            settings.api.page_size,
        ));
        let store: ProductStore = QueryStore::new(fetcher);
        let products = ProductService::new(store.clone(), catalog, settings.api.page_size);
        Self {
            settings,
            store,
            products,
        }
    }
}
