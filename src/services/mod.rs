//! Service layer for business logic operations.
//!
//! Services coordinate between the client-side cache and the remote catalog.

mod product_service;

pub use product_service::{
    CatalogFetcher, MutationStatus, PRODUCTS_KEY, ProductService, ProductStore,
};
