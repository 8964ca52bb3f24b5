//! Remote product catalog API.
//!
//! The catalog is an external service; this module owns nothing beyond the
//! client for it. [`CatalogProvider`] is the seam the rest of the crate
//! depends on, so tests can drive the optimistic flow with scripted doubles.

mod dummyjson;
mod provider;
mod types;

pub use dummyjson::DummyJsonCatalog;
pub use provider::CatalogProvider;
pub use types::{CreateProductRequest, ProductListResponse, WireProduct};
