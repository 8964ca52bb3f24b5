use async_trait::async_trait;

use crate::error::AppResult;
use crate::models::{NewProduct, Product, ProductPage};

/// Remote product catalog operations.
///
/// Both calls are opaque asynchronous operations that can succeed, return a
/// non-success status, or fail outright.
#[async_trait]
pub trait CatalogProvider: Send + Sync {
    /// List one page of products.
    async fn list_products(&self, limit: u64, skip: u64) -> AppResult<ProductPage>;

    /// Create a product. The server assigns the persisted id.
    async fn create_product(&self, input: &NewProduct) -> AppResult<Product>;
}
