use serde::{Deserialize, Serialize};

use crate::models::{Product, ProductId, ProductPage};

/// Response body of the catalog list endpoint.
#[derive(Debug, Deserialize)]
pub struct ProductListResponse {
    pub products: Vec<WireProduct>,
    pub total: u64,
    pub skip: u64,
    pub limit: u64,
}

/// A product as the remote API serializes it. Ids on the wire are always
/// server-assigned integers.
#[derive(Debug, Deserialize)]
pub struct WireProduct {
    pub id: u64,
    pub title: String,
    pub price: f64,
    #[serde(default)]
    pub thumbnail: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub images: Option<Vec<String>>,
}

impl From<WireProduct> for Product {
    fn from(wire: WireProduct) -> Self {
        Product {
            id: ProductId::Persisted(wire.id),
            title: wire.title,
            price: wire.price,
            thumbnail: wire.thumbnail,
            description: wire.description,
            images: wire.images,
        }
    }
}

impl From<ProductListResponse> for ProductPage {
    fn from(response: ProductListResponse) -> Self {
        ProductPage {
            items: response.products.into_iter().map(Product::from).collect(),
            total: response.total,
            skip: response.skip,
            limit: response.limit,
        }
    }
}

/// Request body of the catalog create endpoint.
#[derive(Debug, Serialize)]
pub struct CreateProductRequest<'a> {
    pub title: &'a str,
    pub price: f64,
}
