//! Domain models for the product catalog client.

mod product;

pub use product::{NewProduct, Product, ProductId, ProductPage, PLACEHOLDER_THUMBNAIL};
