use std::time::Duration;

use async_trait::async_trait;

use crate::config::settings::ApiConfig;
use crate::error::{AppError, AppResult};
use crate::external::catalog::provider::CatalogProvider;
use crate::external::catalog::types::{CreateProductRequest, ProductListResponse, WireProduct};
use crate::external::client::HTTP_CLIENT;
use crate::models::{NewProduct, Product, ProductPage};

const LIST_PATH: &str = "/products";
const CREATE_PATH: &str = "/products/add";

/// Client for a DummyJSON-style product catalog API.
pub struct DummyJsonCatalog {
    base_url: String,
    simulated_latency: Option<Duration>,
}

impl DummyJsonCatalog {
    pub fn new(config: &ApiConfig) -> Self {
        Self {
            base_url: config.base_url.trim_end_matches('/').to_string(),
            simulated_latency: (config.simulated_latency_ms > 0)
                .then(|| Duration::from_millis(config.simulated_latency_ms)),
        }
    }

    fn make_error(
        endpoint: &str,
        message: impl Into<String>,
        source: Option<anyhow::Error>,
    ) -> AppError {
        AppError::ExternalApi {
            endpoint: endpoint.to_string(),
            message: message.into(),
            source,
        }
    }

    /// Artificial delay making the optimistic window observable in demos.
    async fn pause(&self) {
        if let Some(latency) = self.simulated_latency {
            tokio::time::sleep(latency).await;
        }
    }
}

#[async_trait]
impl CatalogProvider for DummyJsonCatalog {
    async fn list_products(&self, limit: u64, skip: u64) -> AppResult<ProductPage> {
        let url = format!("{}{}?limit={}&skip={}", self.base_url, LIST_PATH, limit, skip);
        self.pause().await;

        let resp = HTTP_CLIENT
            .get(&url)
            .send()
            .await
            .map_err(|e: reqwest::Error| {
                Self::make_error(
                    LIST_PATH,
                    format!("list_products request failed: {}", e),
                    Some(e.into()),
                )
            })?
            .error_for_status()
            .map_err(|e: reqwest::Error| {
                Self::make_error(
                    LIST_PATH,
                    format!("list_products HTTP error: {}", e),
                    Some(e.into()),
                )
            })?;

        let data: ProductListResponse = resp.json().await.map_err(|e: reqwest::Error| {
            Self::make_error(
                LIST_PATH,
                format!("list_products invalid JSON: {}", e),
                Some(e.into()),
            )
        })?;

        Ok(data.into())
    }

    async fn create_product(&self, input: &NewProduct) -> AppResult<Product> {
        let url = format!("{}{}", self.base_url, CREATE_PATH);
        let body = CreateProductRequest {
            title: input.title.trim(),
            price: input.price,
        };
        self.pause().await;

        let resp = HTTP_CLIENT
            .post(&url)
            .json(&body)
            .send()
            .await
            .map_err(|e: reqwest::Error| {
                Self::make_error(
                    CREATE_PATH,
                    format!("create_product request failed: {}", e),
                    Some(e.into()),
                )
            })?
            .error_for_status()
            .map_err(|e: reqwest::Error| {
                Self::make_error(
                    CREATE_PATH,
                    format!("create_product HTTP error: {}", e),
                    Some(e.into()),
                )
            })?;

        let wire: WireProduct = resp.json().await.map_err(|e: reqwest::Error| {
            Self::make_error(
                CREATE_PATH,
                format!("create_product invalid JSON: {}", e),
                Some(e.into()),
            )
        })?;

        Ok(wire.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn api_config(base_url: &str, latency_ms: u64) -> ApiConfig {
        ApiConfig {
            base_url: base_url.to_string(),
            page_size: 30,
            simulated_latency_ms: latency_ms,
        }
    }

    #[test]
    fn test_base_url_trailing_slash_is_trimmed() {
        let catalog = DummyJsonCatalog::new(&api_config("https://dummyjson.com/", 0));
        assert_eq!(catalog.base_url, "https://dummyjson.com");
    }

    #[test]
    fn test_zero_latency_means_no_pause() {
        let catalog = DummyJsonCatalog::new(&api_config("https://dummyjson.com", 0));
        assert!(catalog.simulated_latency.is_none());

        let catalog = DummyJsonCatalog::new(&api_config("https://dummyjson.com", 250));
        assert_eq!(
            catalog.simulated_latency,
            Some(Duration::from_millis(250))
        );
    }

    #[test]
    fn test_make_error_carries_endpoint() {
        let err = DummyJsonCatalog::make_error(CREATE_PATH, "HTTP 500", None);
        match err {
            AppError::ExternalApi {
                endpoint,
                message,
                source,
            } => {
                assert_eq!(endpoint, "/products/add");
                assert_eq!(message, "HTTP 500");
                assert!(source.is_none());
            }
            other => panic!("Expected ExternalApi error, got {other:?}"),
        }
    }
}
