//! Handler for the create command

use crate::config::Settings;
use crate::error::AppResult;
use crate::models::NewProduct;
use crate::services::PRODUCTS_KEY;
use crate::state::AppState;

/// Creates a product through the optimistic mutation flow.
pub struct CreateCommandHandler {
    settings: Settings,
}

impl CreateCommandHandler {
    pub fn new(settings: Settings) -> Self {
        Self { settings }
    }

    pub async fn execute(&self, title: String, price: f64) -> AppResult<()> {
        let state = AppState::new(self.settings.clone());

        // Prime the cache so the speculative insert has a page to land in.
        let before = state.products.load_products().await?;
        println!("Cached products before create: {}", before.items.len());

        let created = state
            .products
            .create_product_optimistic(NewProduct::new(title, price))
            .await?;
        println!(
            "Server confirmed \"{}\" with id {}",
            created.title, created.id
        );

        super::wait_for_settle(&state.store).await;
        if let Some(after) = state.store.get(PRODUCTS_KEY) {
            println!("Cached products after settle: {}", after.items.len());
        }

        Ok(())
    }
}
