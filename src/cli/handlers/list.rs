//! Handler for the list command

use crate::config::Settings;
use crate::error::AppResult;
use crate::models::ProductPage;
use crate::state::AppState;

/// Lists the first page of catalog products.
pub struct ListCommandHandler {
    settings: Settings,
}

impl ListCommandHandler {
    pub fn new(settings: Settings) -> Self {
        Self { settings }
    }

    pub async fn execute(&self, limit: Option<u64>) -> AppResult<()> {
        let mut settings = self.settings.clone();
        if let Some(limit) = limit {
            settings.api.page_size = limit;
        }

        let state = AppState::new(settings);
        let page = state.products.load_products().await?;
        print_page(&page);

        Ok(())
    }
}

fn print_page(page: &ProductPage) {
    println!("{:>10}  {:>10}  TITLE", "ID", "PRICE");
    for product in &page.items {
        println!(
            "{:>10}  {:>10.2}  {}",
            product.id.to_string(),
            product.price,
            product.title
        );
    }
    println!(
        "\n{} of {} products (skip {})",
        page.items.len(),
        page.total,
        page.skip
    );
}
