//! Handler for the demo command
//!
//! Walks the optimistic update lifecycle end to end, printing the cache
//! state at each phase boundary so the speculative window, the rollback,
//! and the reconciliation are all observable from a terminal.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::watch;

use crate::cli::parser::DemoMode;
use crate::config::Settings;
use crate::error::{AppError, AppResult};
use crate::external::catalog::{CatalogProvider, DummyJsonCatalog};
use crate::models::{NewProduct, Product, ProductPage};
use crate::services::{MutationStatus, PRODUCTS_KEY};
use crate::state::AppState;

const DEMO_TITLE: &str = "Vitrine demo product";
const DEMO_PRICE: f64 = 19.90;

/// Minimum latency for the slow mode, so the speculative window is long
/// enough to read.
const SLOW_MODE_LATENCY_MS: u64 = 1500;

/// Provider decorator that lets reads through but rejects every create,
/// making the rollback path observable.
struct RejectingCreates {
    inner: DummyJsonCatalog,
}

#[async_trait]
impl CatalogProvider for RejectingCreates {
    async fn list_products(&self, limit: u64, skip: u64) -> AppResult<ProductPage> {
        self.inner.list_products(limit, skip).await
    }

    async fn create_product(&self, _input: &NewProduct) -> AppResult<Product> {
        // Keep a little latency so the speculative window stays visible.
        tokio::time::sleep(Duration::from_millis(400)).await;
        Err(AppError::external_api(
            "/products/add",
            "create rejected (demo failure mode)",
        ))
    }
}

/// Runs the step-by-step optimistic update walkthrough.
pub struct DemoCommandHandler {
    settings: Settings,
}

impl DemoCommandHandler {
    pub fn new(settings: Settings) -> Self {
        Self { settings }
    }

    pub async fn execute(&self, mode: DemoMode) -> AppResult<()> {
        let mut settings = self.settings.clone();
        if mode == DemoMode::Slow && settings.api.simulated_latency_ms < SLOW_MODE_LATENCY_MS {
            settings.api.simulated_latency_ms = SLOW_MODE_LATENCY_MS;
        }

        let state = match mode {
            DemoMode::Error => {
                let catalog = RejectingCreates {
                    inner: DummyJsonCatalog::new(&settings.api),
                };
                AppState::with_catalog(settings, Arc::new(catalog))
            }
            _ => AppState::new(settings),
        };

        println!("== Phase 0: prime the cache");
        let before = state.products.load_products().await?;
        println!(
            "   {} products cached (server total {})",
            before.items.len(),
            before.total
        );

        println!("== Phases 1-2: submit, snapshot, apply speculatively");
        let mut status = state.products.status();
        state
            .products
            .submit(NewProduct::new(DEMO_TITLE, DEMO_PRICE));

        wait_for_status(&mut status, |s| *s == MutationStatus::Pending).await?;
        if let Some(page) = state.store.get(PRODUCTS_KEY) {
            println!("   cache now holds {} items", page.items.len());
            if let Some(head) = page.items.first() {
                println!("   head of list: [{}] {}", head.id, head.title);
            }
        }

        println!("== Phase 3: waiting for the server");
        wait_for_status(&mut status, |s| {
            matches!(
                s,
                MutationStatus::Success { .. } | MutationStatus::Error { .. }
            )
        })
        .await?;
        match &*status.borrow() {
            MutationStatus::Success { id } => {
                println!("   server confirmed; assigned id {id}");
            }
            MutationStatus::Error { message } => {
                println!("   create failed: {message}");
                println!("   cache rolled back to the pre-submit snapshot");
            }
            _ => {}
        }

        println!("== Phase 4: settle (refetch the authoritative list)");
        super::wait_for_settle(&state.store).await;
        if let Some(page) = state.store.get(PRODUCTS_KEY) {
            println!(
                "   {} products cached after reconciliation",
                page.items.len()
            );
            if let Some(head) = page.items.first() {
                println!("   head of list: [{}] {}", head.id, head.title);
            }
        }

        Ok(())
    }
}

async fn wait_for_status(
    rx: &mut watch::Receiver<MutationStatus>,
    pred: impl FnMut(&MutationStatus) -> bool,
) -> AppResult<()> {
    tokio::time::timeout(Duration::from_secs(30), rx.wait_for(pred))
        .await
        .map_err(|_| AppError::Internal {
            source: anyhow::anyhow!("timed out waiting for mutation status"),
        })?
        .map_err(|e| AppError::Internal { source: e.into() })?;
    Ok(())
}
