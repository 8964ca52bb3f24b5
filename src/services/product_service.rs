//! Product catalog service with optimistic create.
//!
//! A create runs through four ordered phases: validate, begin (snapshot and
//! speculative cache write), the remote call, and settle (invalidate and
//! background refetch). The speculative write is visible to readers before
//! the remote call is issued; a remote failure restores the snapshot
//! wholesale; settle runs on success and failure alike.

use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::{Mutex, watch};

use crate::cache::{Fetcher, QueryStore};
use crate::error::AppResult;
use crate::external::catalog::CatalogProvider;
use crate::models::{NewProduct, Product, ProductId, ProductPage};

/// Cache key under which the product list lives.
pub const PRODUCTS_KEY: &str = "products";

/// Store specialization used throughout the crate.
pub type ProductStore = QueryStore<ProductPage>;

/// Observable state of the most recent create invocation.
#[derive(Debug, Clone, Default, PartialEq)]
pub enum MutationStatus {
    #[default]
    Idle,
    Pending,
    Success {
        id: ProductId,
    },
    Error {
        message: String,
    },
}

impl std::fmt::Display for MutationStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            MutationStatus::Idle => write!(f, "idle"),
            MutationStatus::Pending => write!(f, "pending"),
            MutationStatus::Success { id } => write!(f, "success (id {id})"),
            MutationStatus::Error { message } => write!(f, "error: {message}"),
        }
    }
}

/// Ephemeral state owned by one in-flight optimistic create. Dropped once
/// the invocation settles.
struct MutationContext {
    snapshot: Option<ProductPage>,
    temporary_id: ProductId,
    started_at: jiff::Timestamp,
}

/// Bridges the catalog provider into the store's fetcher seam, so an
/// invalidate refetches the first page from the remote API.
pub struct CatalogFetcher {
    catalog: Arc<dyn CatalogProvider>,
    page_size: u64,
}

impl CatalogFetcher {
    pub fn new(catalog: Arc<dyn CatalogProvider>, page_size: u64) -> Self {
        Self { catalog, page_size }
    }
}

#[async_trait]
impl Fetcher<ProductPage> for CatalogFetcher {
    async fn fetch(&self, _key: &str) -> AppResult<ProductPage> {
        self.catalog.list_products(self.page_size, 0).await
    }
}

/// Drives reads and optimistic creates against the product cache.
#[derive(Clone)]
pub struct ProductService {
    store: ProductStore,
    catalog: Arc<dyn CatalogProvider>,
    page_size: u64,
    status: watch::Sender<MutationStatus>,
    // Serializes overlapping creates on the products key: a later submit
    // waits until the earlier one has settled, so a rollback can never
    // clobber another invocation's speculative insert.
    mutation_lock: Arc<Mutex<()>>,
}

impl ProductService {
    pub fn new(store: ProductStore, catalog: Arc<dyn CatalogProvider>, page_size: u64) -> Self {
        let (status, _) = watch::channel(MutationStatus::Idle);
        Self {
            store,
            catalog,
            page_size,
            status,
            mutation_lock: Arc::new(Mutex::new(())),
        }
    }

    pub fn store(&self) -> &ProductStore {
        &self.store
    }

    /// Receiver for the mutation status channel.
    pub fn status(&self) -> watch::Receiver<MutationStatus> {
        self.status.subscribe()
    }

    /// Read-through load of the first product page. Serves from the cache
    /// when the entry is present and not stale.
    pub async fn load_products(&self) -> AppResult<ProductPage> {
        if let Some(page) = self.store.get(PRODUCTS_KEY) {
            if !self.store.is_stale(PRODUCTS_KEY) {
                tracing::debug!(items = page.items.len(), "serving products from cache");
                return Ok(page);
            }
        }

        let page = self.catalog.list_products(self.page_size, 0).await?;
        self.store.replace(PRODUCTS_KEY, page.clone());
        Ok(page)
    }

    /// Fire-and-forget create. Progress is observed through
    /// [`ProductService::status`] and the store's revision channel, not a
    /// return value.
    pub fn submit(&self, input: NewProduct) {
        let service = self.clone();
        tokio::spawn(async move {
            if let Err(error) = service.create_product_optimistic(input).await {
                tracing::debug!(%error, "optimistic create did not persist");
            }
        });
    }

    /// Run one optimistic create to completion.
    pub async fn create_product_optimistic(&self, input: NewProduct) -> AppResult<Product> {
        // Phase 1: validate. Invalid input never touches the cache, the
        // status channel, or the remote API.
        input.validate_for_submit()?;

        let _guard = self.mutation_lock.lock().await;
        self.status.send_replace(MutationStatus::Pending);

        // Phase 2: snapshot and speculative write.
        let ctx = match self.begin(&input).await {
            Ok(ctx) => ctx,
            Err(error) => {
                self.status.send_replace(MutationStatus::Error {
                    message: error.to_string(),
                });
                return Err(error);
            }
        };

        // Phase 3: the remote call. A failure restores the snapshot
        // wholesale and is terminal for this invocation.
        let result = match self.catalog.create_product(&input).await {
            Ok(created) => {
                tracing::info!(id = %created.id, title = %created.title, "create confirmed by server");
                self.status.send_replace(MutationStatus::Success {
                    id: created.id.clone(),
                });
                Ok(created)
            }
            Err(error) => {
                self.rollback(&ctx);
                self.status.send_replace(MutationStatus::Error {
                    message: error.to_string(),
                });
                Err(error)
            }
        };

        // Phase 4: settle. Runs regardless of the remote outcome so the
        // server-authoritative list supersedes speculative and reverted
        // state alike.
        self.store.invalidate(PRODUCTS_KEY);
        if let Ok(elapsed) = jiff::Timestamp::now().since(ctx.started_at) {
            tracing::debug!(%elapsed, "mutation settled");
        }

        result
    }

    async fn begin(&self, input: &NewProduct) -> AppResult<MutationContext> {
        // A stale refresh completing after the speculative write would
        // silently undo it; cancellation must finish before the write.
        self.store.cancel_in_flight(PRODUCTS_KEY).await?;

        let snapshot = self.store.get(PRODUCTS_KEY);
        let temporary_id = ProductId::temporary();
        let placeholder = Product::placeholder(input, temporary_id.clone());

        let wrote = self.store.update(PRODUCTS_KEY, |current| {
            current.map(|mut page| {
                page.items.insert(0, placeholder);
                page.total += 1;
                page
            })
        });
        if wrote {
            tracing::debug!(%temporary_id, "speculative insert applied");
        } else {
            tracing::debug!("products never loaded; speculative insert skipped");
        }

        Ok(MutationContext {
            snapshot,
            temporary_id,
            started_at: jiff::Timestamp::now(),
        })
    }

    fn rollback(&self, ctx: &MutationContext) {
        tracing::warn!(temporary_id = %ctx.temporary_id, "rolling back speculative insert");
        self.store.restore(PRODUCTS_KEY, ctx.snapshot.clone());
    }
}
