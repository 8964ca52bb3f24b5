//! Command handlers for CLI operations.

mod create;
mod demo;
mod list;

pub use create::CreateCommandHandler;
pub use demo::DemoCommandHandler;
pub use list::ListCommandHandler;

use std::time::Duration;

use crate::services::{PRODUCTS_KEY, ProductStore};

/// Wait until the settle refetch has replaced the stale entry, bounded so a
/// dead network cannot hang the CLI.
pub(crate) async fn wait_for_settle(store: &ProductStore) {
    let mut rx = store.subscribe();
    let wait = async {
        while store.is_stale(PRODUCTS_KEY) || store.in_flight_refetches() > 0 {
            if rx.changed().await.is_err() {
                break;
            }
        }
    };

    if tokio::time::timeout(Duration::from_secs(10), wait)
        .await
        .is_err()
    {
        tracing::warn!("timed out waiting for the settle refetch");
    }
}
