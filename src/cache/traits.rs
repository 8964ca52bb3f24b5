//! Fetcher trait definition.

use async_trait::async_trait;

use crate::error::AppResult;

/// Source of authoritative values for the query store.
///
/// Implemented by the remote catalog client in production and by scripted
/// doubles in tests. A refetch scheduled by `invalidate` resolves through
/// this trait.
#[async_trait]
pub trait Fetcher<T>: Send + Sync {
    /// Fetch the current authoritative value for a cache key.
    async fn fetch(&self, key: &str) -> AppResult<T>;
}
