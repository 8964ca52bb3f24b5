//! Key-addressed store of query results.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

use crate::cache::{CacheError, Fetcher};
use crate::error::AppResult;

/// Client-side cache of query results, keyed by a stable string identifier.
///
/// All mutations run as synchronous critical sections; no lock is ever held
/// across an await. Cloning the store is cheap and shares the same entries.
pub struct QueryStore<T> {
    inner: Arc<Inner<T>>,
}

impl<T> Clone for QueryStore<T> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

struct Entry<T> {
    value: T,
    stale: bool,
}

struct Refetch {
    id: u64,
    token: CancellationToken,
    // Attached right after spawn; None only within that window.
    handle: Option<JoinHandle<()>>,
}

struct Inner<T> {
    entries: Mutex<HashMap<String, Entry<T>>>,
    refetches: Mutex<HashMap<String, Refetch>>,
    fetcher: Arc<dyn Fetcher<T>>,
    revision: watch::Sender<u64>,
    next_refetch_id: AtomicU64,
}

impl<T> Inner<T> {
    // A poisoned lock only means another thread panicked mid-section; every
    // critical section here is a single map operation, so the map is intact.
    fn lock_entries(&self) -> MutexGuard<'_, HashMap<String, Entry<T>>> {
        self.entries.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn lock_refetches(&self) -> MutexGuard<'_, HashMap<String, Refetch>> {
        self.refetches
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }

    fn bump_revision(&self) {
        self.revision.send_modify(|rev| *rev += 1);
    }

    fn apply_fetched(&self, key: &str, value: T) {
        let mut entries = self.lock_entries();
        entries.insert(
            key.to_string(),
            Entry {
                value,
                stale: false,
            },
        );
        drop(entries);
        self.bump_revision();
    }

    fn finish_refetch(&self, key: &str, id: u64) {
        let mut refetches = self.lock_refetches();
        if refetches.get(key).is_some_and(|r| r.id == id) {
            refetches.remove(key);
        }
    }
}

impl<T> QueryStore<T>
where
    T: Clone + Send + Sync + 'static,
{
    pub fn new(fetcher: Arc<dyn Fetcher<T>>) -> Self {
        let (revision, _) = watch::channel(0);
        Self {
            inner: Arc::new(Inner {
                entries: Mutex::new(HashMap::new()),
                refetches: Mutex::new(HashMap::new()),
                fetcher,
                revision,
                next_refetch_id: AtomicU64::new(0),
            }),
        }
    }

    /// Current value for a key, or `None` if the key was never populated.
    pub fn get(&self, key: &str) -> Option<T> {
        self.inner.lock_entries().get(key).map(|e| e.value.clone())
    }

    /// Whether the entry is marked stale (a refetch has been scheduled but
    /// has not yet replaced it).
    pub fn is_stale(&self, key: &str) -> bool {
        self.inner
            .lock_entries()
            .get(key)
            .is_some_and(|e| e.stale)
    }

    /// Watch channel bumped on every committed write, for UI-layer
    /// observation. Receivers read the store via [`QueryStore::get`].
    pub fn subscribe(&self) -> watch::Receiver<u64> {
        self.inner.revision.subscribe()
    }

    /// Atomic read-modify-write. The updater sees the current value (or
    /// `None` for a never-populated key); returning `None` leaves the store
    /// untouched, guarding against updating a key that was never loaded.
    ///
    /// Returns whether a write happened. The write is visible to any
    /// concurrent reader as soon as this call returns.
    pub fn update(&self, key: &str, updater: impl FnOnce(Option<T>) -> Option<T>) -> bool {
        let mut entries = self.inner.lock_entries();
        let current = entries.get(key).map(|e| e.value.clone());
        let was_stale = entries.get(key).is_some_and(|e| e.stale);
        match updater(current) {
            Some(next) => {
                entries.insert(
                    key.to_string(),
                    Entry {
                        value: next,
                        stale: was_stale,
                    },
                );
                drop(entries);
                self.inner.bump_revision();
                true
            }
            None => false,
        }
    }

    /// Wholesale replace of an entry with a fresh value.
    pub fn replace(&self, key: &str, value: T) {
        self.inner.apply_fetched(key, value);
    }

    /// Restore a key to a previously captured snapshot, wholesale. A `None`
    /// snapshot means the key was unpopulated at capture time and removes
    /// the entry. Idempotent for a fixed snapshot.
    pub fn restore(&self, key: &str, snapshot: Option<T>) {
        let mut entries = self.inner.lock_entries();
        match snapshot {
            Some(value) => {
                entries.insert(
                    key.to_string(),
                    Entry {
                        value,
                        stale: false,
                    },
                );
            }
            None => {
                entries.remove(key);
            }
        }
        drop(entries);
        self.inner.bump_revision();
    }

    /// Mark the entry stale and schedule a background refetch through the
    /// store's fetcher. On completion the fetched value atomically replaces
    /// the entry; the most recently completed fetch wins. A refetch already
    /// in flight for the key is cancelled first.
    pub fn invalidate(&self, key: &str) {
        {
            let mut entries = self.inner.lock_entries();
            if let Some(entry) = entries.get_mut(key) {
                entry.stale = true;
            }
        }
        self.inner.bump_revision();

        let id = self.inner.next_refetch_id.fetch_add(1, Ordering::Relaxed);
        let token = CancellationToken::new();
        let child = token.clone();
        let inner = Arc::clone(&self.inner);
        let owned_key = key.to_string();

        // Register before spawning so a fast-completing task always finds
        // its own entry to clean up.
        let previous = {
            let mut refetches = self.inner.lock_refetches();
            refetches.insert(
                key.to_string(),
                Refetch {
                    id,
                    token,
                    handle: None,
                },
            )
        };
        if let Some(previous) = previous {
            previous.token.cancel();
            if let Some(handle) = previous.handle {
                handle.abort();
            }
        }

        let handle = tokio::spawn(async move {
            let outcome = tokio::select! {
                _ = child.cancelled() => None,
                result = inner.fetcher.fetch(&owned_key) => Some(result),
            };

            match outcome {
                Some(Ok(value)) if !child.is_cancelled() => {
                    tracing::debug!(key = %owned_key, "refetch complete, cache entry replaced");
                    inner.apply_fetched(&owned_key, value);
                }
                Some(Err(error)) => {
                    // Entry stays stale; the next invalidate retries.
                    tracing::warn!(key = %owned_key, %error, "background refetch failed");
                }
                _ => {
                    tracing::debug!(key = %owned_key, "refetch cancelled, result discarded");
                }
            }

            inner.finish_refetch(&owned_key, id);
        });

        let mut refetches = self.inner.lock_refetches();
        match refetches.get_mut(key) {
            Some(refetch) if refetch.id == id => refetch.handle = Some(handle),
            // Superseded or already finished while unregistered.
            _ => handle.abort(),
        }
    }

    /// Best-effort cancellation of any pending refetch for the key, observed
    /// to completion before returning. The underlying remote request may
    /// still run; its result is discarded.
    pub async fn cancel_in_flight(&self, key: &str) -> AppResult<()> {
        let refetch = self.inner.lock_refetches().remove(key);

        let Some(refetch) = refetch else {
            return Ok(());
        };

        refetch.token.cancel();
        let Some(handle) = refetch.handle else {
            return Ok(());
        };
        handle.abort();

        match handle.await {
            Ok(()) => Ok(()),
            Err(join_error) if join_error.is_cancelled() => Ok(()),
            Err(join_error) => Err(CacheError::Cancellation {
                key: key.to_string(),
                message: join_error.to_string(),
            }
            .into()),
        }
    }

    /// Number of refetches currently tracked as in flight.
    pub fn in_flight_refetches(&self) -> usize {
        self.inner.lock_refetches().len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use std::collections::VecDeque;
    use std::time::Duration;
    use tokio::sync::Notify;
    use tokio::time::timeout;

    /// Fetcher releasing one scripted value per `release` call.
    struct GatedFetcher {
        values: Mutex<VecDeque<String>>,
        gate: Arc<Notify>,
    }

    impl GatedFetcher {
        fn new(values: Vec<&str>) -> (Arc<Self>, Arc<Notify>) {
            let gate = Arc::new(Notify::new());
            let fetcher = Arc::new(Self {
                values: Mutex::new(values.into_iter().map(String::from).collect()),
                gate: Arc::clone(&gate),
            });
            (fetcher, gate)
        }
    }

    #[async_trait]
    impl Fetcher<String> for GatedFetcher {
        async fn fetch(&self, _key: &str) -> AppResult<String> {
            self.gate.notified().await;
            let value = self
                .values
                .lock()
                .unwrap()
                .pop_front()
                .unwrap_or_else(|| "exhausted".to_string());
            Ok(value)
        }
    }

    fn store_with(values: Vec<&str>) -> (QueryStore<String>, Arc<Notify>) {
        let (fetcher, gate) = GatedFetcher::new(values);
        (QueryStore::new(fetcher), gate)
    }

    async fn wait_for(store: &QueryStore<String>, key: &str, expected: &str) {
        let mut rx = store.subscribe();
        timeout(Duration::from_secs(1), async {
            while store.get(key).as_deref() != Some(expected) {
                rx.changed().await.unwrap();
            }
        })
        .await
        .expect("store never reached expected value");
    }

    #[tokio::test]
    async fn test_update_on_missing_key_is_noop() {
        let (store, _gate) = store_with(vec![]);
        let wrote = store.update("products", |old| old.map(|v| v + "!"));
        assert!(!wrote);
        assert_eq!(store.get("products"), None);
    }

    #[tokio::test]
    async fn test_update_is_visible_immediately_and_bumps_revision() {
        let (store, _gate) = store_with(vec![]);
        let rx = store.subscribe();
        let before = *rx.borrow();

        store.replace("products", "a".to_string());
        let wrote = store.update("products", |old| old.map(|v| v + "b"));

        assert!(wrote);
        assert_eq!(store.get("products").as_deref(), Some("ab"));
        assert!(*rx.borrow() > before);
    }

    #[tokio::test]
    async fn test_invalidate_marks_stale_then_refetch_replaces() {
        let (store, gate) = store_with(vec!["fresh"]);
        store.replace("products", "old".to_string());

        store.invalidate("products");
        assert!(store.is_stale("products"));
        assert_eq!(store.get("products").as_deref(), Some("old"));

        gate.notify_one();
        wait_for(&store, "products", "fresh").await;
        assert!(!store.is_stale("products"));
    }

    #[tokio::test]
    async fn test_cancel_in_flight_discards_pending_fetch() {
        let (store, gate) = store_with(vec!["should-be-discarded"]);
        store.replace("products", "kept".to_string());

        store.invalidate("products");
        assert_eq!(store.in_flight_refetches(), 1);

        store.cancel_in_flight("products").await.unwrap();
        assert_eq!(store.in_flight_refetches(), 0);

        // Releasing the gate now must not resurrect the cancelled fetch.
        gate.notify_one();
        tokio::task::yield_now().await;
        assert_eq!(store.get("products").as_deref(), Some("kept"));
    }

    #[tokio::test]
    async fn test_cancel_with_nothing_in_flight_is_ok() {
        let (store, _gate) = store_with(vec![]);
        store.cancel_in_flight("products").await.unwrap();
    }

    #[tokio::test]
    async fn test_newer_invalidate_supersedes_older_refetch() {
        let (store, gate) = store_with(vec!["first", "second"]);
        store.replace("products", "old".to_string());

        store.invalidate("products");
        store.invalidate("products");

        // Only the second refetch is still live; the permit goes to it.
        gate.notify_one();
        gate.notify_one();

        wait_for(&store, "products", "first").await;
        assert!(!store.is_stale("products"));
    }

    #[tokio::test]
    async fn test_restore_with_none_removes_entry() {
        let (store, _gate) = store_with(vec![]);
        store.replace("products", "value".to_string());

        store.restore("products", None);
        assert_eq!(store.get("products"), None);

        // Idempotent: restoring the same snapshot again changes nothing.
        store.restore("products", None);
        assert_eq!(store.get("products"), None);
    }

    #[tokio::test]
    async fn test_restore_is_idempotent_for_value_snapshots() {
        let (store, _gate) = store_with(vec![]);
        store.replace("products", "speculative".to_string());

        let snapshot = Some("snapshot".to_string());
        store.restore("products", snapshot.clone());
        let after_once = store.get("products");
        store.restore("products", snapshot);
        assert_eq!(store.get("products"), after_once);
    }
}
