//! Document cache with single-flight fetch coalescing

use crate::handle::DocumentHandle;
use crate::source::DocumentSource;
use crate::store::{Store, StoredEntry};
use crate::types::{CacheConfig, CacheEntry, CacheStats};
use chrono::Utc;
use document_fetcher::DocumentFetcher;
use futures::future::{BoxFuture, FutureExt, Shared};
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tokio::sync::{Mutex, RwLock};
use tracing::{debug, warn};

/// One in-flight fetch, shared by every caller waiting on the same key
type SharedFetch = Shared<BoxFuture<'static, Option<DocumentHandle>>>;

/// Result of resolving a key
#[derive(Debug, Clone)]
pub enum ResolvedDocument {
    /// A locally cached payload
    Handle(DocumentHandle),
    /// The fetch failed; the original URL, for direct access by the caller
    Remote(String),
}

impl ResolvedDocument {
    pub fn handle(&self) -> Option<&DocumentHandle> {
        match self {
            ResolvedDocument::Handle(handle) => Some(handle),
            ResolvedDocument::Remote(_) => None,
        }
    }

    pub fn is_remote(&self) -> bool {
        matches!(self, ResolvedDocument::Remote(_))
    }
}

struct CacheInner {
    store: RwLock<Store>,
    inflight: Mutex<HashMap<String, SharedFetch>>,
    source: Arc<dyn DocumentSource>,
    ttl: chrono::Duration,
    max_entries: usize,
    hits: AtomicU64,
    misses: AtomicU64,
}

/// An in-memory cache of fetched documents behind revocable handles
///
/// Bounded to `max_entries`; when full, inserting a new key evicts the
/// entry with the oldest insertion time. Entries older than the TTL are
/// treated as absent on every lookup and reclaimed by [`sweep_expired`].
/// Cloning shares the same cache.
///
/// [`sweep_expired`]: DocumentCache::sweep_expired
#[derive(Clone)]
pub struct DocumentCache {
    inner: Arc<CacheInner>,
}

impl DocumentCache {
    /// Create a cache over the given document source
    pub fn new(config: CacheConfig, source: Arc<dyn DocumentSource>) -> Self {
        let ttl = chrono::Duration::from_std(config.ttl).unwrap_or(chrono::TimeDelta::MAX);
        let max_entries = config.max_entries.max(1);

        Self {
            inner: Arc::new(CacheInner {
                store: RwLock::new(Store::new(max_entries)),
                inflight: Mutex::new(HashMap::new()),
                source,
                ttl,
                max_entries,
                hits: AtomicU64::new(0),
                misses: AtomicU64::new(0),
            }),
        }
    }

    /// Create a cache that fetches over HTTP with a default fetcher
    pub fn with_fetcher(config: CacheConfig) -> Self {
        Self::new(config, Arc::new(DocumentFetcher::new()))
    }

    /// Resolve a key to a displayable resource
    ///
    /// A fresh cached entry is returned immediately. Otherwise the payload
    /// is fetched from the source and cached; concurrent resolutions of the
    /// same key share one fetch. On fetch failure the original URL is
    /// returned so the caller can fall back to direct access; the caller
    /// never sees an error.
    pub async fn resolve(
        &self,
        key: &str,
        display_name: &str,
        content_type: &str,
    ) -> ResolvedDocument {
        if let Some(handle) = self.inner.fresh_handle(key).await {
            self.inner.hits.fetch_add(1, Ordering::Relaxed);
            debug!(key = %key, "Cache hit");
            return ResolvedDocument::Handle(handle);
        }
        let fetch = {
            let mut inflight = self.inner.inflight.lock().await;

            // A fetch for this key may have settled between the freshness
            // check above and taking the in-flight lock
            if let Some(handle) = self.inner.fresh_handle(key).await {
                self.inner.hits.fetch_add(1, Ordering::Relaxed);
                debug!(key = %key, "Cache hit");
                return ResolvedDocument::Handle(handle);
            }
            self.inner.misses.fetch_add(1, Ordering::Relaxed);
            debug!(key = %key, "Cache miss");

            match inflight.get(key) {
                Some(existing) => existing.clone(),
                None => {
                    let inner = Arc::clone(&self.inner);
                    let fetch_key = key.to_string();
                    let display_name = display_name.to_string();
                    let content_type = content_type.to_string();

                    // Spawned so the retrieval settles and the store is
                    // updated even if every waiting caller goes away
                    let task = tokio::spawn(async move {
                        inner
                            .fetch_and_store(fetch_key, display_name, content_type)
                            .await
                    });

                    let fetch = async move { task.await.unwrap_or(None) }.boxed().shared();
                    inflight.insert(key.to_string(), fetch.clone());
                    fetch
                }
            }
        };

        match fetch.await {
            Some(handle) => ResolvedDocument::Handle(handle),
            None => ResolvedDocument::Remote(key.to_string()),
        }
    }

    /// Look up a fresh entry without fetching
    ///
    /// Stale entries are reported absent but left in place for the sweeper.
    pub async fn peek(&self, key: &str) -> Option<CacheEntry> {
        let store = self.inner.store.read().await;
        store
            .get(key)
            .filter(|e| Utc::now() - e.created_at < self.inner.ttl)
            .map(|e| e.to_entry())
    }

    /// Whether a fresh entry exists for the key
    pub async fn is_cached(&self, key: &str) -> bool {
        self.peek(key).await.is_some()
    }

    /// Remove every entry whose age has reached the TTL, revoking handles
    ///
    /// Lookups already treat stale entries as absent; this reclaims them.
    /// Meant to be driven by an external scheduler, the cache runs no
    /// timer of its own.
    pub async fn sweep_expired(&self) {
        let mut store = self.inner.store.write().await;
        let stale = store.keys_older_than(Utc::now(), self.inner.ttl);
        let count = stale.len();

        for key in stale {
            store.remove(&key);
        }

        if count > 0 {
            debug!(count, "Swept expired cache entries");
        }
    }

    /// Revoke every handle and empty the cache
    pub async fn clear_all(&self) {
        let mut store = self.inner.store.write().await;
        let count = store.len();
        store.clear();
        debug!(count, "Cleared document cache");
    }

    /// Current cache statistics
    pub async fn stats(&self) -> CacheStats {
        let store = self.inner.store.read().await;
        CacheStats {
            size: store.len(),
            max_size: self.inner.max_entries,
            hits: self.inner.hits.load(Ordering::Relaxed),
            misses: self.inner.misses.load(Ordering::Relaxed),
        }
    }
}

impl CacheInner {
    /// Clone the handle of a fresh entry, if one exists
    async fn fresh_handle(&self, key: &str) -> Option<DocumentHandle> {
        let store = self.store.read().await;
        store
            .get(key)
            .filter(|e| Utc::now() - e.created_at < self.ttl)
            .map(|e| e.handle.clone())
    }

    /// Fetch a payload and install it, then release the in-flight slot
    ///
    /// The store is updated before the slot is cleared so that a caller
    /// arriving after the slot is gone sees the entry. On failure nothing
    /// is inserted and the slot is cleared all the same.
    async fn fetch_and_store(
        self: Arc<Self>,
        key: String,
        display_name: String,
        content_type: String,
    ) -> Option<DocumentHandle> {
        let outcome = match self.source.fetch(&key).await {
            Ok(doc) => {
                let (handle, revoker) = DocumentHandle::new(doc.data, doc.content_type);
                let entry = StoredEntry::new(handle.clone(), revoker, content_type, display_name);

                {
                    let mut store = self.store.write().await;
                    store.set(key.clone(), entry);
                }

                debug!(key = %key, size = handle.len(), "Cached document");
                Some(handle)
            }
            Err(e) => {
                warn!(key = %key, error = %e, "Failed to fetch document, falling back to source URL");
                None
            }
        };

        let mut inflight = self.inflight.lock().await;
        inflight.remove(&key);

        outcome
    }
}
