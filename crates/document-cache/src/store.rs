//! Bounded entry store with revoke-on-removal

use crate::handle::{DocumentHandle, HandleRevoker};
use crate::types::CacheEntry;
use chrono::{DateTime, Utc};
use std::collections::HashMap;
use tracing::debug;

/// One stored entry: the caller-facing handle plus its revoke capability
pub(crate) struct StoredEntry {
    pub handle: DocumentHandle,
    pub revoker: HandleRevoker,
    pub content_type: String,
    pub display_name: String,
    pub created_at: DateTime<Utc>,
}

impl StoredEntry {
    pub fn new(
        handle: DocumentHandle,
        revoker: HandleRevoker,
        content_type: String,
        display_name: String,
    ) -> Self {
        Self {
            handle,
            revoker,
            content_type,
            display_name,
            created_at: Utc::now(),
        }
    }

    /// Snapshot for callers; shares the handle, not the revoke capability
    pub fn to_entry(&self) -> CacheEntry {
        CacheEntry {
            handle: self.handle.clone(),
            content_type: self.content_type.clone(),
            display_name: self.display_name.clone(),
            created_at: self.created_at,
        }
    }

    fn revoke(self) {
        self.revoker.revoke();
    }
}

/// Bounded mapping from resource key to cache entry
///
/// Every removal path revokes the entry's handle before the key is
/// forgotten. Not internally synchronized; the cache wraps it in a lock.
pub(crate) struct Store {
    entries: HashMap<String, StoredEntry>,
    max_entries: usize,
}

impl Store {
    /// Create a store holding at most `max_entries` entries
    ///
    /// Capacity is clamped to at least one entry: a zero-capacity store
    /// could not hold the entry an insertion installs.
    pub fn new(max_entries: usize) -> Self {
        Self {
            entries: HashMap::new(),
            max_entries: max_entries.max(1),
        }
    }

    pub fn get(&self, key: &str) -> Option<&StoredEntry> {
        self.entries.get(key)
    }

    /// Install an entry, revoking any previous entry under the same key
    ///
    /// Inserting a new key while the store is full first evicts the entry
    /// with the oldest insertion time. Replacing an existing key never
    /// triggers eviction.
    pub fn set(&mut self, key: String, entry: StoredEntry) {
        if let Some(old) = self.entries.remove(&key) {
            old.revoke();
        } else {
            while self.entries.len() >= self.max_entries {
                if !self.evict_oldest() {
                    break;
                }
            }
        }

        self.entries.insert(key, entry);
    }

    /// Remove an entry, revoking its handle
    pub fn remove(&mut self, key: &str) {
        if let Some(entry) = self.entries.remove(key) {
            entry.revoke();
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Revoke every handle and empty the store
    pub fn clear(&mut self) {
        for (_, entry) in self.entries.drain() {
            entry.revoke();
        }
    }

    /// Keys whose age at `now` is `min_age` or more
    pub fn keys_older_than(&self, now: DateTime<Utc>, min_age: chrono::Duration) -> Vec<String> {
        self.entries
            .iter()
            .filter(|(_, e)| now - e.created_at >= min_age)
            .map(|(k, _)| k.clone())
            .collect()
    }

    /// Remove the entry with the smallest `created_at`
    ///
    /// Eviction is by insertion age: reads do not refresh `created_at`, so
    /// a frequently read but long-inserted entry is still the candidate.
    fn evict_oldest(&mut self) -> bool {
        let oldest_key = self
            .entries
            .iter()
            .min_by_key(|(_, e)| e.created_at)
            .map(|(k, _)| k.clone());

        match oldest_key {
            Some(key) => {
                debug!(key = %key, "Evicted oldest cache entry");
                self.remove(&key);
                true
            }
            None => false,
        }
    }
}
