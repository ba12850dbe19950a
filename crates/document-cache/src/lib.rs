//! In-memory document cache with TTL expiration and insertion-order eviction
//!
//! Provides a bounded cache of fetched document payloads, each backed by a
//! revocable handle. Entries expire after a fixed TTL and the oldest entry
//! is evicted when the cache is full. Concurrent resolutions of the same
//! key are coalesced into a single fetch.

mod cache;
mod handle;
mod source;
mod store;
mod types;

pub use cache::{DocumentCache, ResolvedDocument};
pub use handle::{DocumentHandle, HandleRevoker};
pub use source::DocumentSource;
pub use types::{CacheConfig, CacheEntry, CacheStats};
