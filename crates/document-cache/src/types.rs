//! Cache types

use crate::handle::DocumentHandle;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Configuration for the document cache
#[derive(Debug, Clone)]
pub struct CacheConfig {
    /// Maximum number of entries held at once, clamped to at least one
    pub max_entries: usize,
    /// Age after which an entry is treated as stale
    pub ttl: Duration,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            max_entries: 64,
            ttl: Duration::from_secs(10 * 60), // 10 minutes
        }
    }
}

/// A cached document entry as seen by callers
#[derive(Debug, Clone)]
pub struct CacheEntry {
    pub handle: DocumentHandle,
    pub content_type: String,
    pub display_name: String,
    pub created_at: DateTime<Utc>,
}

/// Statistics about the cache
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CacheStats {
    pub size: usize,
    pub max_size: usize,
    pub hits: u64,
    pub misses: u64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = CacheConfig::default();
        assert_eq!(config.max_entries, 64);
        assert_eq!(config.ttl, Duration::from_secs(600));
    }

    #[test]
    fn test_cache_stats_default() {
        let stats = CacheStats::default();
        assert_eq!(stats.size, 0);
        assert_eq!(stats.max_size, 0);
        assert_eq!(stats.hits, 0);
        assert_eq!(stats.misses, 0);
    }

    #[test]
    fn test_cache_stats_serialization() {
        let stats = CacheStats {
            size: 3,
            max_size: 64,
            hits: 500,
            misses: 50,
        };

        let json = serde_json::to_string(&stats).unwrap();
        assert!(json.contains("500"));
        assert!(json.contains("64"));

        let deserialized: CacheStats = serde_json::from_str(&json).unwrap();
        assert_eq!(deserialized.size, stats.size);
        assert_eq!(deserialized.hits, stats.hits);
    }
}
