//! Cached analyzer results.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

/// A cached value plus the bookkeeping needed to decide freshness.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CacheEntry<T> {
    pub value: T,
    pub cached_at: DateTime<Utc>,
    pub fingerprint: String,
    /// Source file mtime observed when the entry was stored.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source_modified: Option<DateTime<Utc>>,
}

impl<T> CacheEntry<T> {
    /// True once the entry is at least `ttl` old.
    pub fn is_expired(&self, now: DateTime<Utc>, ttl: Duration) -> bool {
        now - self.cached_at >= ttl
    }

    /// True when the source file changed after the entry was stored.
    pub fn is_stale_for(&self, modified: DateTime<Utc>) -> bool {
        if modified > self.cached_at {
            return true;
        }
        self.source_modified
            .is_some_and(|recorded| recorded != modified)
    }
}

/// Counters for one cache namespace.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NamespaceStats {
    pub entries: usize,
    pub hits: u64,
    pub misses: u64,
}

impl NamespaceStats {
    #[allow(clippy::cast_precision_loss)]
    pub fn hit_rate(&self) -> f64 {
        let lookups = self.hits + self.misses;
        if lookups == 0 {
            0.0
        } else {
            self.hits as f64 / lookups as f64
        }
    }
}

/// Snapshot returned by the orchestrator's cache statistics call.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CacheStats {
    pub enabled: bool,
    pub disk_dir: Option<String>,
    pub blocks: NamespaceStats,
    pub components: NamespaceStats,
}
