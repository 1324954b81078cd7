//! Two-tier cache of analyzer results keyed by source path.
//!
//! The memory tier is always present. When a cache directory is configured,
//! entries are also persisted under `<dir>/<namespace>/<key>.json`, where
//! `<key>` is the SHA-256 of the normalized source path and
//! `<dir>/<namespace>/index.json` maps keys back to paths.
//!
//! An entry is served only while it is younger than the TTL and the source
//! file has not been modified since it was stored. Any other lookup is a
//! miss and evicts the entry from both tiers.
//!
//! Disk I/O is best-effort: failures are logged and otherwise ignored.

use chrono::Duration as ChronoDuration;
use serde::de::DeserializeOwned;
use serde::Serialize;
use sha2::{Digest, Sha256};
use std::collections::{BTreeMap, HashMap};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{Mutex, RwLock};
use tracing::{debug, warn};

use crate::domain::models::{CacheEntry, NamespaceStats, WorkItemKind};
use crate::domain::ports::{Clock, FileStatProvider};
use crate::services::disk;

const INDEX_FILE: &str = "index.json";

/// Cache of one kind of analyzer result.
pub struct ResultCache<T> {
    kind: WorkItemKind,
    ttl: ChronoDuration,
    disk_dir: Option<PathBuf>,
    entries: RwLock<HashMap<String, CacheEntry<T>>>,
    /// Lazily loaded copy of the sidecar index; `None` until first touched.
    index: Mutex<Option<BTreeMap<String, String>>>,
    clock: Arc<dyn Clock>,
    file_stat: Arc<dyn FileStatProvider>,
    hits: AtomicU64,
    misses: AtomicU64,
}

impl<T> ResultCache<T>
where
    T: Clone + Serialize + DeserializeOwned + Send + Sync,
{
    /// Build a cache for `kind`. With `cache_root` set, the disk tier lives in
    /// `cache_root/<kind namespace>`.
    pub fn new(
        kind: WorkItemKind,
        ttl: Duration,
        cache_root: Option<&Path>,
        clock: Arc<dyn Clock>,
        file_stat: Arc<dyn FileStatProvider>,
    ) -> Self {
        Self {
            kind,
            ttl: ChronoDuration::from_std(ttl).unwrap_or(ChronoDuration::MAX),
            disk_dir: cache_root.map(|root| root.join(kind.cache_namespace())),
            entries: RwLock::new(HashMap::new()),
            index: Mutex::new(None),
            clock,
            file_stat,
            hits: AtomicU64::new(0),
            misses: AtomicU64::new(0),
        }
    }

    /// Cached value for `path`, if one exists and is still fresh.
    pub async fn get(&self, path: &Path) -> Option<T> {
        let key = normalize_path(path);

        let memory_entry = self.entries.read().await.get(&key).cloned();
        let (entry, from_disk) = match memory_entry {
            Some(entry) => (Some(entry), false),
            None => (self.load_from_disk(&key).await, true),
        };

        let Some(entry) = entry else {
            self.record_miss();
            return None;
        };

        if entry.is_expired(self.clock.now(), self.ttl) {
            debug!(kind = %self.kind, path = %key, "cache entry expired");
            self.evict(&key).await;
            self.record_miss();
            return None;
        }

        match self.file_stat.stat(path).await {
            Ok(meta) if !entry.is_stale_for(meta.modified) => {}
            Ok(_) => {
                debug!(kind = %self.kind, path = %key, "source modified since caching");
                self.evict(&key).await;
                self.record_miss();
                return None;
            }
            Err(err) => {
                debug!(kind = %self.kind, path = %key, error = %err, "source not readable");
                self.evict(&key).await;
                self.record_miss();
                return None;
            }
        }

        let value = entry.value.clone();
        if from_disk {
            self.entries.write().await.insert(key, entry);
        }
        self.hits.fetch_add(1, Ordering::Relaxed);
        Some(value)
    }

    /// Store `value` for `path`, replacing any previous entry.
    pub async fn put(&self, path: &Path, value: T) {
        let key = normalize_path(path);
        let source_modified = match self.file_stat.stat(path).await {
            Ok(meta) => Some(meta.modified),
            Err(err) => {
                debug!(kind = %self.kind, path = %key, error = %err, "could not stat source");
                None
            }
        };

        let entry = CacheEntry {
            fingerprint: fingerprint(&value),
            value,
            cached_at: self.clock.now(),
            source_modified,
        };

        if self.disk_dir.is_some() {
            self.persist(&key, &entry).await;
        }
        self.entries.write().await.insert(key, entry);
    }

    /// Drop the entry for `path` from both tiers.
    pub async fn invalidate(&self, path: &Path) {
        self.evict(&normalize_path(path)).await;
    }

    /// Drop every entry, including the disk tier.
    pub async fn clear(&self) {
        self.entries.write().await.clear();
        *self.index.lock().await = Some(BTreeMap::new());
        if let Some(dir) = &self.disk_dir {
            match tokio::fs::remove_dir_all(dir).await {
                Ok(()) => debug!(dir = %dir.display(), "disk cache cleared"),
                Err(err) if err.kind() == std::io::ErrorKind::NotFound => {}
                Err(err) => warn!(dir = %dir.display(), error = %err, "failed to clear disk cache"),
            }
        }
        self.hits.store(0, Ordering::Relaxed);
        self.misses.store(0, Ordering::Relaxed);
    }

    pub async fn stats(&self) -> NamespaceStats {
        NamespaceStats {
            entries: self.entries.read().await.len(),
            hits: self.hits.load(Ordering::Relaxed),
            misses: self.misses.load(Ordering::Relaxed),
        }
    }

    /// Source paths currently recorded in the disk index.
    pub async fn indexed_paths(&self) -> Vec<String> {
        let mut guard = self.index.lock().await;
        self.ensure_index(&mut guard).await.values().cloned().collect()
    }

    fn record_miss(&self) {
        self.misses.fetch_add(1, Ordering::Relaxed);
    }

    fn entry_file(&self, key: &str) -> Option<PathBuf> {
        self.disk_dir
            .as_ref()
            .map(|dir| dir.join(format!("{}.json", disk_key(key))))
    }

    async fn load_from_disk(&self, key: &str) -> Option<CacheEntry<T>> {
        let file = self.entry_file(key)?;
        match disk::read_json::<CacheEntry<T>>(&file).await {
            Ok(Some(entry)) => {
                if entry.is_expired(self.clock.now(), self.ttl) {
                    debug!(kind = %self.kind, path = %key, "discarding expired disk entry");
                    self.evict(key).await;
                    return None;
                }
                Some(entry)
            }
            Ok(None) => None,
            Err(err) => {
                debug!(file = %file.display(), error = %err, "unreadable disk cache entry");
                let _ = disk::remove_if_exists(&file).await;
                None
            }
        }
    }

    async fn persist(&self, key: &str, entry: &CacheEntry<T>) {
        let Some(file) = self.entry_file(key) else {
            return;
        };
        if let Err(err) = disk::write_json(&file, entry).await {
            warn!(file = %file.display(), error = %err, "failed to persist cache entry");
            return;
        }

        let mut guard = self.index.lock().await;
        let index = self.ensure_index(&mut guard).await;
        index.insert(disk_key(key), key.to_string());
        self.write_index(index).await;
    }

    async fn evict(&self, key: &str) {
        self.entries.write().await.remove(key);

        let Some(file) = self.entry_file(key) else {
            return;
        };
        if let Err(err) = disk::remove_if_exists(&file).await {
            debug!(file = %file.display(), error = %err, "failed to remove cache entry");
        }

        let mut guard = self.index.lock().await;
        let index = self.ensure_index(&mut guard).await;
        if index.remove(&disk_key(key)).is_some() {
            self.write_index(index).await;
        }
    }

    async fn ensure_index<'a>(
        &self,
        slot: &'a mut Option<BTreeMap<String, String>>,
    ) -> &'a mut BTreeMap<String, String> {
        if slot.is_none() {
            if let Some(dir) = &self.disk_dir {
                let removed = disk::remove_stale_temps(dir).await;
                if removed > 0 {
                    debug!(dir = %dir.display(), removed, "removed stale cache temp files");
                }
            }
            let loaded = match &self.disk_dir {
                Some(dir) => disk::read_json(&dir.join(INDEX_FILE))
                    .await
                    .unwrap_or_else(|err| {
                        debug!(error = %err, "ignoring unreadable cache index");
                        None
                    })
                    .unwrap_or_default(),
                None => BTreeMap::new(),
            };
            *slot = Some(loaded);
        }
        slot.get_or_insert_with(BTreeMap::new)
    }

    async fn write_index(&self, index: &BTreeMap<String, String>) {
        if let Some(dir) = &self.disk_dir {
            if let Err(err) = disk::write_json(&dir.join(INDEX_FILE), index).await {
                warn!(dir = %dir.display(), error = %err, "failed to write cache index");
            }
        }
    }
}

/// Absolute, forward-slash form of `path` used as the cache identity.
pub fn normalize_path(path: &Path) -> String {
    let absolute = std::path::absolute(path).unwrap_or_else(|_| path.to_path_buf());
    absolute.to_string_lossy().replace('\\', "/")
}

/// Filename-safe key for a normalized path.
pub fn disk_key(normalized: &str) -> String {
    hex::encode(Sha256::digest(normalized.as_bytes()))
}

/// Cheap content signature: serialized length plus first and last character.
pub fn fingerprint<T: Serialize>(value: &T) -> String {
    let serialized = serde_json::to_string(value).unwrap_or_default();
    let first = serialized.chars().next().map(String::from).unwrap_or_default();
    let last = serialized.chars().last().map(String::from).unwrap_or_default();
    format!("{}:{first}{last}", serialized.len())
}
