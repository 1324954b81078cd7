//! Fetches reference block patterns from upstream repositories.
//!
//! Each source's unit list is cached on disk as `<cache_dir>/<source-id>.json`
//! and reused while younger than the TTL. Every remote call waits on the
//! rate limiter first and runs under the retry executor; a source that still
//! fails is logged, reported back to the caller and skipped.

use chrono::{DateTime, Duration as ChronoDuration, Utc};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, instrument, warn};

use crate::domain::errors::FetchError;
use crate::domain::models::{
    to_kebab_case, ReferenceSource, ReferenceUnit, RemoteEntry, RemoteEntryType,
};
use crate::domain::ports::{ApiResponse, Clock, ReferenceApi};
use crate::services::discovery::CONFIG_FILENAMES;
use crate::services::rate_limiter::RateLimiter;
use crate::services::retry::RetryExecutor;
use crate::services::{disk, unit_scan};

/// On-disk form of one source's unit list.
#[derive(Debug, Clone, Serialize, Deserialize)]
struct CachedPatterns {
    fetched_at: DateTime<Utc>,
    units: Vec<ReferenceUnit>,
}

/// A source that could not be fetched.
#[derive(Debug, Clone)]
pub struct SourceFailure {
    pub source: ReferenceSource,
    pub error: FetchError,
}

/// Units from every source that succeeded plus the sources that did not.
#[derive(Debug, Clone, Default)]
pub struct FetchReport {
    pub units: Vec<ReferenceUnit>,
    pub failures: Vec<SourceFailure>,
}

pub struct PatternFetcher {
    api: Arc<dyn ReferenceApi>,
    sources: Vec<ReferenceSource>,
    cache_dir: Option<PathBuf>,
    cache_ttl: ChronoDuration,
    retry: RetryExecutor,
    limiter: Arc<RateLimiter>,
    clock: Arc<dyn Clock>,
}

impl PatternFetcher {
    pub fn new(
        api: Arc<dyn ReferenceApi>,
        sources: Vec<ReferenceSource>,
        retry: RetryExecutor,
        limiter: Arc<RateLimiter>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            api,
            sources,
            cache_dir: None,
            cache_ttl: ChronoDuration::hours(24),
            retry,
            limiter,
            clock,
        }
    }

    /// Enable the on-disk pattern cache.
    #[must_use]
    pub fn with_cache(mut self, dir: impl Into<PathBuf>, ttl: Duration) -> Self {
        self.cache_dir = Some(dir.into());
        self.cache_ttl = ChronoDuration::from_std(ttl).unwrap_or(ChronoDuration::MAX);
        self
    }

    pub const fn rate_limiter(&self) -> &Arc<RateLimiter> {
        &self.limiter
    }

    /// Fetch every configured source in order.
    pub async fn fetch_all(&self) -> FetchReport {
        let mut report = FetchReport::default();
        for source in &self.sources {
            match self.fetch_from_source(source).await {
                Ok(units) => report.units.extend(units),
                Err(error) => {
                    warn!(source = %source.name, error = %error, "skipping reference source");
                    report.failures.push(SourceFailure {
                        source: source.clone(),
                        error,
                    });
                }
            }
        }
        info!(
            units = report.units.len(),
            failed_sources = report.failures.len(),
            "reference patterns fetched"
        );
        report
    }

    /// Reference units for one source, from the disk cache when fresh.
    #[instrument(skip(self, source), fields(source = %source.name))]
    pub async fn fetch_from_source(
        &self,
        source: &ReferenceSource,
    ) -> Result<Vec<ReferenceUnit>, FetchError> {
        if let Some(units) = self.load_cached(source).await {
            debug!(units = units.len(), "using cached reference patterns");
            return Ok(units);
        }

        let entries = self
            .call(|| self.api.list_directory(source, &source.path))
            .await?;

        let mut units = Vec::new();
        for entry in &entries {
            match entry.entry_type {
                RemoteEntryType::Dir => {
                    if let Some(unit) = self.fetch_directory_unit(source, entry).await? {
                        units.push(unit);
                    }
                }
                RemoteEntryType::File if is_top_level_unit(&entry.name) => {
                    let content = self.call(|| self.api.fetch_file(source, &entry.path)).await?;
                    units.push(build_unit(source, &entry.path, &entry.name, &content));
                }
                _ => {}
            }
        }

        self.store_cached(source, &units).await;
        Ok(units)
    }

    async fn fetch_directory_unit(
        &self,
        source: &ReferenceSource,
        dir: &RemoteEntry,
    ) -> Result<Option<ReferenceUnit>, FetchError> {
        let children = self.call(|| self.api.list_directory(source, &dir.path)).await?;
        let config = CONFIG_FILENAMES.iter().find_map(|wanted| {
            children
                .iter()
                .find(|c| c.entry_type == RemoteEntryType::File && c.name == *wanted)
        });
        let Some(config) = config else {
            debug!(dir = %dir.path, "no config file, not a block");
            return Ok(None);
        };

        let content = self.call(|| self.api.fetch_file(source, &config.path)).await?;
        Ok(Some(build_unit(source, &config.path, &dir.name, &content)))
    }

    /// One remote call: limiter pre-check and response bookkeeping inside
    /// every retry attempt.
    async fn call<F, Fut, T>(&self, mut request: F) -> Result<T, FetchError>
    where
        F: FnMut() -> Fut,
        Fut: std::future::Future<Output = Result<ApiResponse<T>, FetchError>>,
    {
        self.retry
            .execute(|| {
                let pending = request();
                async move {
                    self.limiter.acquire().await;
                    match pending.await {
                        Ok(response) => {
                            if let Some(window) = response.rate_limit {
                                self.limiter.update(window).await;
                            }
                            Ok(response.body)
                        }
                        Err(err) => {
                            if let FetchError::RateLimited { window } = &err {
                                self.limiter.update(*window).await;
                            }
                            Err(err)
                        }
                    }
                }
            })
            .await
    }

    fn cache_file(&self, source: &ReferenceSource) -> Option<PathBuf> {
        self.cache_dir
            .as_ref()
            .map(|dir| dir.join(format!("{}.json", source.cache_id())))
    }

    async fn load_cached(&self, source: &ReferenceSource) -> Option<Vec<ReferenceUnit>> {
        let file = self.cache_file(source)?;
        match disk::read_json::<CachedPatterns>(&file).await {
            Ok(Some(cached)) if self.clock.now() - cached.fetched_at < self.cache_ttl => {
                Some(cached.units)
            }
            Ok(Some(_)) => {
                debug!(file = %file.display(), "reference pattern cache expired");
                None
            }
            Ok(None) => None,
            Err(err) => {
                debug!(file = %file.display(), error = %err, "ignoring unreadable pattern cache");
                None
            }
        }
    }

    async fn store_cached(&self, source: &ReferenceSource, units: &[ReferenceUnit]) {
        let Some(file) = self.cache_file(source) else {
            return;
        };
        let cached = CachedPatterns {
            fetched_at: self.clock.now(),
            units: units.to_vec(),
        };
        if let Err(err) = disk::write_json(&file, &cached).await {
            warn!(file = %file.display(), error = %err, "failed to write pattern cache");
        }
    }
}

/// Top-level `.ts`/`.js` files are single-file units; `index` files are not.
fn is_top_level_unit(name: &str) -> bool {
    let path = Path::new(name);
    let stem = path.file_stem().and_then(|s| s.to_str()).unwrap_or_default();
    let ext = path.extension().and_then(|e| e.to_str()).unwrap_or_default();
    matches!(ext, "ts" | "js") && stem != "index" && !name.ends_with(".d.ts")
}

fn build_unit(source: &ReferenceSource, path: &str, unit_name: &str, content: &str) -> ReferenceUnit {
    let scanned = unit_scan::scan_block(content);
    let slug = scanned.slug.unwrap_or_else(|| {
        let stem = Path::new(unit_name)
            .file_stem()
            .and_then(|s| s.to_str())
            .unwrap_or(unit_name);
        to_kebab_case(stem)
    });
    ReferenceUnit {
        source: source.name.clone(),
        slug,
        path: path.to_string(),
        fields: scanned.fields.into_iter().map(|f| f.name).collect(),
        features: scanned.features,
        interface_name: scanned.interface_name,
    }
}
