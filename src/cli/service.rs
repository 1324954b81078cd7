//! Wiring of pipeline services from configuration.

use std::sync::Arc;
use std::time::Duration;

use crate::adapters::analyzers::{TextBlockAnalyzer, TextComponentAnalyzer};
use crate::adapters::github::GitHubContentsClient;
use crate::adapters::system::SystemClock;
use crate::domain::models::{CacheSettings, Config};
use crate::domain::ports::Clock;
use crate::services::{
    Orchestrator, PatternFetcher, ProgressReporter, RateLimiter, RetryExecutor, RetryPolicy,
};

/// Pattern fetcher over the GitHub contents API, with the on-disk pattern cache.
pub fn build_pattern_fetcher(config: &Config, clock: Arc<dyn Clock>) -> PatternFetcher {
    let client = GitHubContentsClient::from_config(&config.reference);
    if !client.has_token() {
        tracing::debug!("no GitHub token configured, using the anonymous rate limit");
    }
    let retry = RetryExecutor::new(RetryPolicy::from(&config.retry), clock.clone());
    let limiter = Arc::new(RateLimiter::new(clock.clone()));
    PatternFetcher::new(
        Arc::new(client),
        config.reference.sources.clone(),
        retry,
        limiter,
        clock,
    )
    .with_cache(
        config.reference.cache_dir.clone(),
        Duration::from_secs(config.reference.cache_ttl_secs),
    )
}

/// Orchestrator using the built-in text analyzers.
pub fn build_orchestrator(
    config: &Config,
    cache_settings: CacheSettings,
    progress: ProgressReporter,
) -> Orchestrator {
    let clock: Arc<dyn Clock> = Arc::new(SystemClock);
    let fetcher = build_pattern_fetcher(config, clock.clone());
    Orchestrator::builder(Arc::new(TextBlockAnalyzer), Arc::new(TextComponentAnalyzer))
        .with_clock(clock)
        .with_cache_settings(cache_settings)
        .with_pattern_fetcher(Arc::new(fetcher))
        .with_progress(progress)
        .build()
}
