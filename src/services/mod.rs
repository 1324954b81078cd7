//! Pipeline services: caching, retry, rate limiting, fetching, matching and
//! the orchestrator that ties them together.

pub mod checks;
pub mod discovery;
pub mod disk;
pub mod error_tracker;
pub mod fuzzy_matcher;
pub mod integration;
pub mod orchestrator;
pub mod pattern_comparator;
pub mod pattern_fetcher;
pub mod progress;
pub mod rate_limiter;
pub mod report;
pub mod result_cache;
pub mod retry;
pub mod test_generator;
pub mod unit_scan;

pub use error_tracker::ErrorTracker;
pub use fuzzy_matcher::{find_best_match, similarity, MATCH_THRESHOLD};
pub use orchestrator::{Orchestrator, OrchestratorBuilder};
pub use pattern_fetcher::{FetchReport, PatternFetcher, SourceFailure};
pub use progress::ProgressReporter;
pub use rate_limiter::RateLimiter;
pub use result_cache::ResultCache;
pub use retry::{RetryExecutor, RetryPolicy};
