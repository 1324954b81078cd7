use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

use super::issue::SeverityFilter;
use super::pipeline::{CacheSettings, PipelineOptions};
use super::reference::ReferenceSource;

/// Main configuration structure for blockaudit
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct Config {
    /// Analysis pipeline configuration
    #[serde(default)]
    pub analysis: AnalysisConfig,

    /// Result cache configuration
    #[serde(default)]
    pub cache: CacheConfig,

    /// Upstream reference pattern configuration
    #[serde(default)]
    pub reference: ReferenceConfig,

    /// Retry policy configuration
    #[serde(default)]
    pub retry: RetryConfig,

    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl Config {
    /// Pipeline options implied by this configuration, before CLI overrides.
    pub fn pipeline_options(&self) -> PipelineOptions {
        PipelineOptions {
            block_dir: self.analysis.block_dir.clone(),
            component_dir: self.analysis.component_dir.clone(),
            include_tests: self.analysis.include_tests,
            compare_official: self.analysis.compare_official,
            severity: self.analysis.severity,
            enable_cache: self.cache.enabled,
            cache_dir: self.cache.dir.clone(),
            cache_ttl: Duration::from_secs(self.cache.ttl_secs),
            continue_on_error: self.analysis.continue_on_error,
            batch_size: self.analysis.batch_size,
        }
    }

    pub fn cache_settings(&self) -> CacheSettings {
        CacheSettings {
            enabled: self.cache.enabled,
            dir: self.cache.dir.clone(),
            ttl: Duration::from_secs(self.cache.ttl_secs),
        }
    }
}

/// Analysis pipeline configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct AnalysisConfig {
    /// Root directory holding block configs
    #[serde(default = "default_block_dir")]
    pub block_dir: PathBuf,

    /// Root directory holding UI components
    #[serde(default = "default_component_dir")]
    pub component_dir: PathBuf,

    /// Maximum analyzer calls in flight
    #[serde(default = "default_batch_size")]
    pub batch_size: usize,

    /// Substitute failed results instead of aborting the run
    #[serde(default = "default_true")]
    pub continue_on_error: bool,

    /// Render test skeletons for analyzed blocks
    #[serde(default)]
    pub include_tests: bool,

    /// Compare blocks against upstream reference patterns
    #[serde(default)]
    pub compare_official: bool,

    /// Issues listed in the report
    #[serde(default)]
    pub severity: SeverityFilter,
}

fn default_block_dir() -> PathBuf {
    PathBuf::from("src/blocks")
}

fn default_component_dir() -> PathBuf {
    PathBuf::from("src/blocks")
}

const fn default_batch_size() -> usize {
    5
}

const fn default_true() -> bool {
    true
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            block_dir: default_block_dir(),
            component_dir: default_component_dir(),
            batch_size: default_batch_size(),
            continue_on_error: true,
            include_tests: false,
            compare_official: false,
            severity: SeverityFilter::All,
        }
    }
}

/// Result cache configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct CacheConfig {
    /// Whether analyzer results are cached at all
    #[serde(default = "default_true")]
    pub enabled: bool,

    /// Directory for the disk tier (memory only when unset)
    #[serde(default = "default_cache_dir")]
    pub dir: Option<PathBuf>,

    /// Entry time-to-live in seconds
    #[serde(default = "default_cache_ttl_secs")]
    pub ttl_secs: u64,
}

#[allow(clippy::unnecessary_wraps)]
fn default_cache_dir() -> Option<PathBuf> {
    Some(PathBuf::from(".blockaudit/cache"))
}

const fn default_cache_ttl_secs() -> u64 {
    3_600
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            dir: default_cache_dir(),
            ttl_secs: default_cache_ttl_secs(),
        }
    }
}

/// Upstream reference pattern configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct ReferenceConfig {
    /// Base URL of the contents API
    #[serde(default = "default_api_base_url")]
    pub api_base_url: String,

    /// Bearer token; falls back to `GITHUB_TOKEN` when unset
    #[serde(default)]
    pub token: Option<String>,

    /// User-Agent header sent with every request
    #[serde(default = "default_user_agent")]
    pub user_agent: String,

    /// Directory for the fetched pattern cache
    #[serde(default = "default_pattern_cache_dir")]
    pub cache_dir: PathBuf,

    /// Pattern cache time-to-live in seconds
    #[serde(default = "default_pattern_cache_ttl_secs")]
    pub cache_ttl_secs: u64,

    /// Sources to fetch reference units from
    #[serde(default = "default_sources")]
    pub sources: Vec<ReferenceSource>,
}

fn default_api_base_url() -> String {
    "https://api.github.com".to_string()
}

fn default_user_agent() -> String {
    concat!("blockaudit/", env!("CARGO_PKG_VERSION")).to_string()
}

fn default_pattern_cache_dir() -> PathBuf {
    PathBuf::from(".blockaudit/cache/patterns")
}

const fn default_pattern_cache_ttl_secs() -> u64 {
    86_400
}

fn default_sources() -> Vec<ReferenceSource> {
    vec![
        ReferenceSource {
            name: "payload-website".to_string(),
            owner: "payloadcms".to_string(),
            repo: "payload".to_string(),
            path: "templates/website/src/blocks".to_string(),
            branch: "main".to_string(),
        },
        ReferenceSource {
            name: "payload-ecommerce".to_string(),
            owner: "payloadcms".to_string(),
            repo: "payload".to_string(),
            path: "templates/ecommerce/src/blocks".to_string(),
            branch: "main".to_string(),
        },
    ]
}

impl Default for ReferenceConfig {
    fn default() -> Self {
        Self {
            api_base_url: default_api_base_url(),
            token: None,
            user_agent: default_user_agent(),
            cache_dir: default_pattern_cache_dir(),
            cache_ttl_secs: default_pattern_cache_ttl_secs(),
            sources: default_sources(),
        }
    }
}

/// Retry policy configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct RetryConfig {
    /// Maximum number of retry attempts
    #[serde(default = "default_max_retries")]
    pub max_retries: u32,

    /// Initial backoff delay in milliseconds
    #[serde(default = "default_initial_backoff_ms")]
    pub initial_backoff_ms: u64,

    /// Maximum backoff delay in milliseconds
    #[serde(default = "default_max_backoff_ms")]
    pub max_backoff_ms: u64,

    /// Multiplier applied to the delay after each failure
    #[serde(default = "default_backoff_factor")]
    pub backoff_factor: f64,
}

const fn default_max_retries() -> u32 {
    3
}

const fn default_initial_backoff_ms() -> u64 {
    1_000
}

const fn default_max_backoff_ms() -> u64 {
    10_000
}

const fn default_backoff_factor() -> f64 {
    2.0
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_retries: default_max_retries(),
            initial_backoff_ms: default_initial_backoff_ms(),
            max_backoff_ms: default_max_backoff_ms(),
            backoff_factor: default_backoff_factor(),
        }
    }
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct LoggingConfig {
    /// Log level: trace, debug, info, warn, error
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Log format: json or pretty
    #[serde(default = "default_log_format")]
    pub format: String,

    /// Directory for rolling log files (stderr only when unset)
    #[serde(default)]
    pub log_dir: Option<PathBuf>,
}

fn default_log_level() -> String {
    "warn".to_string()
}

fn default_log_format() -> String {
    "pretty".to_string()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: default_log_format(),
            log_dir: None,
        }
    }
}
