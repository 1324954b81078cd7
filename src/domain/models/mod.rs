//! Domain models for the analysis pipeline.

pub mod analysis;
pub mod analysis_error;
pub mod cache;
pub mod config;
pub mod issue;
pub mod pipeline;
pub mod progress;
pub mod rate_limit;
pub mod reference;
pub mod work_item;

pub use analysis::{
    derive_component_name, fallback_block_slug, to_kebab_case, BlockAnalysis, ComponentAnalysis,
    FieldSummary, IntegrationResult, UnitFeatures,
};
pub use analysis_error::{AnalysisError, AnalysisErrorKind, ErrorSummary};
pub use cache::{CacheEntry, CacheStats, NamespaceStats};
pub use config::{
    AnalysisConfig, CacheConfig, Config, LoggingConfig, ReferenceConfig, RetryConfig,
};
pub use issue::{Issue, IssueType, Severity, SeverityFilter};
pub use pipeline::{
    CacheSettings, GeneratedTest, IssueCounts, IssueOrigin, PipelineOptions, PipelineResult,
    Report, ReportIssue, DEFAULT_BATCH_SIZE, DEFAULT_CACHE_TTL,
};
pub use progress::{Phase, ProgressEvent};
pub use rate_limit::RateLimitWindow;
pub use reference::{
    DifferenceKind, PatternComparison, PatternDifference, ReferenceMatch, ReferenceSource,
    ReferenceUnit, RemoteEntry, RemoteEntryType,
};
pub use work_item::{WorkItem, WorkItemKind};
