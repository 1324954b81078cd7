//! Pipeline inputs and aggregated outputs.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

use super::analysis::{BlockAnalysis, ComponentAnalysis, IntegrationResult};
use super::analysis_error::{AnalysisError, ErrorSummary};
use super::issue::{Issue, Severity, SeverityFilter};
use super::reference::PatternComparison;

/// Default number of analyzer calls allowed in flight.
pub const DEFAULT_BATCH_SIZE: usize = 5;

/// Default result cache TTL (one hour).
pub const DEFAULT_CACHE_TTL: Duration = Duration::from_secs(3_600);

/// Options for one pipeline run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PipelineOptions {
    pub block_dir: PathBuf,
    pub component_dir: PathBuf,
    pub include_tests: bool,
    pub compare_official: bool,
    pub severity: SeverityFilter,
    pub enable_cache: bool,
    pub cache_dir: Option<PathBuf>,
    pub cache_ttl: Duration,
    pub continue_on_error: bool,
    pub batch_size: usize,
}

impl Default for PipelineOptions {
    fn default() -> Self {
        Self {
            block_dir: PathBuf::from("src/blocks"),
            component_dir: PathBuf::from("src/blocks"),
            include_tests: false,
            compare_official: false,
            severity: SeverityFilter::All,
            enable_cache: true,
            cache_dir: None,
            cache_ttl: DEFAULT_CACHE_TTL,
            continue_on_error: true,
            batch_size: DEFAULT_BATCH_SIZE,
        }
    }
}

impl PipelineOptions {
    pub fn new(block_dir: impl Into<PathBuf>, component_dir: impl Into<PathBuf>) -> Self {
        Self {
            block_dir: block_dir.into(),
            component_dir: component_dir.into(),
            ..Self::default()
        }
    }

    pub fn cache_settings(&self) -> CacheSettings {
        CacheSettings {
            enabled: self.enable_cache,
            dir: self.cache_dir.clone(),
            ttl: self.cache_ttl,
        }
    }
}

/// How the result caches are built.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CacheSettings {
    pub enabled: bool,
    pub dir: Option<PathBuf>,
    pub ttl: Duration,
}

impl Default for CacheSettings {
    fn default() -> Self {
        Self {
            enabled: true,
            dir: None,
            ttl: DEFAULT_CACHE_TTL,
        }
    }
}

/// Issue totals by severity.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct IssueCounts {
    pub critical: usize,
    pub high: usize,
    pub medium: usize,
    pub low: usize,
}

impl IssueCounts {
    pub fn add(&mut self, severity: Severity) {
        match severity {
            Severity::Critical => self.critical += 1,
            Severity::High => self.high += 1,
            Severity::Medium => self.medium += 1,
            Severity::Low => self.low += 1,
        }
    }

    pub const fn total(&self) -> usize {
        self.critical + self.high + self.medium + self.low
    }
}

/// Where a reported issue came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IssueOrigin {
    Block,
    Component,
    Integration,
}

impl IssueOrigin {
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Block => "block",
            Self::Component => "component",
            Self::Integration => "integration",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReportIssue {
    pub origin: IssueOrigin,
    pub item: String,
    #[serde(flatten)]
    pub issue: Issue,
}

/// Final summary produced by the report phase.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Report {
    pub generated_at: DateTime<Utc>,
    pub severity_filter: SeverityFilter,
    pub counts: IssueCounts,
    pub blocks_analyzed: usize,
    pub components_analyzed: usize,
    pub failed_items: usize,
    pub integration_pairs: usize,
    pub blocks_with_drift: usize,
    pub issues: Vec<ReportIssue>,
}

/// A rendered test file for one block.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GeneratedTest {
    pub block_slug: String,
    pub file_name: String,
    pub content: String,
}

/// Everything a run produced, plus the error log.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PipelineResult {
    pub blocks: Vec<BlockAnalysis>,
    pub components: Vec<ComponentAnalysis>,
    pub integrations: Vec<IntegrationResult>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub comparisons: Option<Vec<PatternComparison>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub generated_tests: Option<Vec<GeneratedTest>>,
    pub report: Report,
    pub errors: Vec<AnalysisError>,
    pub error_summary: ErrorSummary,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_options() {
        let options = PipelineOptions::default();
        assert!(options.continue_on_error);
        assert!(options.enable_cache);
        assert!(!options.include_tests);
        assert!(!options.compare_official);
        assert_eq!(options.batch_size, 5);
        assert_eq!(options.cache_ttl, Duration::from_secs(3_600));
        assert_eq!(options.severity, SeverityFilter::All);
    }

    #[test]
    fn test_issue_counts() {
        let mut counts = IssueCounts::default();
        counts.add(Severity::Critical);
        counts.add(Severity::Low);
        counts.add(Severity::Low);
        assert_eq!(counts.critical, 1);
        assert_eq!(counts.low, 2);
        assert_eq!(counts.total(), 3);
    }
}
