//! Blockaudit - batch auditing of block configs and their UI components
//!
//! Blockaudit discovers block configuration files and UI components, analyzes
//! them with bounded concurrency, caches results in memory and on disk, checks
//! that each block has a matching component, optionally compares blocks with
//! upstream reference patterns, and aggregates everything into a report.
//!
//! # Architecture
//!
//! This crate follows Hexagonal Architecture principles:
//!
//! - **Domain Layer** (`domain`): data model, errors and port traits
//! - **Service Layer** (`services`): the pipeline and its building blocks
//! - **Adapters** (`adapters`): text analyzers, GitHub client, clock and filesystem
//! - **Infrastructure Layer** (`infrastructure`): configuration and logging
//! - **CLI Layer** (`cli`): command-line interface
//!
//! # Example
//!
//! ```no_run
//! use std::sync::Arc;
//! use blockaudit::adapters::analyzers::{TextBlockAnalyzer, TextComponentAnalyzer};
//! use blockaudit::{Orchestrator, PipelineOptions};
//!
//! # async fn run() -> blockaudit::DomainResult<()> {
//! let orchestrator =
//!     Orchestrator::builder(Arc::new(TextBlockAnalyzer), Arc::new(TextComponentAnalyzer)).build();
//! let result = orchestrator
//!     .run(&PipelineOptions::new("src/blocks", "src/components"))
//!     .await?;
//! println!("{} issue(s)", result.report.counts.total());
//! # Ok(())
//! # }
//! ```

pub mod adapters;
pub mod cli;
pub mod domain;
pub mod infrastructure;
pub mod services;

// Re-export commonly used types for convenience
pub use domain::errors::{AnalyzerError, DomainError, DomainResult, FetchError};
pub use domain::models::{
    BlockAnalysis, ComponentAnalysis, Config, Issue, IssueType, PipelineOptions, PipelineResult,
    ProgressEvent, Report, Severity, SeverityFilter,
};
pub use domain::ports::{BlockAnalyzer, Clock, ComponentAnalyzer, FileStatProvider, ReferenceApi};
pub use infrastructure::config::{ConfigError, ConfigLoader};
pub use services::{
    ErrorTracker, Orchestrator, OrchestratorBuilder, PatternFetcher, ProgressReporter,
    RateLimiter, ResultCache, RetryExecutor, RetryPolicy,
};
