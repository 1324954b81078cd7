//! `blockaudit analyze`: run the full pipeline.

use anyhow::{Context, Result};
use clap::Args;
use serde::Serialize;
use std::path::PathBuf;
use std::time::Duration;

use crate::cli::output::{output, progress, CommandOutput, TableFormatter};
use crate::cli::service::build_orchestrator;
use crate::domain::models::{Config, PipelineOptions, PipelineResult, SeverityFilter};
use crate::services::ProgressReporter;

#[derive(Args, Debug, Default)]
pub struct AnalyzeArgs {
    /// Directory holding block configs
    #[arg(long)]
    pub blocks: Option<PathBuf>,

    /// Directory holding UI components
    #[arg(long)]
    pub components: Option<PathBuf>,

    /// Generate test skeletons for analyzed blocks
    #[arg(long)]
    pub include_tests: bool,

    /// Compare blocks against upstream reference patterns
    #[arg(long)]
    pub compare_official: bool,

    /// Issues to list: all, critical or high
    #[arg(long)]
    pub severity: Option<SeverityFilter>,

    /// Analyze every file even if a cached result exists
    #[arg(long)]
    pub no_cache: bool,

    /// Directory for the disk cache tier
    #[arg(long)]
    pub cache_dir: Option<PathBuf>,

    /// Cache entry time-to-live in seconds
    #[arg(long)]
    pub cache_ttl_secs: Option<u64>,

    /// Stop at the first analyzer failure
    #[arg(long)]
    pub fail_fast: bool,

    /// Maximum analyzer calls in flight
    #[arg(long)]
    pub batch_size: Option<usize>,

    /// Write the full result as JSON to this file
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Directory to write generated test files to (implies --include-tests)
    #[arg(long)]
    pub tests_dir: Option<PathBuf>,
}

impl AnalyzeArgs {
    /// Layer these flags over the configured options.
    pub fn apply(&self, mut options: PipelineOptions) -> PipelineOptions {
        if let Some(dir) = &self.blocks {
            options.block_dir.clone_from(dir);
        }
        if let Some(dir) = &self.components {
            options.component_dir.clone_from(dir);
        }
        if self.include_tests || self.tests_dir.is_some() {
            options.include_tests = true;
        }
        if self.compare_official {
            options.compare_official = true;
        }
        if let Some(severity) = self.severity {
            options.severity = severity;
        }
        if self.no_cache {
            options.enable_cache = false;
        }
        if let Some(dir) = &self.cache_dir {
            options.cache_dir = Some(dir.clone());
        }
        if let Some(secs) = self.cache_ttl_secs {
            options.cache_ttl = Duration::from_secs(secs);
        }
        if self.fail_fast {
            options.continue_on_error = false;
        }
        if let Some(batch_size) = self.batch_size {
            options.batch_size = batch_size;
        }
        options
    }
}

#[derive(Debug, Serialize)]
pub struct AnalyzeOutput {
    #[serde(flatten)]
    pub result: PipelineResult,
}

impl CommandOutput for AnalyzeOutput {
    fn to_human(&self) -> String {
        let formatter = TableFormatter::new();
        let report = &self.result.report;
        let mut sections = vec![formatter.format_summary(report)];

        if report.issues.is_empty() {
            sections.push(format!("No issues at severity filter '{}'.", report.severity_filter));
        } else {
            sections.push(format!(
                "{} issue(s) at severity filter '{}':",
                report.issues.len(),
                report.severity_filter
            ));
            sections.push(formatter.format_issues(&report.issues));
        }

        if let Some(comparisons) = &self.result.comparisons {
            sections.push(format!("Reference comparison ({} block(s)):", comparisons.len()));
            sections.push(formatter.format_comparisons(comparisons));
        }

        if let Some(tests) = &self.result.generated_tests {
            sections.push(format!("Generated {} test file(s).", tests.len()));
        }

        if self.result.error_summary.total > 0 {
            let phases: Vec<String> = self
                .result
                .error_summary
                .by_phase
                .iter()
                .map(|(phase, count)| format!("{phase}: {count}"))
                .collect();
            sections.push(format!(
                "{} item(s) failed ({}).",
                self.result.error_summary.total,
                phases.join(", ")
            ));
        }

        sections.join("\n\n")
    }
}

pub async fn execute(args: AnalyzeArgs, config: &Config, json: bool) -> Result<()> {
    let options = args.apply(config.pipeline_options());

    let (reporter, events) = ProgressReporter::channel();
    let renderer = tokio::spawn(progress::drive(events, json));

    let orchestrator = build_orchestrator(config, options.cache_settings(), reporter);
    let outcome = orchestrator.run(&options).await;
    drop(orchestrator);
    renderer.await.context("progress renderer failed")?;

    let result = outcome.context("analysis failed")?;

    if let Some(dir) = &args.tests_dir {
        write_generated_tests(dir, &result).await?;
    }

    if let Some(path) = &args.output {
        let body = serde_json::to_string_pretty(&result)?;
        tokio::fs::write(path, body)
            .await
            .with_context(|| format!("failed to write {}", path.display()))?;
        tracing::info!(path = %path.display(), "wrote analysis result");
    }

    output(&AnalyzeOutput { result }, json);
    Ok(())
}

async fn write_generated_tests(dir: &std::path::Path, result: &PipelineResult) -> Result<()> {
    let Some(tests) = &result.generated_tests else {
        return Ok(());
    };
    tokio::fs::create_dir_all(dir)
        .await
        .with_context(|| format!("failed to create {}", dir.display()))?;
    for test in tests {
        let path = dir.join(&test.file_name);
        tokio::fs::write(&path, &test.content)
            .await
            .with_context(|| format!("failed to write {}", path.display()))?;
    }
    tracing::info!(dir = %dir.display(), count = tests.len(), "wrote generated tests");
    Ok(())
}
