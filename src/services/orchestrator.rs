//! The analysis pipeline.
//!
//! Phases run strictly in order:
//! discovery, block analysis, component analysis, integration validation,
//! pattern comparison (optional), test generation (optional), report.
//!
//! Analyzer calls are fanned out as tasks behind a semaphore of
//! `batch_size` permits, so no more than that many are in flight at once.
//! Results are collected in discovery order regardless of completion order.

use futures::future::BoxFuture;
use futures::FutureExt;
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tokio::sync::{Mutex, RwLock, Semaphore};
use tracing::{debug, info, instrument, trace, warn};

use crate::adapters::system::{FsFileStat, SystemClock};
use crate::domain::errors::{AnalyzerError, DomainError, DomainResult};
use crate::domain::models::{
    AnalysisError, AnalysisErrorKind, BlockAnalysis, CacheSettings, CacheStats, ComponentAnalysis,
    ErrorSummary, PatternComparison, Phase, PipelineOptions, PipelineResult, ReferenceUnit,
    WorkItemKind,
};
use crate::domain::ports::{BlockAnalyzer, Clock, ComponentAnalyzer, FileStatProvider};
use crate::services::error_tracker::ErrorTracker;
use crate::services::pattern_fetcher::PatternFetcher;
use crate::services::progress::ProgressReporter;
use crate::services::report::{build_report, ReportInput};
use crate::services::result_cache::ResultCache;
use crate::services::{discovery, integration, pattern_comparator, test_generator};

type AnalyzeFn<T> = Arc<dyn Fn(PathBuf) -> BoxFuture<'static, Result<T, AnalyzerError>> + Send + Sync>;

/// Result caches for the current cache settings.
struct CacheSet {
    settings: CacheSettings,
    blocks: Arc<ResultCache<BlockAnalysis>>,
    components: Arc<ResultCache<ComponentAnalysis>>,
}

/// Builder for [`Orchestrator`].
pub struct OrchestratorBuilder {
    block_analyzer: Arc<dyn BlockAnalyzer>,
    component_analyzer: Arc<dyn ComponentAnalyzer>,
    clock: Arc<dyn Clock>,
    file_stat: Arc<dyn FileStatProvider>,
    cache_settings: CacheSettings,
    fetcher: Option<Arc<PatternFetcher>>,
    progress: ProgressReporter,
}

impl OrchestratorBuilder {
    pub fn new(
        block_analyzer: Arc<dyn BlockAnalyzer>,
        component_analyzer: Arc<dyn ComponentAnalyzer>,
    ) -> Self {
        Self {
            block_analyzer,
            component_analyzer,
            clock: Arc::new(SystemClock),
            file_stat: Arc::new(FsFileStat),
            cache_settings: CacheSettings::default(),
            fetcher: None,
            progress: ProgressReporter::disabled(),
        }
    }

    #[must_use]
    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    #[must_use]
    pub fn with_file_stat(mut self, file_stat: Arc<dyn FileStatProvider>) -> Self {
        self.file_stat = file_stat;
        self
    }

    /// Cache settings used until a run asks for different ones.
    #[must_use]
    pub fn with_cache_settings(mut self, settings: CacheSettings) -> Self {
        self.cache_settings = settings;
        self
    }

    #[must_use]
    pub fn with_pattern_fetcher(mut self, fetcher: Arc<PatternFetcher>) -> Self {
        self.fetcher = Some(fetcher);
        self
    }

    #[must_use]
    pub fn with_progress(mut self, progress: ProgressReporter) -> Self {
        self.progress = progress;
        self
    }

    pub fn build(self) -> Orchestrator {
        let caches = build_caches(&self.cache_settings, &self.clock, &self.file_stat);
        Orchestrator {
            block_analyzer: self.block_analyzer,
            component_analyzer: self.component_analyzer,
            fetcher: self.fetcher,
            tracker: Arc::new(ErrorTracker::new(self.clock.clone())),
            caches: RwLock::new(Arc::new(caches)),
            clock: self.clock,
            file_stat: self.file_stat,
            progress: self.progress,
        }
    }
}

fn build_caches(
    settings: &CacheSettings,
    clock: &Arc<dyn Clock>,
    file_stat: &Arc<dyn FileStatProvider>,
) -> CacheSet {
    let root = settings.dir.as_deref();
    CacheSet {
        settings: settings.clone(),
        blocks: Arc::new(ResultCache::new(
            WorkItemKind::Block,
            settings.ttl,
            root,
            clock.clone(),
            file_stat.clone(),
        )),
        components: Arc::new(ResultCache::new(
            WorkItemKind::Component,
            settings.ttl,
            root,
            clock.clone(),
            file_stat.clone(),
        )),
    }
}

/// Runs the analysis pipeline and keeps the state that outlives a run:
/// result caches and the error log.
pub struct Orchestrator {
    block_analyzer: Arc<dyn BlockAnalyzer>,
    component_analyzer: Arc<dyn ComponentAnalyzer>,
    fetcher: Option<Arc<PatternFetcher>>,
    clock: Arc<dyn Clock>,
    file_stat: Arc<dyn FileStatProvider>,
    caches: RwLock<Arc<CacheSet>>,
    tracker: Arc<ErrorTracker>,
    progress: ProgressReporter,
}

impl Orchestrator {
    pub fn builder(
        block_analyzer: Arc<dyn BlockAnalyzer>,
        component_analyzer: Arc<dyn ComponentAnalyzer>,
    ) -> OrchestratorBuilder {
        OrchestratorBuilder::new(block_analyzer, component_analyzer)
    }

    /// Run every phase and aggregate the outputs.
    ///
    /// With `continue_on_error` unset, the first analyzer failure stops new
    /// work: calls already in flight finish and are logged, then the run fails
    /// with [`DomainError::AnalysisAborted`] for the first failure in input
    /// order. Otherwise each failure is
    /// replaced by a result carrying one critical `analysis_failed` issue, so
    /// the output always holds one entry per discovered file.
    #[instrument(skip(self, options), fields(blocks = %options.block_dir.display(), components = %options.component_dir.display()))]
    pub async fn run(&self, options: &PipelineOptions) -> DomainResult<PipelineResult> {
        if options.batch_size == 0 {
            return Err(DomainError::ValidationFailed(
                "batch size must be at least 1".to_string(),
            ));
        }

        let errors_start = self.tracker.len().await;
        let caches = self.caches_for(&options.cache_settings()).await;
        let enabled = caches.settings.enabled;

        // Discovery
        self.progress.start(Phase::Discovery, 2, "discovering blocks and components");
        let block_paths = discovery::discover_blocks(&options.block_dir).await?;
        self.progress.emit(Phase::Discovery, 1, 2, Some(format!("{} block configs", block_paths.len())));
        let component_paths = discovery::discover_components(&options.component_dir).await?;
        self.progress.emit(
            Phase::Discovery,
            2,
            2,
            Some(format!("{} components", component_paths.len())),
        );
        info!(
            blocks = block_paths.len(),
            components = component_paths.len(),
            "discovery complete"
        );

        // Analysis
        let block_analyzer = self.block_analyzer.clone();
        let analyze_block: AnalyzeFn<BlockAnalysis> = Arc::new(move |path: PathBuf| {
            let analyzer = block_analyzer.clone();
            async move { analyzer.analyze(&path).await }.boxed()
        });
        let blocks = self
            .analyze_phase(
                Phase::AnalyzeBlocks,
                &block_paths,
                enabled.then(|| caches.blocks.clone()),
                analyze_block,
                |path, message| BlockAnalysis::failed(path, message),
                options,
            )
            .await?;

        let component_analyzer = self.component_analyzer.clone();
        let analyze_component: AnalyzeFn<ComponentAnalysis> = Arc::new(move |path: PathBuf| {
            let analyzer = component_analyzer.clone();
            async move { analyzer.analyze(&path).await }.boxed()
        });
        let components = self
            .analyze_phase(
                Phase::AnalyzeComponents,
                &component_paths,
                enabled.then(|| caches.components.clone()),
                analyze_component,
                |path, message| ComponentAnalysis::failed(path, message),
                options,
            )
            .await?;

        // Integration
        self.progress.start(Phase::ValidateIntegration, blocks.len(), "pairing blocks with components");
        let mut integrations = Vec::new();
        for (i, block) in blocks.iter().enumerate() {
            if let Some(pair) = integration::validate_block(block, &components) {
                integrations.push(pair);
            }
            self.progress.emit(
                Phase::ValidateIntegration,
                i + 1,
                blocks.len(),
                Some(block.slug.clone()),
            );
        }
        debug!(pairs = integrations.len(), "integration validated");

        // Pattern comparison
        let comparisons = if options.compare_official {
            Some(self.compare_patterns(&blocks).await)
        } else {
            None
        };

        // Test generation
        let generated_tests = if options.include_tests {
            let candidates: Vec<&BlockAnalysis> = blocks.iter().filter(|b| !b.is_failed()).collect();
            self.progress.start(Phase::GenerateTests, candidates.len(), "generating test skeletons");
            let mut tests = Vec::with_capacity(candidates.len());
            for (i, block) in candidates.iter().enumerate() {
                let test = test_generator::generate_test(block);
                self.progress.emit(
                    Phase::GenerateTests,
                    i + 1,
                    candidates.len(),
                    Some(test.file_name.clone()),
                );
                tests.push(test);
            }
            Some(tests)
        } else {
            None
        };

        // Report
        self.progress.start(Phase::GenerateReport, 1, "building report");
        let report = build_report(&ReportInput {
            blocks: &blocks,
            components: &components,
            integrations: &integrations,
            comparisons: comparisons.as_deref(),
            severity: options.severity,
            generated_at: self.clock.now(),
        });
        self.progress.emit(Phase::GenerateReport, 1, 1, None);

        let errors = self.tracker.errors_since(errors_start).await;
        let error_summary = ErrorSummary::from_errors(&errors);
        info!(
            blocks = blocks.len(),
            components = components.len(),
            issues = report.counts.total(),
            failed = report.failed_items,
            "pipeline complete"
        );

        Ok(PipelineResult {
            blocks,
            components,
            integrations,
            comparisons,
            generated_tests,
            report,
            errors,
            error_summary,
        })
    }

    /// Analyze `paths` with at most `options.batch_size` calls in flight.
    async fn analyze_phase<T>(
        &self,
        phase: Phase,
        paths: &[PathBuf],
        cache: Option<Arc<ResultCache<T>>>,
        analyze: AnalyzeFn<T>,
        failed: fn(&Path, String) -> T,
        options: &PipelineOptions,
    ) -> DomainResult<Vec<T>>
    where
        T: Clone + Serialize + DeserializeOwned + Send + Sync + 'static,
    {
        let total = paths.len();
        self.progress.start(phase, total, format!("analyzing {total} files"));

        let semaphore = Arc::new(Semaphore::new(options.batch_size));
        let completed = Arc::new(Mutex::new(0usize));
        let aborted = Arc::new(AtomicBool::new(false));
        let mut handles = Vec::with_capacity(total);

        for path in paths {
            let permit = semaphore
                .clone()
                .acquire_owned()
                .await
                .map_err(|_| DomainError::ExecutionFailed("analysis semaphore closed".to_string()))?;
            if aborted.load(Ordering::SeqCst) {
                break;
            }

            let path = path.clone();
            let cache = cache.clone();
            let analyze = analyze.clone();
            let progress = self.progress.clone();
            let completed = completed.clone();
            let aborted = aborted.clone();
            let stop_on_error = !options.continue_on_error;

            handles.push(tokio::spawn(async move {
                let outcome = analyze_cached(&path, cache.as_deref(), &analyze).await;
                drop(permit);
                if outcome.is_err() && stop_on_error {
                    aborted.store(true, Ordering::SeqCst);
                }
                let mut done = completed.lock().await;
                *done += 1;
                progress.emit(phase, *done, total, Some(path.display().to_string()));
                outcome
            }));
        }

        // Tasks already in flight run to completion so every failure is logged.
        let mut results = Vec::with_capacity(total);
        let mut first_failure: Option<(String, AnalyzerError)> = None;
        for (path, handle) in paths.iter().zip(handles) {
            let outcome = handle.await.unwrap_or_else(|err| {
                Err(AnalyzerError::Failed(format!("analyzer task failed: {err}")))
            });
            match outcome {
                Ok(value) => results.push(value),
                Err(err) => {
                    let item = path.display().to_string();
                    self.tracker
                        .record(phase, item.clone(), err.kind(), err.to_string())
                        .await;
                    if options.continue_on_error {
                        results.push(failed(path, err.to_string()));
                    } else if first_failure.is_none() {
                        first_failure = Some((item, err));
                    }
                }
            }
        }

        if let Some((item, source)) = first_failure {
            return Err(DomainError::AnalysisAborted {
                phase: phase.as_str().to_string(),
                item,
                source,
            });
        }

        debug!(phase = %phase, results = results.len(), "phase complete");
        Ok(results)
    }

    async fn compare_patterns(&self, blocks: &[BlockAnalysis]) -> Vec<PatternComparison> {
        let total = blocks.len();
        self.progress.start(Phase::ComparePatterns, total, "fetching reference patterns");

        let references: Vec<ReferenceUnit> = match &self.fetcher {
            Some(fetcher) => {
                let fetched = fetcher.fetch_all().await;
                for failure in &fetched.failures {
                    self.tracker
                        .record(
                            Phase::ComparePatterns,
                            failure.source.name.clone(),
                            AnalysisErrorKind::Remote,
                            failure.error.to_string(),
                        )
                        .await;
                }
                fetched.units
            }
            None => {
                warn!("pattern comparison requested without a reference fetcher");
                Vec::new()
            }
        };

        let mut comparisons = Vec::with_capacity(total);
        for (i, block) in blocks.iter().enumerate() {
            if !block.is_failed() {
                comparisons.push(pattern_comparator::compare_block(block, &references));
            }
            self.progress.emit(Phase::ComparePatterns, i + 1, total, Some(block.slug.clone()));
        }
        comparisons
    }

    async fn caches_for(&self, settings: &CacheSettings) -> Arc<CacheSet> {
        {
            let current = self.caches.read().await;
            if current.settings == *settings {
                return current.clone();
            }
        }
        debug!(enabled = settings.enabled, dir = ?settings.dir, "switching cache settings");
        let fresh = Arc::new(build_caches(settings, &self.clock, &self.file_stat));
        *self.caches.write().await = fresh.clone();
        fresh
    }

    /// Drop every cached result, in memory and on disk.
    pub async fn clear_cache(&self) {
        let caches = self.caches.read().await.clone();
        caches.blocks.clear().await;
        caches.components.clear().await;
        info!(dir = ?caches.settings.dir, "result cache cleared");
    }

    pub async fn cache_stats(&self) -> CacheStats {
        let caches = self.caches.read().await.clone();
        CacheStats {
            enabled: caches.settings.enabled,
            disk_dir: caches
                .settings
                .dir
                .as_ref()
                .map(|dir| dir.display().to_string()),
            blocks: caches.blocks.stats().await,
            components: caches.components.stats().await,
        }
    }

    /// Source paths with a result in the disk tier for `kind`.
    pub async fn indexed_paths(&self, kind: WorkItemKind) -> Vec<String> {
        let caches = self.caches.read().await.clone();
        let mut paths = match kind {
            WorkItemKind::Block => caches.blocks.indexed_paths().await,
            WorkItemKind::Component => caches.components.indexed_paths().await,
        };
        paths.sort();
        paths
    }

    /// Every failure recorded since construction or the last reset.
    pub async fn errors(&self) -> Vec<AnalysisError> {
        self.tracker.errors().await
    }

    pub async fn error_summary(&self) -> ErrorSummary {
        self.tracker.summary().await
    }

    pub async fn reset_errors(&self) {
        self.tracker.reset().await;
    }
}

async fn analyze_cached<T>(
    path: &Path,
    cache: Option<&ResultCache<T>>,
    analyze: &AnalyzeFn<T>,
) -> Result<T, AnalyzerError>
where
    T: Clone + Serialize + DeserializeOwned + Send + Sync,
{
    if let Some(cache) = cache {
        if let Some(hit) = cache.get(path).await {
            trace!(path = %path.display(), "cache hit");
            return Ok(hit);
        }
    }

    let value = analyze(path.to_path_buf()).await?;
    if let Some(cache) = cache {
        cache.put(path, value.clone()).await;
    }
    Ok(value)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::system::{ManualClock, MemoryFileStat};
    use crate::domain::models::{Issue, IssueType, Severity, UnitFeatures};
    use async_trait::async_trait;
    use std::collections::HashSet;
    use std::sync::atomic::AtomicUsize;
    use std::time::Duration;

    #[derive(Default)]
    struct StubBlocks {
        calls: AtomicUsize,
        failing: HashSet<String>,
    }

    #[async_trait]
    impl BlockAnalyzer for StubBlocks {
        async fn analyze(&self, path: &Path) -> Result<BlockAnalysis, AnalyzerError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            let dir = path
                .parent()
                .and_then(Path::file_name)
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_default();
            if self.failing.contains(&dir) {
                return Err(AnalyzerError::Syntax {
                    path: path.to_path_buf(),
                    message: "unbalanced braces".to_string(),
                });
            }
            Ok(BlockAnalysis {
                path: path.to_path_buf(),
                slug: dir.to_lowercase(),
                interface_name: None,
                fields: Vec::new(),
                features: UnitFeatures::default(),
                issues: vec![Issue::new(IssueType::Structure, Severity::Medium, "no fields")],
            })
        }
    }

    struct StubComponents;

    #[async_trait]
    impl ComponentAnalyzer for StubComponents {
        async fn analyze(&self, path: &Path) -> Result<ComponentAnalysis, AnalyzerError> {
            Ok(ComponentAnalysis {
                path: path.to_path_buf(),
                name: crate::domain::models::derive_component_name(path),
                props: Vec::new(),
                issues: Vec::new(),
            })
        }
    }

    fn project(blocks: &[&str]) -> tempfile::TempDir {
        let dir = tempfile::tempdir().unwrap();
        for name in blocks {
            let block_dir = dir.path().join(name);
            std::fs::create_dir_all(&block_dir).unwrap();
            std::fs::write(block_dir.join("config.ts"), "export {}").unwrap();
        }
        dir
    }

    fn orchestrator(blocks: Arc<StubBlocks>) -> Orchestrator {
        Orchestrator::builder(blocks, Arc::new(StubComponents)).build()
    }

    #[tokio::test]
    async fn test_zero_batch_size_is_rejected() {
        let orch = orchestrator(Arc::new(StubBlocks::default()));
        let options = PipelineOptions {
            batch_size: 0,
            ..PipelineOptions::default()
        };
        assert!(matches!(
            orch.run(&options).await,
            Err(DomainError::ValidationFailed(_))
        ));
    }

    #[tokio::test]
    async fn test_failure_is_substituted_and_tracked() {
        let dir = project(&["Alpha", "Beta", "Gamma"]);
        let blocks = Arc::new(StubBlocks {
            failing: HashSet::from(["Beta".to_string()]),
            ..StubBlocks::default()
        });
        let orch = orchestrator(blocks);
        let options = PipelineOptions {
            enable_cache: false,
            ..PipelineOptions::new(dir.path(), dir.path())
        };

        let result = orch.run(&options).await.unwrap();
        assert_eq!(result.blocks.len(), 3);
        assert!(result.blocks[1].is_failed());
        assert_eq!(result.blocks[1].slug, "beta");
        assert_eq!(result.errors.len(), 1);
        assert_eq!(result.errors[0].kind, AnalysisErrorKind::Syntax);
        assert_eq!(result.error_summary.critical.len(), 1);
        assert_eq!(orch.errors().await.len(), 1);
    }

    #[tokio::test]
    async fn test_fail_fast_aborts() {
        let dir = project(&["Alpha", "Beta"]);
        let blocks = Arc::new(StubBlocks {
            failing: HashSet::from(["Alpha".to_string()]),
            ..StubBlocks::default()
        });
        let orch = orchestrator(blocks);
        let options = PipelineOptions {
            continue_on_error: false,
            enable_cache: false,
            ..PipelineOptions::new(dir.path(), dir.path())
        };

        let err = orch.run(&options).await.unwrap_err();
        match err {
            DomainError::AnalysisAborted { phase, item, .. } => {
                assert_eq!(phase, "analyze_blocks");
                assert!(item.ends_with("config.ts"));
            }
            other => panic!("unexpected error: {other}"),
        }
        assert_eq!(orch.error_summary().await.total, 1);
    }

    #[tokio::test]
    async fn test_second_run_is_served_from_cache() {
        let dir = project(&["Alpha", "Beta"]);
        let blocks = Arc::new(StubBlocks::default());
        let clock = Arc::new(ManualClock::default());
        let files = Arc::new(MemoryFileStat::new());
        for name in ["Alpha", "Beta"] {
            files.touch(
                &dir.path().join(name).join("config.ts"),
                clock.now() - chrono::Duration::seconds(30),
            );
        }
        let orch = Orchestrator::builder(blocks.clone(), Arc::new(StubComponents))
            .with_clock(clock.clone())
            .with_file_stat(files)
            .build();
        let options = PipelineOptions::new(dir.path(), dir.path());

        let first = orch.run(&options).await.unwrap();
        assert_eq!(blocks.calls.load(Ordering::SeqCst), 2);

        clock.advance(Duration::from_secs(10));
        let second = orch.run(&options).await.unwrap();
        assert_eq!(blocks.calls.load(Ordering::SeqCst), 2);
        assert_eq!(first.blocks, second.blocks);

        let stats = orch.cache_stats().await;
        assert!(stats.enabled);
        assert_eq!(stats.blocks.hits, 2);

        orch.clear_cache().await;
        orch.run(&options).await.unwrap();
        assert_eq!(blocks.calls.load(Ordering::SeqCst), 4);
    }

    #[tokio::test]
    async fn test_progress_is_monotonic_per_phase() {
        let dir = project(&["A", "B", "C", "D", "E", "F"]);
        let (progress, mut rx) = ProgressReporter::channel();
        let orch = Orchestrator::builder(Arc::new(StubBlocks::default()), Arc::new(StubComponents))
            .with_progress(progress)
            .build();
        let options = PipelineOptions {
            batch_size: 2,
            enable_cache: false,
            ..PipelineOptions::new(dir.path(), dir.path())
        };
        orch.run(&options).await.unwrap();
        drop(orch);

        let mut block_events = Vec::new();
        let mut integration_events = Vec::new();
        let mut phases = Vec::new();
        while let Some(event) = rx.recv().await {
            if phases.last() != Some(&event.phase) {
                phases.push(event.phase);
            }
            match event.phase {
                Phase::AnalyzeBlocks => block_events.push(event.current),
                Phase::ValidateIntegration => integration_events.push(event.current),
                _ => {}
            }
        }
        assert_eq!(block_events, vec![0, 1, 2, 3, 4, 5, 6]);
        assert_eq!(integration_events, vec![0, 1, 2, 3, 4, 5, 6]);
        assert_eq!(
            phases,
            vec![
                Phase::Discovery,
                Phase::AnalyzeBlocks,
                Phase::AnalyzeComponents,
                Phase::ValidateIntegration,
                Phase::GenerateReport,
            ]
        );
    }
}
