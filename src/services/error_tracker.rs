//! Append-only log of per-item failures.

use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::error;

use crate::domain::models::{AnalysisError, AnalysisErrorKind, ErrorSummary, Phase};
use crate::domain::ports::Clock;

pub struct ErrorTracker {
    errors: RwLock<Vec<AnalysisError>>,
    clock: Arc<dyn Clock>,
}

impl ErrorTracker {
    pub fn new(clock: Arc<dyn Clock>) -> Self {
        Self {
            errors: RwLock::new(Vec::new()),
            clock,
        }
    }

    /// Append a failure and return the stored record.
    pub async fn record(
        &self,
        phase: Phase,
        item: impl Into<String>,
        kind: AnalysisErrorKind,
        message: impl Into<String>,
    ) -> AnalysisError {
        let record = AnalysisError {
            phase: phase.as_str().to_string(),
            item: item.into(),
            kind,
            message: message.into(),
            timestamp: self.clock.now(),
        };
        error!(
            phase = %record.phase,
            item = %record.item,
            kind = record.kind.as_str(),
            error = %record.message,
            "analysis error recorded"
        );
        self.errors.write().await.push(record.clone());
        record
    }

    /// All recorded failures in insertion order.
    pub async fn errors(&self) -> Vec<AnalysisError> {
        self.errors.read().await.clone()
    }

    pub async fn len(&self) -> usize {
        self.errors.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.errors.read().await.is_empty()
    }

    /// Failures recorded after the first `start` entries.
    pub async fn errors_since(&self, start: usize) -> Vec<AnalysisError> {
        self.errors
            .read()
            .await
            .get(start..)
            .map(<[AnalysisError]>::to_vec)
            .unwrap_or_default()
    }

    /// Counts per phase and the subset whose kind is critical.
    pub async fn summary(&self) -> ErrorSummary {
        ErrorSummary::from_errors(&self.errors.read().await)
    }

    pub async fn reset(&self) {
        self.errors.write().await.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::system::ManualClock;

    fn tracker() -> ErrorTracker {
        ErrorTracker::new(Arc::new(ManualClock::default()))
    }

    #[tokio::test]
    async fn test_record_and_summary() {
        let tracker = tracker();
        tracker
            .record(
                Phase::AnalyzeBlocks,
                "blocks/Hero/config.ts",
                AnalysisErrorKind::Syntax,
                "unbalanced braces",
            )
            .await;
        tracker
            .record(
                Phase::AnalyzeBlocks,
                "blocks/Cta/config.ts",
                AnalysisErrorKind::Analyzer,
                "unexpected shape",
            )
            .await;
        tracker
            .record(
                Phase::AnalyzeComponents,
                "blocks/Cta/Component.tsx",
                AnalysisErrorKind::PermissionDenied,
                "permission denied",
            )
            .await;

        let summary = tracker.summary().await;
        assert_eq!(summary.total, 3);
        assert_eq!(summary.by_phase.get("analyze_blocks"), Some(&2));
        assert_eq!(summary.by_phase.get("analyze_components"), Some(&1));
        assert_eq!(summary.critical.len(), 2);
        assert!(summary
            .critical
            .iter()
            .all(|err| err.kind != AnalysisErrorKind::Analyzer));
    }

    #[tokio::test]
    async fn test_errors_keep_order_and_reset_clears() {
        let tracker = tracker();
        for i in 0..3 {
            tracker
                .record(
                    Phase::ComparePatterns,
                    format!("source-{i}"),
                    AnalysisErrorKind::Remote,
                    "timeout",
                )
                .await;
        }
        let items: Vec<String> = tracker.errors().await.into_iter().map(|e| e.item).collect();
        assert_eq!(items, vec!["source-0", "source-1", "source-2"]);

        let later: Vec<String> = tracker
            .errors_since(2)
            .await
            .into_iter()
            .map(|e| e.item)
            .collect();
        assert_eq!(later, vec!["source-2"]);
        assert!(tracker.errors_since(10).await.is_empty());

        tracker.reset().await;
        assert!(tracker.is_empty().await);
        assert!(!tracker.summary().await.has_errors());
    }
}
