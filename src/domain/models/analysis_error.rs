//! Error records kept by the error tracker.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Typed classification of a recorded failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AnalysisErrorKind {
    NotFound,
    PermissionDenied,
    Syntax,
    Io,
    Analyzer,
    Remote,
}

impl AnalysisErrorKind {
    /// Kinds that indicate the project itself cannot be analyzed as-is.
    pub const fn is_critical(&self) -> bool {
        matches!(self, Self::NotFound | Self::PermissionDenied | Self::Syntax)
    }

    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::NotFound => "not_found",
            Self::PermissionDenied => "permission_denied",
            Self::Syntax => "syntax",
            Self::Io => "io",
            Self::Analyzer => "analyzer",
            Self::Remote => "remote",
        }
    }
}

/// One failure, with enough context to rebuild a post-run report.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnalysisError {
    pub phase: String,
    pub item: String,
    pub kind: AnalysisErrorKind,
    pub message: String,
    pub timestamp: DateTime<Utc>,
}

/// Aggregate view over the error log.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorSummary {
    pub total: usize,
    pub by_phase: BTreeMap<String, usize>,
    pub critical: Vec<AnalysisError>,
}

impl ErrorSummary {
    /// Counts per phase and the subset whose kind is critical.
    pub fn from_errors(errors: &[AnalysisError]) -> Self {
        let mut by_phase: BTreeMap<String, usize> = BTreeMap::new();
        for err in errors {
            *by_phase.entry(err.phase.clone()).or_default() += 1;
        }
        Self {
            total: errors.len(),
            by_phase,
            critical: errors
                .iter()
                .filter(|err| err.kind.is_critical())
                .cloned()
                .collect(),
        }
    }

    pub fn has_errors(&self) -> bool {
        self.total > 0
    }
}
