//! Pipeline phases and progress events.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Pipeline phases in execution order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Phase {
    Discovery,
    AnalyzeBlocks,
    AnalyzeComponents,
    ValidateIntegration,
    ComparePatterns,
    GenerateTests,
    GenerateReport,
}

impl Phase {
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Discovery => "discovery",
            Self::AnalyzeBlocks => "analyze_blocks",
            Self::AnalyzeComponents => "analyze_components",
            Self::ValidateIntegration => "validate_integration",
            Self::ComparePatterns => "compare_patterns",
            Self::GenerateTests => "generate_tests",
            Self::GenerateReport => "generate_report",
        }
    }
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A progress update. Not retained by the pipeline.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProgressEvent {
    pub phase: Phase,
    pub current: usize,
    pub total: usize,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}
