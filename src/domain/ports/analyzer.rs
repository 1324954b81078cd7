use async_trait::async_trait;
use std::path::Path;

use crate::domain::errors::AnalyzerError;
use crate::domain::models::{BlockAnalysis, ComponentAnalysis};

/// Analyzes one block configuration file.
///
/// Implementations must not have side effects beyond reading `path`, and
/// either return a complete result or an error.
#[async_trait]
pub trait BlockAnalyzer: Send + Sync {
    async fn analyze(&self, path: &Path) -> Result<BlockAnalysis, AnalyzerError>;
}

/// Analyzes one UI component file. Same contract as [`BlockAnalyzer`].
#[async_trait]
pub trait ComponentAnalyzer: Send + Sync {
    async fn analyze(&self, path: &Path) -> Result<ComponentAnalysis, AnalyzerError>;
}
