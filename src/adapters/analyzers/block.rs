use async_trait::async_trait;
use std::path::Path;
use tracing::debug;

use crate::domain::errors::AnalyzerError;
use crate::domain::models::{fallback_block_slug, BlockAnalysis};
use crate::domain::ports::BlockAnalyzer;
use crate::services::{checks, unit_scan};

/// Reads a block config from disk and runs the text scanner and block checks.
#[derive(Debug, Clone, Copy, Default)]
pub struct TextBlockAnalyzer;

impl TextBlockAnalyzer {
    pub const fn new() -> Self {
        Self
    }

    /// Analyze already-loaded source text.
    pub fn analyze_source(path: &Path, source: &str) -> Result<BlockAnalysis, AnalyzerError> {
        unit_scan::check_balance(source).map_err(|message| AnalyzerError::Syntax {
            path: path.to_path_buf(),
            message,
        })?;

        let scanned = unit_scan::scan_block(source);
        let issues = checks::block_issues(&scanned);
        let slug = scanned
            .slug
            .clone()
            .unwrap_or_else(|| fallback_block_slug(path));

        Ok(BlockAnalysis {
            path: path.to_path_buf(),
            slug,
            interface_name: scanned.interface_name,
            fields: scanned.fields,
            features: scanned.features,
            issues,
        })
    }
}

#[async_trait]
impl BlockAnalyzer for TextBlockAnalyzer {
    async fn analyze(&self, path: &Path) -> Result<BlockAnalysis, AnalyzerError> {
        let source = tokio::fs::read_to_string(path)
            .await
            .map_err(|err| AnalyzerError::from_io(path, &err))?;
        let analysis = Self::analyze_source(path, &source)?;
        debug!(
            path = %path.display(),
            slug = %analysis.slug,
            fields = analysis.fields.len(),
            issues = analysis.issues.len(),
            "block analyzed"
        );
        Ok(analysis)
    }
}
