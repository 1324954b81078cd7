use async_trait::async_trait;
use std::path::Path;
use tracing::debug;

use crate::domain::errors::AnalyzerError;
use crate::domain::models::{derive_component_name, ComponentAnalysis};
use crate::domain::ports::ComponentAnalyzer;
use crate::services::{checks, unit_scan};

/// Reads a component from disk and runs the prop scanner and component checks.
#[derive(Debug, Clone, Copy, Default)]
pub struct TextComponentAnalyzer;

impl TextComponentAnalyzer {
    pub const fn new() -> Self {
        Self
    }

    pub fn analyze_source(path: &Path, source: &str) -> Result<ComponentAnalysis, AnalyzerError> {
        unit_scan::check_balance(source).map_err(|message| AnalyzerError::Syntax {
            path: path.to_path_buf(),
            message,
        })?;

        let props = unit_scan::scan_component_props(source);
        let issues = checks::component_issues(source, &props);
        Ok(ComponentAnalysis {
            path: path.to_path_buf(),
            name: derive_component_name(path),
            props,
            issues,
        })
    }
}

#[async_trait]
impl ComponentAnalyzer for TextComponentAnalyzer {
    async fn analyze(&self, path: &Path) -> Result<ComponentAnalysis, AnalyzerError> {
        let source = tokio::fs::read_to_string(path)
            .await
            .map_err(|err| AnalyzerError::from_io(path, &err))?;
        let analysis = Self::analyze_source(path, &source)?;
        debug!(
            path = %path.display(),
            name = %analysis.name,
            props = analysis.props.len(),
            "component analyzed"
        );
        Ok(analysis)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::models::IssueType;

    #[tokio::test]
    async fn test_analyze_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("Hero").join("Component.tsx");
        std::fs::create_dir_all(path.parent().unwrap()).unwrap();
        std::fs::write(
            &path,
            "type Props = { title: string }\nexport const HeroBlock = ({ title }: Props) => <h1>{title}</h1>\n",
        )
        .unwrap();

        let analysis = TextComponentAnalyzer::new().analyze(&path).await.unwrap();
        assert_eq!(analysis.name, "Hero");
        assert_eq!(analysis.props, vec!["title"]);
        assert!(analysis.issues.is_empty());
    }

    #[test]
    fn test_raw_image_is_flagged() {
        let analysis = TextComponentAnalyzer::analyze_source(
            Path::new("src/components/Logo.tsx"),
            "export const Logo = ({ src }) => <img src={src} />",
        )
        .unwrap();
        assert_eq!(analysis.name, "Logo");
        let kinds: Vec<_> = analysis.issues.iter().map(|i| i.issue_type).collect();
        assert_eq!(kinds, vec![IssueType::Accessibility, IssueType::Performance]);
    }
}
