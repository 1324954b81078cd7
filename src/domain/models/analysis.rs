//! Per-item analysis results.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use super::issue::{Issue, IssueType};

/// Feature markers found in a block or reference configuration.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UnitFeatures {
    pub has_validation: bool,
    pub has_access: bool,
    pub has_hooks: bool,
    pub has_admin: bool,
}

/// A field declared by a block configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldSummary {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub field_type: Option<String>,
    pub required: bool,
    pub has_validation: bool,
}

/// Result of analyzing one block configuration file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BlockAnalysis {
    pub path: PathBuf,
    pub slug: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub interface_name: Option<String>,
    pub fields: Vec<FieldSummary>,
    pub features: UnitFeatures,
    pub issues: Vec<Issue>,
}

impl BlockAnalysis {
    /// Synthetic result for a block whose analyzer failed.
    pub fn failed(path: &Path, message: impl Into<String>) -> Self {
        Self {
            path: path.to_path_buf(),
            slug: fallback_block_slug(path),
            interface_name: None,
            fields: Vec::new(),
            features: UnitFeatures::default(),
            issues: vec![Issue::analysis_failed(message)],
        }
    }

    pub fn is_failed(&self) -> bool {
        has_failure(&self.issues)
    }

    pub fn field_names(&self) -> impl Iterator<Item = &str> {
        self.fields.iter().map(|f| f.name.as_str())
    }
}

/// Result of analyzing one UI component file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ComponentAnalysis {
    pub path: PathBuf,
    pub name: String,
    pub props: Vec<String>,
    pub issues: Vec<Issue>,
}

impl ComponentAnalysis {
    /// Synthetic result for a component whose analyzer failed.
    pub fn failed(path: &Path, message: impl Into<String>) -> Self {
        Self {
            path: path.to_path_buf(),
            name: derive_component_name(path),
            props: Vec::new(),
            issues: vec![Issue::analysis_failed(message)],
        }
    }

    pub fn is_failed(&self) -> bool {
        has_failure(&self.issues)
    }
}

/// A block paired with its component by the naming rule.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IntegrationResult {
    pub block_slug: String,
    pub block_path: PathBuf,
    pub component_name: String,
    pub component_path: PathBuf,
    pub missing_props: Vec<String>,
    pub issues: Vec<Issue>,
}

fn has_failure(issues: &[Issue]) -> bool {
    issues
        .iter()
        .any(|issue| issue.issue_type == IssueType::AnalysisFailed)
}

/// Component name implied by a file path.
///
/// `Hero/Component.tsx` and `Hero/index.tsx` name the directory; any other
/// file names itself.
pub fn derive_component_name(path: &Path) -> String {
    let stem = file_stem(path);
    if stem == "Component" || stem == "index" {
        parent_name(path).unwrap_or(stem)
    } else {
        stem
    }
}

/// Slug implied by a block config path when the file could not be read.
pub fn fallback_block_slug(path: &Path) -> String {
    let stem = file_stem(path);
    let base = if stem == "config" {
        parent_name(path).unwrap_or(stem)
    } else {
        stem
    };
    to_kebab_case(&base)
}

fn file_stem(path: &Path) -> String {
    path.file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default()
}

fn parent_name(path: &Path) -> Option<String> {
    path.parent()
        .and_then(Path::file_name)
        .map(|s| s.to_string_lossy().into_owned())
}

/// `HeroBlock` and `hero_block` both become `hero-block`.
pub fn to_kebab_case(name: &str) -> String {
    let mut out = String::with_capacity(name.len() + 4);
    let mut prev_lower = false;
    for ch in name.chars() {
        if ch == '_' || ch == ' ' || ch == '-' {
            if !out.ends_with('-') && !out.is_empty() {
                out.push('-');
            }
            prev_lower = false;
        } else if ch.is_uppercase() {
            if prev_lower && !out.ends_with('-') {
                out.push('-');
            }
            out.extend(ch.to_lowercase());
            prev_lower = false;
        } else {
            out.push(ch);
            prev_lower = ch.is_lowercase() || ch.is_ascii_digit();
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_derive_component_name() {
        assert_eq!(
            derive_component_name(Path::new("src/blocks/Hero/Component.tsx")),
            "Hero"
        );
        assert_eq!(
            derive_component_name(Path::new("src/components/CallToAction.tsx")),
            "CallToAction"
        );
        assert_eq!(
            derive_component_name(Path::new("src/components/Media/index.tsx")),
            "Media"
        );
    }

    #[test]
    fn test_fallback_block_slug() {
        assert_eq!(
            fallback_block_slug(Path::new("src/blocks/CallToAction/config.ts")),
            "call-to-action"
        );
        assert_eq!(
            fallback_block_slug(Path::new("src/blocks/media_block.ts")),
            "media-block"
        );
    }

    #[test]
    fn test_failed_block_is_marked() {
        let block = BlockAnalysis::failed(Path::new("src/blocks/Hero/config.ts"), "boom");
        assert!(block.is_failed());
        assert_eq!(block.slug, "hero");
        assert_eq!(block.issues.len(), 1);
    }
}
