//! Content checks over scanned blocks and components.

use regex::Regex;
use std::sync::LazyLock;

use crate::domain::models::{Issue, IssueType, Severity};
use crate::services::unit_scan::ScannedBlock;

static IMG_TAG_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"<img\b[^>]*>").unwrap());
static ALT_ATTR_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\balt\s*=").unwrap());

/// Issues for a block config.
pub fn block_issues(block: &ScannedBlock) -> Vec<Issue> {
    let mut issues = Vec::new();

    if block.slug.is_none() {
        issues.push(Issue::new(
            IssueType::Structure,
            Severity::Critical,
            "block does not declare a slug",
        ));
    }
    if block.fields.is_empty() {
        issues.push(Issue::new(
            IssueType::Structure,
            Severity::Medium,
            "block declares no fields",
        ));
    }
    if !block.features.has_access {
        issues.push(Issue::new(
            IssueType::AccessControl,
            Severity::High,
            "block has no access rules",
        ));
    }
    for field in block.fields.iter().filter(|f| f.required && !f.has_validation) {
        issues.push(
            Issue::new(
                IssueType::Validation,
                Severity::Low,
                format!("required field '{}' has no validate function", field.name),
            )
            .with_field(field.name.clone()),
        );
    }
    if !block.features.has_admin {
        issues.push(Issue::new(
            IssueType::AdminConfig,
            Severity::Low,
            "block has no admin configuration",
        ));
    }
    if block.interface_name.is_none() {
        issues.push(Issue::new(
            IssueType::Typing,
            Severity::Low,
            "block does not set interfaceName",
        ));
    }

    issues
}

/// Issues for a component source and the props scanned from it.
pub fn component_issues(source: &str, props: &[String]) -> Vec<Issue> {
    let mut issues = Vec::new();

    let img_tags: Vec<&str> = IMG_TAG_RE.find_iter(source).map(|m| m.as_str()).collect();
    let missing_alt = img_tags.iter().filter(|tag| !ALT_ATTR_RE.is_match(tag)).count();
    if missing_alt > 0 {
        issues.push(Issue::new(
            IssueType::Accessibility,
            Severity::High,
            format!("{missing_alt} <img> element(s) without alt text"),
        ));
    }
    if !img_tags.is_empty() {
        issues.push(Issue::new(
            IssueType::Performance,
            Severity::Medium,
            "raw <img> used instead of an optimized image component",
        ));
    }
    if source.contains("dangerouslySetInnerHTML") {
        issues.push(Issue::new(
            IssueType::Security,
            Severity::Critical,
            "dangerouslySetInnerHTML renders unsanitized markup",
        ));
    }
    if props.is_empty() {
        issues.push(Issue::new(
            IssueType::Typing,
            Severity::Low,
            "component declares no props",
        ));
    }

    issues
}
