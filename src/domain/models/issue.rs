//! Issues reported by checks.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Issue severity, ordered from least to most severe.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Severity {
    Low,
    Medium,
    High,
    Critical,
}

impl Severity {
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Low => "low",
            Self::Medium => "medium",
            Self::High => "high",
            Self::Critical => "critical",
        }
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Category of an issue.
///
/// `AnalysisFailed` is reserved for synthetic results that stand in for an
/// item whose analyzer returned an error.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IssueType {
    AnalysisFailed,
    Validation,
    AccessControl,
    AdminConfig,
    Typing,
    Structure,
    Accessibility,
    Performance,
    Security,
    IntegrationMismatch,
}

impl IssueType {
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::AnalysisFailed => "analysis_failed",
            Self::Validation => "validation",
            Self::AccessControl => "access_control",
            Self::AdminConfig => "admin_config",
            Self::Typing => "typing",
            Self::Structure => "structure",
            Self::Accessibility => "accessibility",
            Self::Performance => "performance",
            Self::Security => "security",
            Self::IntegrationMismatch => "integration_mismatch",
        }
    }
}

impl fmt::Display for IssueType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single finding.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Issue {
    pub issue_type: IssueType,
    pub severity: Severity,
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub field: Option<String>,
}

impl Issue {
    pub fn new(issue_type: IssueType, severity: Severity, message: impl Into<String>) -> Self {
        Self {
            issue_type,
            severity,
            message: message.into(),
            field: None,
        }
    }

    #[must_use]
    pub fn with_field(mut self, field: impl Into<String>) -> Self {
        self.field = Some(field.into());
        self
    }

    /// The synthetic issue attached to an item whose analysis failed.
    pub fn analysis_failed(message: impl Into<String>) -> Self {
        Self::new(IssueType::AnalysisFailed, Severity::Critical, message)
    }
}

/// Which issues a report lists.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SeverityFilter {
    #[default]
    All,
    Critical,
    High,
}

impl SeverityFilter {
    /// Whether an issue of `severity` passes this filter.
    pub const fn admits(&self, severity: Severity) -> bool {
        match self {
            Self::All => true,
            Self::Critical => matches!(severity, Severity::Critical),
            Self::High => matches!(severity, Severity::Critical | Severity::High),
        }
    }

    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::All => "all",
            Self::Critical => "critical",
            Self::High => "high",
        }
    }
}

impl fmt::Display for SeverityFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SeverityFilter {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "all" => Ok(Self::All),
            "critical" => Ok(Self::Critical),
            "high" => Ok(Self::High),
            other => Err(format!(
                "invalid severity filter '{other}': expected all, critical or high"
            )),
        }
    }
}
