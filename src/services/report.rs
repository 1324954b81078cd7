//! Aggregated issue report for a pipeline run.

use chrono::{DateTime, Utc};

use crate::domain::models::{
    BlockAnalysis, ComponentAnalysis, IntegrationResult, Issue, IssueCounts, IssueOrigin,
    PatternComparison, Report, ReportIssue, SeverityFilter,
};

/// Inputs the report is built from.
pub struct ReportInput<'a> {
    pub blocks: &'a [BlockAnalysis],
    pub components: &'a [ComponentAnalysis],
    pub integrations: &'a [IntegrationResult],
    pub comparisons: Option<&'a [PatternComparison]>,
    pub severity: SeverityFilter,
    pub generated_at: DateTime<Utc>,
}

/// Count every issue by severity and list the ones the filter admits,
/// most severe first. Ties keep block, component, integration order.
pub fn build_report(input: &ReportInput<'_>) -> Report {
    let mut counts = IssueCounts::default();
    let mut issues = Vec::new();

    let mut collect = |origin: IssueOrigin, item: String, found: &[Issue]| {
        for issue in found {
            counts.add(issue.severity);
            if input.severity.admits(issue.severity) {
                issues.push(ReportIssue {
                    origin,
                    item: item.clone(),
                    issue: issue.clone(),
                });
            }
        }
    };

    for block in input.blocks {
        collect(IssueOrigin::Block, block.path.display().to_string(), &block.issues);
    }
    for component in input.components {
        collect(
            IssueOrigin::Component,
            component.path.display().to_string(),
            &component.issues,
        );
    }
    for integration in input.integrations {
        collect(
            IssueOrigin::Integration,
            format!("{} -> {}", integration.block_slug, integration.component_name),
            &integration.issues,
        );
    }

    issues.sort_by(|a, b| b.issue.severity.cmp(&a.issue.severity));

    let failed_items = input.blocks.iter().filter(|b| b.is_failed()).count()
        + input.components.iter().filter(|c| c.is_failed()).count();
    let blocks_with_drift = input
        .comparisons
        .map_or(0, |c| c.iter().filter(|c| !c.differences.is_empty()).count());

    Report {
        generated_at: input.generated_at,
        severity_filter: input.severity,
        counts,
        blocks_analyzed: input.blocks.len(),
        components_analyzed: input.components.len(),
        failed_items,
        integration_pairs: input.integrations.len(),
        blocks_with_drift,
        issues,
    }
}
