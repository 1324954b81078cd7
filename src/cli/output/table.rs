//! Table output formatting for CLI commands
//!
//! Renders reports, cache statistics and reference units using comfy-table.
//! Severity cells are color-coded unless colors are disabled.

use comfy_table::{presets, Attribute, Cell, Color, ContentArrangement, Table};
use std::env;

use super::truncate;
use crate::domain::models::{
    CacheStats, NamespaceStats, PatternComparison, ReferenceUnit, Report, ReportIssue, Severity,
};

/// Table formatter for CLI output
pub struct TableFormatter {
    /// Whether to use colors in output
    use_colors: bool,
    /// Maximum width for tables (None = auto)
    max_width: Option<u16>,
}

impl TableFormatter {
    pub fn new() -> Self {
        Self {
            use_colors: supports_color(),
            max_width: None,
        }
    }

    pub const fn with_config(use_colors: bool, max_width: Option<u16>) -> Self {
        Self {
            use_colors,
            max_width,
        }
    }

    /// Headline numbers of a report.
    pub fn format_summary(&self, report: &Report) -> String {
        let mut table = self.create_base_table();
        table.set_header(vec![header("Metric"), header("Value")]);

        let rows = [
            ("Blocks analyzed", report.blocks_analyzed.to_string()),
            ("Components analyzed", report.components_analyzed.to_string()),
            ("Failed items", report.failed_items.to_string()),
            ("Integration pairs", report.integration_pairs.to_string()),
            ("Blocks with drift", report.blocks_with_drift.to_string()),
            ("Critical", report.counts.critical.to_string()),
            ("High", report.counts.high.to_string()),
            ("Medium", report.counts.medium.to_string()),
            ("Low", report.counts.low.to_string()),
        ];
        for (label, value) in rows {
            table.add_row(vec![Cell::new(label), Cell::new(value)]);
        }

        table.to_string()
    }

    /// One row per reported issue, most severe first.
    pub fn format_issues(&self, issues: &[ReportIssue]) -> String {
        let mut table = self.create_base_table();
        table.set_header(vec![
            header("Severity"),
            header("Origin"),
            header("Item"),
            header("Type"),
            header("Message"),
        ]);

        for entry in issues {
            let message = match &entry.issue.field {
                Some(field) => format!("{} ({field})", entry.issue.message),
                None => entry.issue.message.clone(),
            };
            table.add_row(vec![
                self.severity_cell(entry.issue.severity),
                Cell::new(entry.origin.as_str()),
                Cell::new(truncate(&entry.item, 40)),
                Cell::new(entry.issue.issue_type.as_str()),
                Cell::new(truncate(&message, 60)),
            ]);
        }

        table.to_string()
    }

    /// Local blocks against their closest reference unit.
    pub fn format_comparisons(&self, comparisons: &[PatternComparison]) -> String {
        let mut table = self.create_base_table();
        table.set_header(vec![
            header("Block"),
            header("Reference"),
            header("Similarity"),
            header("Differences"),
        ]);

        for comparison in comparisons {
            let (reference, similarity) = comparison.reference.as_ref().map_or_else(
                || ("-".to_string(), "-".to_string()),
                |m| (format!("{}:{}", m.source, m.slug), format!("{:.2}", m.similarity)),
            );
            let differences = if comparison.differences.is_empty() {
                "none".to_string()
            } else {
                comparison
                    .differences
                    .iter()
                    .map(|d| d.message.as_str())
                    .collect::<Vec<_>>()
                    .join("; ")
            };
            table.add_row(vec![
                Cell::new(&comparison.block_slug),
                Cell::new(reference),
                Cell::new(similarity),
                Cell::new(truncate(&differences, 70)),
            ]);
        }

        table.to_string()
    }

    /// Per-namespace cache counters plus disk index sizes.
    pub fn format_cache_stats(
        &self,
        stats: &CacheStats,
        indexed_blocks: usize,
        indexed_components: usize,
    ) -> String {
        let mut table = self.create_base_table();
        table.set_header(vec![
            header("Namespace"),
            header("In memory"),
            header("On disk"),
            header("Hits"),
            header("Misses"),
            header("Hit rate"),
        ]);

        let rows: [(&str, &NamespaceStats, usize); 2] = [
            ("blocks", &stats.blocks, indexed_blocks),
            ("components", &stats.components, indexed_components),
        ];
        for (name, ns, on_disk) in rows {
            table.add_row(vec![
                Cell::new(name),
                Cell::new(ns.entries),
                Cell::new(on_disk),
                Cell::new(ns.hits),
                Cell::new(ns.misses),
                Cell::new(format!("{:.0}%", ns.hit_rate() * 100.0)),
            ]);
        }

        table.to_string()
    }

    pub fn format_reference_units(&self, units: &[ReferenceUnit]) -> String {
        let mut table = self.create_base_table();
        table.set_header(vec![
            header("Source"),
            header("Slug"),
            header("Fields"),
            header("Features"),
            header("Path"),
        ]);

        for unit in units {
            let mut features = Vec::new();
            if unit.features.has_validation {
                features.push("validate");
            }
            if unit.features.has_access {
                features.push("access");
            }
            if unit.features.has_hooks {
                features.push("hooks");
            }
            if unit.features.has_admin {
                features.push("admin");
            }
            table.add_row(vec![
                Cell::new(&unit.source),
                Cell::new(&unit.slug),
                Cell::new(unit.fields.len()),
                Cell::new(features.join(", ")),
                Cell::new(truncate(&unit.path, 50)),
            ]);
        }

        table.to_string()
    }

    fn severity_cell(&self, severity: Severity) -> Cell {
        if self.use_colors {
            let cell = Cell::new(severity.as_str()).fg(severity_color(severity));
            if severity == Severity::Critical {
                cell.add_attribute(Attribute::Bold)
            } else {
                cell
            }
        } else {
            Cell::new(format!("{} {}", severity_icon(severity), severity.as_str()))
        }
    }

    fn create_base_table(&self) -> Table {
        let mut table = Table::new();

        table
            .load_preset(presets::UTF8_FULL)
            .set_content_arrangement(ContentArrangement::Dynamic);

        if let Some(width) = self.max_width {
            table.set_width(width);
        }

        table
    }
}

impl Default for TableFormatter {
    fn default() -> Self {
        Self::new()
    }
}

fn header(label: &str) -> Cell {
    Cell::new(label).add_attribute(Attribute::Bold)
}

fn supports_color() -> bool {
    // Respect NO_COLOR environment variable
    if env::var_os("NO_COLOR").is_some() {
        return false;
    }

    if let Ok(term) = env::var("TERM") {
        if term == "dumb" {
            return false;
        }
    }

    console::colors_enabled_stderr() || console::colors_enabled()
}

const fn severity_color(severity: Severity) -> Color {
    match severity {
        Severity::Critical => Color::Red,
        Severity::High => Color::DarkRed,
        Severity::Medium => Color::Yellow,
        Severity::Low => Color::Blue,
    }
}

const fn severity_icon(severity: Severity) -> &'static str {
    match severity {
        Severity::Critical => "!!",
        Severity::High => "!",
        Severity::Medium => "~",
        Severity::Low => "-",
    }
}
