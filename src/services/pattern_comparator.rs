//! Drift between local blocks and upstream reference units.

use tracing::debug;

use crate::domain::models::{
    BlockAnalysis, DifferenceKind, PatternComparison, PatternDifference, ReferenceMatch,
    ReferenceUnit,
};
use crate::services::fuzzy_matcher::find_best_match;

/// Compare every analyzed block against `references`. Failed blocks are skipped.
pub fn compare_blocks(blocks: &[BlockAnalysis], references: &[ReferenceUnit]) -> Vec<PatternComparison> {
    blocks
        .iter()
        .filter(|block| !block.is_failed())
        .map(|block| compare_block(block, references))
        .collect()
}

/// Compare one block against the closest reference unit by slug.
pub fn compare_block(block: &BlockAnalysis, references: &[ReferenceUnit]) -> PatternComparison {
    let Some((reference, similarity)) =
        find_best_match(&block.slug, references, |unit| unit.slug.as_str())
    else {
        debug!(slug = %block.slug, "no reference pattern");
        return PatternComparison {
            block_slug: block.slug.clone(),
            block_path: block.path.clone(),
            reference: None,
            differences: Vec::new(),
        };
    };

    PatternComparison {
        block_slug: block.slug.clone(),
        block_path: block.path.clone(),
        reference: Some(ReferenceMatch {
            source: reference.source.clone(),
            slug: reference.slug.clone(),
            path: reference.path.clone(),
            similarity,
            exact: reference.slug == block.slug,
        }),
        differences: differences(block, reference),
    }
}

fn differences(block: &BlockAnalysis, reference: &ReferenceUnit) -> Vec<PatternDifference> {
    let local = block.features;
    let upstream = reference.features;
    let mut out = Vec::new();

    let feature_checks = [
        (upstream.has_validation && !local.has_validation, DifferenceKind::MissingValidation, "validation"),
        (upstream.has_access && !local.has_access, DifferenceKind::MissingAccess, "access control"),
        (upstream.has_hooks && !local.has_hooks, DifferenceKind::MissingHooks, "hooks"),
        (upstream.has_admin && !local.has_admin, DifferenceKind::MissingAdmin, "admin configuration"),
    ];
    for (missing, kind, label) in feature_checks {
        if missing {
            out.push(PatternDifference {
                kind,
                message: format!("reference '{}' defines {label}, local block does not", reference.slug),
            });
        }
    }

    for field in &reference.fields {
        if !block.field_names().any(|name| name == field) {
            out.push(PatternDifference {
                kind: DifferenceKind::MissingField,
                message: format!("reference field '{field}' is missing"),
            });
        }
    }

    out
}
