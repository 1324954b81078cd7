//! Pairing blocks with the components that render them.

use tracing::debug;

use crate::domain::models::{
    BlockAnalysis, ComponentAnalysis, IntegrationResult, Issue, IssueType, Severity,
};

/// Component identifier expected for a block slug: split on `-`, `_`,
/// whitespace and `.`, capitalize each segment, join.
pub fn expected_component_name(slug: &str) -> String {
    slug.split(|c: char| c == '-' || c == '_' || c == '.' || c.is_whitespace())
        .filter(|segment| !segment.is_empty())
        .map(|segment| {
            let mut chars = segment.chars();
            chars.next().map_or_else(String::new, |first| {
                first.to_uppercase().chain(chars).collect()
            })
        })
        .collect()
}

/// Pair `block` with its component and report block fields the component
/// does not accept. `None` when the block failed or no live component matches.
pub fn validate_block(
    block: &BlockAnalysis,
    components: &[ComponentAnalysis],
) -> Option<IntegrationResult> {
    if block.is_failed() {
        return None;
    }
    let expected = expected_component_name(&block.slug);
    let Some(component) = components
        .iter()
        .filter(|c| !c.is_failed())
        .find(|c| c.name.eq_ignore_ascii_case(&expected))
    else {
        debug!(slug = %block.slug, expected = %expected, "no matching component");
        return None;
    };

    let missing_props: Vec<String> = block
        .field_names()
        .filter(|field| !component.props.iter().any(|prop| prop == field))
        .map(str::to_string)
        .collect();

    let issues = missing_props
        .iter()
        .map(|field| {
            Issue::new(
                IssueType::IntegrationMismatch,
                Severity::High,
                format!(
                    "field '{field}' of block '{}' is not a prop of {}",
                    block.slug, component.name
                ),
            )
            .with_field(field.clone())
        })
        .collect();

    Some(IntegrationResult {
        block_slug: block.slug.clone(),
        block_path: block.path.clone(),
        component_name: component.name.clone(),
        component_path: component.path.clone(),
        missing_props,
        issues,
    })
}
