//! Test skeletons for analyzed blocks.

use std::fmt::Write as _;
use std::path::Path;

use crate::domain::models::{BlockAnalysis, GeneratedTest};

/// One `<slug>.test.ts` per successfully analyzed block.
pub fn generate_tests(blocks: &[BlockAnalysis]) -> Vec<GeneratedTest> {
    blocks
        .iter()
        .filter(|block| !block.is_failed())
        .map(generate_test)
        .collect()
}

pub fn generate_test(block: &BlockAnalysis) -> GeneratedTest {
    let module = import_path(&block.path);
    let mut content = String::new();

    let _ = writeln!(content, "import {{ describe, expect, it }} from 'vitest'");
    let _ = writeln!(content, "import * as mod from '{module}'");
    content.push('\n');
    let _ = writeln!(
        content,
        "const block = Object.values(mod).find((value: any) => value?.slug === '{}') as any",
        escape(&block.slug)
    );
    content.push('\n');
    let _ = writeln!(content, "describe('{} block', () => {{", escape(&block.slug));
    let _ = writeln!(content, "  it('is exported with its slug', () => {{");
    let _ = writeln!(content, "    expect(block).toBeDefined()");
    let _ = writeln!(content, "  }})");

    if !block.fields.is_empty() {
        content.push('\n');
        let _ = writeln!(content, "  const names = (block?.fields ?? []).map((f: any) => f.name)");
    }
    for field in &block.fields {
        content.push('\n');
        let _ = writeln!(content, "  it('declares field {}', () => {{", escape(&field.name));
        let _ = writeln!(content, "    expect(names).toContain('{}')", escape(&field.name));
        let _ = writeln!(content, "  }})");
        if field.required {
            let _ = writeln!(content, "\n  it('marks {} as required', () => {{", escape(&field.name));
            let _ = writeln!(
                content,
                "    const field = block.fields.find((f: any) => f.name === '{}')",
                escape(&field.name)
            );
            let _ = writeln!(content, "    expect(field.required).toBe(true)");
            let _ = writeln!(content, "  }})");
        }
    }
    let _ = writeln!(content, "}})");

    GeneratedTest {
        block_slug: block.slug.clone(),
        file_name: format!("{}.test.ts", block.slug),
        content,
    }
}

/// Relative import for a test placed next to the block file.
fn import_path(path: &Path) -> String {
    let stem = path
        .file_stem()
        .map_or_else(|| "config".to_string(), |s| s.to_string_lossy().into_owned());
    format!("./{stem}")
}

fn escape(text: &str) -> String {
    text.replace('\\', "\\\\").replace('\'', "\\'")
}
