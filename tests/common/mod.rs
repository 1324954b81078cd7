//! Common test utilities for integration tests
//!
//! Shared fixtures: temporary projects with block configs and components,
//! stub analyzers with call counters, and test logging.

#![allow(dead_code)]

use async_trait::async_trait;
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;
use tempfile::TempDir;

use blockaudit::domain::models::{
    derive_component_name, fallback_block_slug, BlockAnalysis, ComponentAnalysis, UnitFeatures,
};
use blockaudit::{AnalyzerError, BlockAnalyzer, ComponentAnalyzer};

/// Create a temporary directory for test isolation
pub fn temp_dir() -> TempDir {
    tempfile::tempdir().expect("Failed to create temp dir")
}

/// Setup test logging
///
/// Call this at the beginning of tests that need logging.
pub fn setup_test_logging() {
    let _ = tracing_subscriber::fmt()
        .with_test_writer()
        .with_max_level(tracing::Level::DEBUG)
        .try_init();
}

/// A well-formed block config for `slug` with required, validated text fields.
pub fn block_source(slug: &str, fields: &[&str]) -> String {
    let fields: Vec<String> = fields
        .iter()
        .map(|name| {
            format!("    {{ name: '{name}', type: 'text', required: true, validate: (v) => !!v }},")
        })
        .collect();
    format!(
        "import type {{ Block }} from 'payload'\n\n\
         export const Block = {{\n  slug: '{slug}',\n  interfaceName: 'Block',\n  \
         access: {{ read: () => true }},\n  admin: {{ group: 'Content' }},\n  fields: [\n{}\n  ],\n}}\n",
        fields.join("\n")
    )
}

/// A component declaring `props` in a `<Name>Props` interface.
pub fn component_source(name: &str, props: &[&str]) -> String {
    let members: Vec<String> = props.iter().map(|p| format!("  {p}?: string")).collect();
    format!(
        "interface {name}Props {{\n{}\n}}\n\nexport function {name}(props: {name}Props) {{\n  return <section />\n}}\n",
        members.join("\n")
    )
}

/// Write `<root>/<dir>/config.ts` and return its path.
pub fn write_block(root: &Path, dir: &str, source: &str) -> PathBuf {
    let path = root.join(dir).join("config.ts");
    std::fs::create_dir_all(path.parent().expect("block dir")).expect("create block dir");
    std::fs::write(&path, source).expect("write block");
    path
}

/// Write `<root>/<dir>/Component.tsx` and return its path.
pub fn write_component(root: &Path, dir: &str, source: &str) -> PathBuf {
    let path = root.join(dir).join("Component.tsx");
    std::fs::create_dir_all(path.parent().expect("component dir")).expect("create component dir");
    std::fs::write(&path, source).expect("write component");
    path
}

/// Block analyzer that counts calls and records peak concurrency.
///
/// Blocks whose directory name is in `failing` return a syntax error.
#[derive(Default)]
pub struct GaugedBlockAnalyzer {
    failing: HashSet<String>,
    delay: Duration,
    calls: AtomicUsize,
    in_flight: AtomicUsize,
    peak: AtomicUsize,
}

impl GaugedBlockAnalyzer {
    pub fn new(delay: Duration) -> Self {
        Self {
            delay,
            ..Self::default()
        }
    }

    #[must_use]
    pub fn failing_on(mut self, dir: &str) -> Self {
        self.failing.insert(dir.to_string());
        self
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn peak(&self) -> usize {
        self.peak.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl BlockAnalyzer for GaugedBlockAnalyzer {
    async fn analyze(&self, path: &Path) -> Result<BlockAnalysis, AnalyzerError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.peak.fetch_max(now, Ordering::SeqCst);

        tokio::time::sleep(self.delay).await;

        self.in_flight.fetch_sub(1, Ordering::SeqCst);

        let dir = path
            .parent()
            .and_then(Path::file_name)
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        if self.failing.contains(&dir) {
            return Err(AnalyzerError::Syntax {
                path: path.to_path_buf(),
                message: "unexpected end of input".to_string(),
            });
        }

        Ok(BlockAnalysis {
            path: path.to_path_buf(),
            slug: fallback_block_slug(path),
            interface_name: None,
            fields: Vec::new(),
            features: UnitFeatures::default(),
            issues: Vec::new(),
        })
    }
}

/// Component analyzer that only derives the component name.
#[derive(Default)]
pub struct CountingComponentAnalyzer {
    calls: AtomicUsize,
}

impl CountingComponentAnalyzer {
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl ComponentAnalyzer for CountingComponentAnalyzer {
    async fn analyze(&self, path: &Path) -> Result<ComponentAnalysis, AnalyzerError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(ComponentAnalysis {
            path: path.to_path_buf(),
            name: derive_component_name(path),
            props: Vec::new(),
            issues: Vec::new(),
        })
    }
}
