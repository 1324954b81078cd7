//! Locating block configs and components on disk.

use std::path::{Path, PathBuf};
use tracing::{debug, warn};
use walkdir::WalkDir;

use crate::domain::errors::{DomainError, DomainResult};

/// File names recognized as block configs inside a block directory.
pub const CONFIG_FILENAMES: [&str; 3] = ["config.ts", "config.tsx", "config.js"];

const COMPONENT_EXTENSIONS: [&str; 2] = ["tsx", "jsx"];
const SKIPPED_COMPONENT_MARKERS: [&str; 3] = [".test.", ".spec.", ".stories."];

/// Block configs under `root`: every recognized config file at any depth,
/// plus `*.ts` files directly inside `root` other than `index.ts`.
pub async fn discover_blocks(root: &Path) -> DomainResult<Vec<PathBuf>> {
    let root = root.to_path_buf();
    let found = tokio::task::spawn_blocking(move || walk(&root, is_block_file)).await??;
    debug!(count = found.len(), "discovered block configs");
    Ok(found)
}

/// Components under `root`: `*.tsx` and `*.jsx` files that are not tests,
/// specs, stories or block configs.
pub async fn discover_components(root: &Path) -> DomainResult<Vec<PathBuf>> {
    let root = root.to_path_buf();
    let found = tokio::task::spawn_blocking(move || walk(&root, is_component_file)).await??;
    debug!(count = found.len(), "discovered components");
    Ok(found)
}

fn walk(root: &Path, keep: fn(&Path, &Path) -> bool) -> DomainResult<Vec<PathBuf>> {
    if !root.exists() {
        warn!(root = %root.display(), "discovery root does not exist");
        return Ok(Vec::new());
    }
    if !root.is_dir() {
        return Err(DomainError::DiscoveryFailed {
            path: root.to_path_buf(),
            reason: "not a directory".to_string(),
        });
    }

    let mut found = Vec::new();
    for entry in WalkDir::new(root).follow_links(false) {
        let entry = match entry {
            Ok(entry) => entry,
            Err(err) => {
                warn!(root = %root.display(), error = %err, "skipping unreadable entry");
                continue;
            }
        };
        if entry.file_type().is_file() && keep(root, entry.path()) {
            found.push(entry.into_path());
        }
    }

    found.sort();
    found.dedup();
    Ok(found)
}

fn file_name(path: &Path) -> &str {
    path.file_name().and_then(|n| n.to_str()).unwrap_or_default()
}

fn is_config_file(path: &Path) -> bool {
    CONFIG_FILENAMES.contains(&file_name(path))
}

fn is_block_file(root: &Path, path: &Path) -> bool {
    if is_config_file(path) {
        return true;
    }
    let top_level = path.parent() == Some(root);
    let is_ts = path.extension().and_then(|e| e.to_str()) == Some("ts");
    top_level && is_ts && file_name(path) != "index.ts" && !file_name(path).ends_with(".d.ts")
}

fn is_component_file(_root: &Path, path: &Path) -> bool {
    let Some(ext) = path.extension().and_then(|e| e.to_str()) else {
        return false;
    };
    if !COMPONENT_EXTENSIONS.contains(&ext) || is_config_file(path) {
        return false;
    }
    let name = file_name(path);
    !SKIPPED_COMPONENT_MARKERS
        .iter()
        .any(|marker| name.contains(marker))
}
