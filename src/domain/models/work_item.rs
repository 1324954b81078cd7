//! Work items produced by discovery.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};

/// Kind of unit a work item points at.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WorkItemKind {
    Block,
    Component,
}

impl WorkItemKind {
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Block => "block",
            Self::Component => "component",
        }
    }

    /// Directory name used for this kind inside the cache root.
    pub const fn cache_namespace(&self) -> &'static str {
        match self {
            Self::Block => "blocks",
            Self::Component => "components",
        }
    }
}

impl fmt::Display for WorkItemKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single file to analyze. Identity is the path.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct WorkItem {
    pub kind: WorkItemKind,
    pub path: PathBuf,
}

impl WorkItem {
    pub fn block(path: impl Into<PathBuf>) -> Self {
        Self {
            kind: WorkItemKind::Block,
            path: path.into(),
        }
    }

    pub fn component(path: impl Into<PathBuf>) -> Self {
        Self {
            kind: WorkItemKind::Component,
            path: path.into(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Path rendered for logs and error records.
    pub fn identity(&self) -> String {
        self.path.display().to_string()
    }
}
