//! Upstream reference units and comparison results.

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::path::PathBuf;

use super::analysis::UnitFeatures;

/// A remote repository directory holding reference block configs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReferenceSource {
    pub name: String,
    pub owner: String,
    pub repo: String,
    pub path: String,
    #[serde(default = "default_branch")]
    pub branch: String,
}

fn default_branch() -> String {
    "main".to_string()
}

impl ReferenceSource {
    /// Filesystem-safe identifier used as the pattern cache key: a readable
    /// prefix plus a SHA-256 prefix of the exact `(owner, repo, branch, path)`.
    pub fn cache_id(&self) -> String {
        let raw = format!("{}-{}-{}-{}", self.owner, self.repo, self.branch, self.path);
        let mut slug = String::with_capacity(raw.len());
        for ch in raw.chars() {
            if ch.is_ascii_alphanumeric() {
                slug.push(ch.to_ascii_lowercase());
            } else if !slug.ends_with('-') {
                slug.push('-');
            }
        }

        let mut hasher = Sha256::new();
        for part in [&self.owner, &self.repo, &self.branch, &self.path] {
            hasher.update(part.as_bytes());
            hasher.update([0u8]);
        }
        let digest = hex::encode(hasher.finalize());
        format!("{}-{}", slug.trim_matches('-'), &digest[..16])
    }
}

/// A block-like configuration fetched from a reference source.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReferenceUnit {
    pub source: String,
    pub slug: String,
    pub path: String,
    pub fields: Vec<String>,
    pub features: UnitFeatures,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub interface_name: Option<String>,
}

/// Entry type in a remote directory listing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RemoteEntryType {
    File,
    Dir,
    #[serde(other)]
    Other,
}

/// One entry of a remote directory listing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RemoteEntry {
    pub name: String,
    pub path: String,
    #[serde(rename = "type")]
    pub entry_type: RemoteEntryType,
}

/// The reference unit a local block was paired with.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReferenceMatch {
    pub source: String,
    pub slug: String,
    pub path: String,
    pub similarity: f64,
    pub exact: bool,
}

/// Category of drift between a local block and its reference.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DifferenceKind {
    MissingValidation,
    MissingAccess,
    MissingHooks,
    MissingAdmin,
    MissingField,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PatternDifference {
    pub kind: DifferenceKind,
    pub message: String,
}

/// Comparison of one local block against the reference set.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PatternComparison {
    pub block_slug: String,
    pub block_path: PathBuf,
    pub reference: Option<ReferenceMatch>,
    pub differences: Vec<PatternDifference>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn source(owner: &str, repo: &str, path: &str) -> ReferenceSource {
        ReferenceSource {
            name: "website".to_string(),
            owner: owner.to_string(),
            repo: repo.to_string(),
            path: path.to_string(),
            branch: "main".to_string(),
        }
    }

    #[test]
    fn test_cache_id_is_readable_and_stable() {
        let source = source("payloadcms", "Payload", "templates/website/src/blocks");
        let id = source.cache_id();
        assert!(id.starts_with("payloadcms-payload-main-templates-website-src-blocks-"));
        assert_eq!(id.rsplit('-').next().map(str::len), Some(16));
        assert_eq!(id, source.cache_id());
    }

    #[test]
    fn test_cache_id_separates_lookalike_sources() {
        let a = source("acme", "site-blocks", "src");
        let b = source("acme-site", "blocks", "src");
        assert_ne!(a.cache_id(), b.cache_id());

        let c = source("acme", "site", "src/blocks");
        let d = source("acme", "site", "src.blocks");
        assert_ne!(c.cache_id(), d.cache_id());
    }

    #[test]
    fn test_remote_entry_deserializes_unknown_type() {
        let json = r#"[{"name":"a","path":"x/a","type":"symlink"},{"name":"b","path":"x/b","type":"dir"}]"#;
        let entries: Vec<RemoteEntry> = serde_json::from_str(json).unwrap();
        assert_eq!(entries[0].entry_type, RemoteEntryType::Other);
        assert_eq!(entries[1].entry_type, RemoteEntryType::Dir);
    }
}
