use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::io;
use std::path::Path;

/// Modification time and size of a source file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FileMetadata {
    pub modified: DateTime<Utc>,
    pub size: u64,
}

/// Reads file metadata used by cache freshness checks.
#[async_trait]
pub trait FileStatProvider: Send + Sync {
    async fn stat(&self, path: &Path) -> io::Result<FileMetadata>;
}
