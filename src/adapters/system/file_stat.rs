use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::io;
use std::path::Path;

use crate::domain::ports::{FileMetadata, FileStatProvider};

/// Reads metadata from the local filesystem.
#[derive(Debug, Clone, Copy, Default)]
pub struct FsFileStat;

#[async_trait]
impl FileStatProvider for FsFileStat {
    async fn stat(&self, path: &Path) -> io::Result<FileMetadata> {
        let metadata = tokio::fs::metadata(path).await?;
        let modified: DateTime<Utc> = metadata.modified()?.into();
        Ok(FileMetadata {
            modified,
            size: metadata.len(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_stat_existing_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.ts");
        tokio::fs::write(&path, "export const Hero = {}").await.unwrap();

        let meta = FsFileStat.stat(&path).await.unwrap();
        assert_eq!(meta.size, 22);
        assert!(meta.modified <= Utc::now());
    }

    #[tokio::test]
    async fn test_stat_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let err = FsFileStat
            .stat(&dir.path().join("missing.ts"))
            .await
            .unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::NotFound);
    }
}
