//! Deterministic clock and file metadata for tests and dry runs.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::collections::HashMap;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, PoisonError};
use std::time::Duration;

use crate::domain::ports::{Clock, FileMetadata, FileStatProvider};

/// Clock that only moves when told to.
///
/// `sleep` records the requested duration, advances the clock by it and
/// yields once, so code under test never waits in real time.
#[derive(Debug)]
pub struct ManualClock {
    now: Mutex<DateTime<Utc>>,
    sleeps: Mutex<Vec<Duration>>,
}

impl ManualClock {
    pub fn new(start: DateTime<Utc>) -> Self {
        Self {
            now: Mutex::new(start),
            sleeps: Mutex::new(Vec::new()),
        }
    }

    pub fn advance(&self, duration: Duration) {
        let delta = chrono::Duration::from_std(duration).unwrap_or(chrono::Duration::MAX);
        let mut now = self.now.lock().unwrap_or_else(PoisonError::into_inner);
        *now += delta;
    }

    pub fn set(&self, time: DateTime<Utc>) {
        *self.now.lock().unwrap_or_else(PoisonError::into_inner) = time;
    }

    /// Every duration passed to `sleep`, in call order.
    pub fn sleeps(&self) -> Vec<Duration> {
        self.sleeps
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

impl Default for ManualClock {
    fn default() -> Self {
        Self::new(Utc::now())
    }
}

#[async_trait]
impl Clock for ManualClock {
    fn now(&self) -> DateTime<Utc> {
        *self.now.lock().unwrap_or_else(PoisonError::into_inner)
    }

    async fn sleep(&self, duration: Duration) {
        self.sleeps
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(duration);
        self.advance(duration);
        tokio::task::yield_now().await;
    }
}

/// In-memory file metadata keyed by path.
#[derive(Debug, Default)]
pub struct MemoryFileStat {
    files: Mutex<HashMap<PathBuf, FileMetadata>>,
}

impl MemoryFileStat {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register or update `path` with the given mtime.
    pub fn touch(&self, path: impl Into<PathBuf>, modified: DateTime<Utc>) {
        self.files
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(
                path.into(),
                FileMetadata {
                    modified,
                    size: 0,
                },
            );
    }

    pub fn remove(&self, path: &Path) {
        self.files
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(path);
    }
}

#[async_trait]
impl FileStatProvider for MemoryFileStat {
    async fn stat(&self, path: &Path) -> io::Result<FileMetadata> {
        self.files
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .get(path)
            .copied()
            .ok_or_else(|| {
                io::Error::new(
                    io::ErrorKind::NotFound,
                    format!("no metadata for {}", path.display()),
                )
            })
    }
}
