//! Domain errors for the blockaudit pipeline.

use std::io;
use std::path::{Path, PathBuf};

use thiserror::Error;

use super::models::{AnalysisErrorKind, RateLimitWindow};

/// Pipeline-level errors surfaced by the orchestrator and its services.
#[derive(Debug, Error)]
pub enum DomainError {
    #[error("Discovery failed for {}: {reason}", .path.display())]
    DiscoveryFailed { path: PathBuf, reason: String },

    #[error("Analysis aborted during {phase} on {item}: {source}")]
    AnalysisAborted {
        phase: String,
        item: String,
        #[source]
        source: AnalyzerError,
    },

    #[error("Reference fetch failed: {0}")]
    FetchFailed(#[from] FetchError),

    #[error("Cache error: {0}")]
    CacheError(String),

    #[error("Serialization error: {0}")]
    SerializationError(String),

    #[error("Validation failed: {0}")]
    ValidationFailed(String),

    #[error("Execution failed: {0}")]
    ExecutionFailed(String),
}

pub type DomainResult<T> = Result<T, DomainError>;

impl From<serde_json::Error> for DomainError {
    fn from(err: serde_json::Error) -> Self {
        DomainError::SerializationError(err.to_string())
    }
}

impl From<tokio::task::JoinError> for DomainError {
    fn from(err: tokio::task::JoinError) -> Self {
        DomainError::ExecutionFailed(format!("background task failed: {err}"))
    }
}

/// Errors raised by analyzer collaborators.
///
/// The variant is chosen where the failure happens, so the error tracker
/// never has to guess severity from message text.
#[derive(Debug, Clone, Error)]
pub enum AnalyzerError {
    #[error("File not found: {}", .0.display())]
    NotFound(PathBuf),

    #[error("Permission denied: {}", .0.display())]
    PermissionDenied(PathBuf),

    #[error("Syntax error in {}: {message}", .path.display())]
    Syntax { path: PathBuf, message: String },

    #[error("I/O error on {}: {message}", .path.display())]
    Io { path: PathBuf, message: String },

    #[error("Analyzer failed: {0}")]
    Failed(String),
}

impl AnalyzerError {
    /// Map an I/O error on `path` to the matching variant.
    pub fn from_io(path: &Path, err: &io::Error) -> Self {
        match err.kind() {
            io::ErrorKind::NotFound => Self::NotFound(path.to_path_buf()),
            io::ErrorKind::PermissionDenied => Self::PermissionDenied(path.to_path_buf()),
            _ => Self::Io {
                path: path.to_path_buf(),
                message: err.to_string(),
            },
        }
    }

    pub const fn kind(&self) -> AnalysisErrorKind {
        match self {
            Self::NotFound(_) => AnalysisErrorKind::NotFound,
            Self::PermissionDenied(_) => AnalysisErrorKind::PermissionDenied,
            Self::Syntax { .. } => AnalysisErrorKind::Syntax,
            Self::Io { .. } => AnalysisErrorKind::Io,
            Self::Failed(_) => AnalysisErrorKind::Analyzer,
        }
    }
}

/// Errors returned by the remote reference API.
#[derive(Debug, Clone, Error)]
pub enum FetchError {
    #[error("Rate limit exhausted, resets at {}", .window.reset_at)]
    RateLimited { window: RateLimitWindow },

    #[error("HTTP {status} from {url}: {message}")]
    Http {
        status: u16,
        url: String,
        message: String,
    },

    #[error("Transport error: {0}")]
    Transport(String),

    #[error("Decode error: {0}")]
    Decode(String),
}

impl From<reqwest::Error> for FetchError {
    fn from(err: reqwest::Error) -> Self {
        FetchError::Transport(err.to_string())
    }
}
