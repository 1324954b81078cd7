use async_trait::async_trait;

use crate::domain::errors::FetchError;
use crate::domain::models::{RateLimitWindow, ReferenceSource, RemoteEntry};

/// A remote response body plus the rate-limit state it reported.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiResponse<T> {
    pub body: T,
    pub rate_limit: Option<RateLimitWindow>,
}

impl<T> ApiResponse<T> {
    pub const fn new(body: T, rate_limit: Option<RateLimitWindow>) -> Self {
        Self { body, rate_limit }
    }
}

/// Read-only access to the upstream reference repositories.
#[async_trait]
pub trait ReferenceApi: Send + Sync {
    /// List the entries of `path` inside `source`.
    async fn list_directory(
        &self,
        source: &ReferenceSource,
        path: &str,
    ) -> Result<ApiResponse<Vec<RemoteEntry>>, FetchError>;

    /// Fetch and decode the text content of the file at `path`.
    async fn fetch_file(
        &self,
        source: &ReferenceSource,
        path: &str,
    ) -> Result<ApiResponse<String>, FetchError>;
}
