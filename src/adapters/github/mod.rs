//! Upstream reference patterns from GitHub repositories.

pub mod client;
pub mod models;

pub use client::{parse_rate_limit, GitHubContentsClient, GITHUB_API_BASE};
