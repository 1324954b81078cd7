//! GitHub contents API client.
//!
//! Implements [`ReferenceApi`] over `GET /repos/{owner}/{repo}/contents/{path}`.
//! Every response's `x-ratelimit-*` headers are handed back to the caller so
//! the shared rate limiter can track the window; a 403 or 429 that reports
//! zero remaining requests becomes [`FetchError::RateLimited`].

use async_trait::async_trait;
use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use chrono::{TimeZone, Utc};
use reqwest::header::HeaderMap;
use reqwest::{Client, StatusCode};
use tracing::{debug, instrument};

use crate::domain::errors::FetchError;
use crate::domain::models::{RateLimitWindow, ReferenceConfig, ReferenceSource, RemoteEntry};
use crate::domain::ports::{ApiResponse, ReferenceApi};

use super::models::{GitHubContentFile, GitHubErrorBody};

/// Base URL for the GitHub REST API v3.
pub const GITHUB_API_BASE: &str = "https://api.github.com";

/// HTTP client for the GitHub contents API.
#[derive(Debug, Clone)]
pub struct GitHubContentsClient {
    http: Client,
    base_url: String,
    token: Option<String>,
    user_agent: String,
}

impl GitHubContentsClient {
    pub fn new(base_url: impl Into<String>, token: Option<String>, user_agent: impl Into<String>) -> Self {
        Self {
            http: Client::new(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
            token: token.filter(|t| !t.is_empty()),
            user_agent: user_agent.into(),
        }
    }

    /// Build a client from configuration, taking the token from
    /// `GITHUB_TOKEN` when the configuration has none.
    pub fn from_config(config: &ReferenceConfig) -> Self {
        let token = config
            .token
            .clone()
            .or_else(|| std::env::var("GITHUB_TOKEN").ok());
        Self::new(&config.api_base_url, token, &config.user_agent)
    }

    pub const fn has_token(&self) -> bool {
        self.token.is_some()
    }

    fn contents_url(&self, source: &ReferenceSource, path: &str) -> String {
        format!(
            "{}/repos/{}/{}/contents/{}?ref={}",
            self.base_url,
            source.owner,
            source.repo,
            path.trim_matches('/'),
            source.branch
        )
    }

    /// Issue a GET and return the body text plus the reported window.
    async fn get(&self, url: &str) -> Result<ApiResponse<String>, FetchError> {
        let mut request = self
            .http
            .get(url)
            .header("Accept", "application/vnd.github+json")
            .header("X-GitHub-Api-Version", "2022-11-28")
            .header("User-Agent", &self.user_agent);
        if let Some(token) = &self.token {
            request = request.header("Authorization", format!("Bearer {token}"));
        }

        let response = request.send().await?;
        let status = response.status();
        let rate_limit = parse_rate_limit(response.headers());
        let body = response.text().await?;
        debug!(url, status = status.as_u16(), "reference API response");

        if status.is_success() {
            return Ok(ApiResponse::new(body, rate_limit));
        }

        if matches!(status, StatusCode::FORBIDDEN | StatusCode::TOO_MANY_REQUESTS) {
            if let Some(window) = rate_limit.filter(RateLimitWindow::is_exhausted) {
                return Err(FetchError::RateLimited { window });
            }
        }

        let message = serde_json::from_str::<GitHubErrorBody>(&body)
            .map(|err| err.message)
            .unwrap_or(body);
        Err(FetchError::Http {
            status: status.as_u16(),
            url: url.to_string(),
            message,
        })
    }
}

#[async_trait]
impl ReferenceApi for GitHubContentsClient {
    #[instrument(skip(self, source), fields(repo = %source.repo))]
    async fn list_directory(
        &self,
        source: &ReferenceSource,
        path: &str,
    ) -> Result<ApiResponse<Vec<RemoteEntry>>, FetchError> {
        let response = self.get(&self.contents_url(source, path)).await?;
        let entries: Vec<RemoteEntry> = serde_json::from_str(&response.body)
            .map_err(|e| FetchError::Decode(format!("directory listing for {path}: {e}")))?;
        Ok(ApiResponse::new(entries, response.rate_limit))
    }

    #[instrument(skip(self, source), fields(repo = %source.repo))]
    async fn fetch_file(
        &self,
        source: &ReferenceSource,
        path: &str,
    ) -> Result<ApiResponse<String>, FetchError> {
        let response = self.get(&self.contents_url(source, path)).await?;
        let file: GitHubContentFile = serde_json::from_str(&response.body)
            .map_err(|e| FetchError::Decode(format!("file {path}: {e}")))?;
        let content = decode_content(&file)?;
        Ok(ApiResponse::new(content, response.rate_limit))
    }
}

fn decode_content(file: &GitHubContentFile) -> Result<String, FetchError> {
    let raw = file.content.as_deref().unwrap_or_default();
    match file.encoding.as_deref() {
        Some("base64") => {
            let compact: String = raw.chars().filter(|c| !c.is_whitespace()).collect();
            let bytes = STANDARD
                .decode(compact)
                .map_err(|e| FetchError::Decode(format!("{}: invalid base64: {e}", file.path)))?;
            String::from_utf8(bytes)
                .map_err(|e| FetchError::Decode(format!("{}: not UTF-8: {e}", file.path)))
        }
        Some("") | None if raw.is_empty() => Ok(String::new()),
        other => Err(FetchError::Decode(format!(
            "{}: unsupported encoding {:?} for {}",
            file.path,
            other.unwrap_or("none"),
            file.name
        ))),
    }
}

/// Window from `x-ratelimit-limit`, `-remaining` and `-reset` (epoch seconds).
/// All three must be present and numeric.
pub fn parse_rate_limit(headers: &HeaderMap) -> Option<RateLimitWindow> {
    let number = |name: &str| -> Option<i64> {
        headers
            .get(name)
            .and_then(|value| value.to_str().ok())
            .and_then(|value| value.trim().parse().ok())
    };
    let limit = u32::try_from(number("x-ratelimit-limit")?).ok()?;
    let remaining = u32::try_from(number("x-ratelimit-remaining")?).ok()?;
    let reset_at = Utc.timestamp_opt(number("x-ratelimit-reset")?, 0).single()?;
    Some(RateLimitWindow {
        limit,
        remaining,
        reset_at,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::models::RemoteEntryType;
    use reqwest::header::HeaderValue;

    fn source() -> ReferenceSource {
        ReferenceSource {
            name: "website".to_string(),
            owner: "acme".to_string(),
            repo: "site".to_string(),
            path: "src/blocks".to_string(),
            branch: "main".to_string(),
        }
    }

    #[test]
    fn test_parse_rate_limit() {
        let mut headers = HeaderMap::new();
        headers.insert("x-ratelimit-limit", HeaderValue::from_static("60"));
        headers.insert("x-ratelimit-remaining", HeaderValue::from_static("0"));
        headers.insert("x-ratelimit-reset", HeaderValue::from_static("1767225600"));
        let window = parse_rate_limit(&headers).unwrap();
        assert_eq!(window.limit, 60);
        assert!(window.is_exhausted());
        assert_eq!(window.reset_at.timestamp(), 1_767_225_600);

        headers.remove("x-ratelimit-reset");
        assert!(parse_rate_limit(&headers).is_none());
    }

    #[test]
    fn test_decode_content_with_line_breaks() {
        let file = GitHubContentFile {
            name: "config.ts".to_string(),
            path: "src/blocks/Hero/config.ts".to_string(),
            content: Some("ZXhwb3J0IGNvbnN0\nIEhlcm8gPSB7fQ==\n".to_string()),
            encoding: Some("base64".to_string()),
        };
        assert_eq!(decode_content(&file).unwrap(), "export const Hero = {}");
    }

    #[tokio::test]
    async fn test_list_directory_sends_headers() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("GET", "/repos/acme/site/contents/src/blocks?ref=main")
            .match_header("authorization", "Bearer secret")
            .match_header("user-agent", "blockaudit-test")
            .with_status(200)
            .with_header("x-ratelimit-limit", "5000")
            .with_header("x-ratelimit-remaining", "4999")
            .with_header("x-ratelimit-reset", "1767225600")
            .with_body(
                r#"[{"name":"Hero","path":"src/blocks/Hero","type":"dir","sha":"abc"},
                    {"name":"index.ts","path":"src/blocks/index.ts","type":"file","sha":"def"}]"#,
            )
            .create_async()
            .await;

        let client = GitHubContentsClient::new(
            server.url(),
            Some("secret".to_string()),
            "blockaudit-test",
        );
        let response = client.list_directory(&source(), "src/blocks").await.unwrap();

        mock.assert_async().await;
        assert_eq!(response.body.len(), 2);
        assert_eq!(response.body[0].entry_type, RemoteEntryType::Dir);
        assert_eq!(response.rate_limit.unwrap().remaining, 4_999);
    }

    #[tokio::test]
    async fn test_exhausted_403_is_rate_limited() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("GET", "/repos/acme/site/contents/src/blocks?ref=main")
            .with_status(403)
            .with_header("x-ratelimit-limit", "60")
            .with_header("x-ratelimit-remaining", "0")
            .with_header("x-ratelimit-reset", "1767225600")
            .with_body(r#"{"message":"API rate limit exceeded"}"#)
            .create_async()
            .await;

        let client = GitHubContentsClient::new(server.url(), None, "blockaudit-test");
        let err = client.list_directory(&source(), "src/blocks").await.unwrap_err();
        assert!(matches!(err, FetchError::RateLimited { window } if window.limit == 60));
    }

    #[tokio::test]
    async fn test_not_found_is_http_error() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("GET", "/repos/acme/site/contents/src/blocks/Nope/config.ts?ref=main")
            .with_status(404)
            .with_body(r#"{"message":"Not Found"}"#)
            .create_async()
            .await;

        let client = GitHubContentsClient::new(server.url(), None, "blockaudit-test");
        let err = client
            .fetch_file(&source(), "src/blocks/Nope/config.ts")
            .await
            .unwrap_err();
        match err {
            FetchError::Http { status, message, .. } => {
                assert_eq!(status, 404);
                assert_eq!(message, "Not Found");
            }
            other => panic!("unexpected error: {other}"),
        }
    }
}
