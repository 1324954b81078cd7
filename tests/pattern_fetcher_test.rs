//! Pattern fetching against a mock GitHub contents API.

mod common;

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use chrono::{TimeZone, Utc};
use std::sync::Arc;
use std::time::Duration;

use blockaudit::adapters::github::GitHubContentsClient;
use blockaudit::adapters::system::ManualClock;
use blockaudit::domain::models::ReferenceSource;
use blockaudit::{FetchError, PatternFetcher, RateLimiter, RetryExecutor, RetryPolicy};

fn source(name: &str, repo: &str) -> ReferenceSource {
    ReferenceSource {
        name: name.to_string(),
        owner: "acme".to_string(),
        repo: repo.to_string(),
        path: "src/blocks".to_string(),
        branch: "main".to_string(),
    }
}

fn file_body(path: &str, content: &str) -> String {
    serde_json::json!({
        "name": path.rsplit('/').next().unwrap(),
        "path": path,
        "encoding": "base64",
        "content": STANDARD.encode(content),
    })
    .to_string()
}

fn fetcher(base_url: String, sources: Vec<ReferenceSource>, clock: Arc<ManualClock>) -> PatternFetcher {
    let api = GitHubContentsClient::new(base_url, None, "blockaudit-test");
    let retry = RetryExecutor::new(
        RetryPolicy::new(1, Duration::from_millis(100), Duration::from_secs(1), 2.0),
        clock.clone(),
    );
    PatternFetcher::new(
        Arc::new(api),
        sources,
        retry,
        Arc::new(RateLimiter::new(clock.clone())),
        clock,
    )
}

#[tokio::test]
async fn test_fetch_units_and_skip_failed_source() {
    common::setup_test_logging();
    let mut server = mockito::Server::new_async().await;

    let listing = server
        .mock("GET", "/repos/acme/site/contents/src/blocks?ref=main")
        .with_status(200)
        .with_header("x-ratelimit-limit", "60")
        .with_header("x-ratelimit-remaining", "57")
        .with_header("x-ratelimit-reset", "1767225600")
        .with_body(
            r#"[{"name":"Hero","path":"src/blocks/Hero","type":"dir"},
                {"name":"Banner.ts","path":"src/blocks/Banner.ts","type":"file"},
                {"name":"index.ts","path":"src/blocks/index.ts","type":"file"}]"#,
        )
        .create_async()
        .await;
    let hero_dir = server
        .mock("GET", "/repos/acme/site/contents/src/blocks/Hero?ref=main")
        .with_status(200)
        .with_body(
            r#"[{"name":"Component.tsx","path":"src/blocks/Hero/Component.tsx","type":"file"},
                {"name":"config.ts","path":"src/blocks/Hero/config.ts","type":"file"}]"#,
        )
        .create_async()
        .await;
    let hero_config = server
        .mock("GET", "/repos/acme/site/contents/src/blocks/Hero/config.ts?ref=main")
        .with_status(200)
        .with_body(file_body(
            "src/blocks/Hero/config.ts",
            "export const Hero = {\n  slug: 'hero',\n  access: {},\n  fields: [{ name: 'title', type: 'text' }],\n}\n",
        ))
        .create_async()
        .await;
    let banner = server
        .mock("GET", "/repos/acme/site/contents/src/blocks/Banner.ts?ref=main")
        .with_status(200)
        .with_body(file_body(
            "src/blocks/Banner.ts",
            "export const Banner = { fields: [{ name: 'style', type: 'select' }] }\n",
        ))
        .create_async()
        .await;
    let missing = server
        .mock("GET", "/repos/acme/gone/contents/src/blocks?ref=main")
        .with_status(404)
        .with_body(r#"{"message":"Not Found"}"#)
        .expect(2)
        .create_async()
        .await;

    let clock = Arc::new(ManualClock::new(Utc.with_ymd_and_hms(2026, 1, 1, 0, 0, 0).unwrap()));
    let fetcher = fetcher(
        server.url(),
        vec![source("website", "site"), source("gone", "gone")],
        clock.clone(),
    );

    let report = fetcher.fetch_all().await;

    listing.assert_async().await;
    hero_dir.assert_async().await;
    hero_config.assert_async().await;
    banner.assert_async().await;
    missing.assert_async().await;

    let slugs: Vec<&str> = report.units.iter().map(|u| u.slug.as_str()).collect();
    assert_eq!(slugs, vec!["hero", "banner"]);
    assert_eq!(report.units[0].fields, vec!["title"]);
    assert!(report.units[0].features.has_access);
    assert_eq!(report.units[0].source, "website");
    assert_eq!(report.units[1].path, "src/blocks/Banner.ts");

    assert_eq!(report.failures.len(), 1);
    assert_eq!(report.failures[0].source.name, "gone");
    assert!(matches!(
        report.failures[0].error,
        FetchError::Http { status: 404, .. }
    ));
    assert_eq!(clock.sleeps(), vec![Duration::from_millis(100)]);

    let window = fetcher.rate_limiter().window().await.unwrap();
    assert_eq!(window.limit, 60);
    assert_eq!(window.remaining, 57);
}

#[tokio::test]
async fn test_disk_cache_skips_second_fetch() {
    let mut server = mockito::Server::new_async().await;
    let listing = server
        .mock("GET", "/repos/acme/site/contents/src/blocks?ref=main")
        .with_status(200)
        .with_body(r#"[{"name":"Cta.ts","path":"src/blocks/Cta.ts","type":"file"}]"#)
        .expect(1)
        .create_async()
        .await;
    let cta = server
        .mock("GET", "/repos/acme/site/contents/src/blocks/Cta.ts?ref=main")
        .with_status(200)
        .with_body(file_body(
            "src/blocks/Cta.ts",
            "export const Cta = { slug: 'cta', fields: [] }",
        ))
        .expect(1)
        .create_async()
        .await;

    let cache = common::temp_dir();
    let clock = Arc::new(ManualClock::new(Utc.with_ymd_and_hms(2026, 1, 1, 0, 0, 0).unwrap()));
    let fetcher = fetcher(server.url(), vec![source("website", "site")], clock.clone())
        .with_cache(cache.path(), Duration::from_secs(3_600));

    let first = fetcher.fetch_all().await;
    clock.advance(Duration::from_secs(60));
    let second = fetcher.fetch_all().await;

    listing.assert_async().await;
    cta.assert_async().await;
    assert_eq!(first.units, second.units);
    assert_eq!(second.units[0].slug, "cta");
    assert!(cache
        .path()
        .join(format!("{}.json", source("website", "site").cache_id()))
        .exists());
}
