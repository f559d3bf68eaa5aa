//! Integration tests for the crawler
//!
//! These tests use wiremock to serve a small archive and run the full crawl
//! cycle end-to-end, from the first listing page to the sorted JSON result.

use async_trait::async_trait;
use kaenguru_crawler::config::{parse_config, CrawlerConfig};
use kaenguru_crawler::crawler::{
    Coordinator, DimensionError, DimensionInspector, ReqwestTransport,
};
use kaenguru_crawler::output::{from_json, to_json};
use kaenguru_crawler::ComicRecord;
use std::sync::Arc;
use std::time::Duration;
use wiremock::matchers::{method, path, path_regex, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

const PAGES: u32 = 9;
const PER_PAGE: u64 = 50;
const TOTAL: usize = (PAGES as u64 * PER_PAGE) as usize;

/// Reports the same size for every image
struct FixedInspector;

#[async_trait]
impl DimensionInspector for FixedInspector {
    async fn inspect(&self, _sample: &[u8]) -> Result<String, DimensionError> {
        Ok("PNG image data, 5613 x 2000, 8-bit/color RGBA; 5613x2000".to_string())
    }
}

/// Ids listed on a page, newest first: page 1 holds the newest comics
fn page_ids(page: u32) -> Vec<u64> {
    let last = (PAGES - page + 1) as u64 * PER_PAGE;
    (last - PER_PAGE + 1..=last).rev().collect()
}

fn listing_page(base: &str, page: u32) -> String {
    let teasers: String = page_ids(page)
        .into_iter()
        .map(|id| {
            format!(
                r#"<article class="zon-teaser-standard">
<figure><img class="zon-teaser-standard__media-item" alt="Folge {id}: Comic {id}" src="{base}/img/{id}/wide__820x461"></figure>
<time class="zon-teaser-standard__datetime" datetime="2022-01-01T05:00:00+01:00">vor 1 Tag</time>
</article>
"#
            )
        })
        .collect();

    let pager: String = (1..=PAGES)
        .map(|p| {
            format!(r#"<li class="pager__page"><a href="{base}/serie/kaenguru?p={p}">{p}</a></li>"#)
        })
        .collect();

    format!(
        r#"<html><body><main>{teasers}</main><ul class="pager__pages">{pager}</ul></body></html>"#
    )
}

/// Mounts every listing page except those in `skip`, plus all images
async fn mount_archive(server: &MockServer, skip: &[u32]) {
    let base = server.uri();

    for page in (1..=PAGES).filter(|p| !skip.contains(p)) {
        Mock::given(method("GET"))
            .and(path("/serie/kaenguru"))
            .and(query_param("p", page.to_string()))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_string(listing_page(&base, page))
                    .insert_header("content-type", "text/html"),
            )
            .mount(server)
            .await;
    }

    Mock::given(method("GET"))
        .and(path_regex(r"^/img/[0-9]+/original__ffffff$"))
        .respond_with(ResponseTemplate::new(206).set_body_bytes(vec![0u8; 64]))
        .mount(server)
        .await;
}

fn test_config(server: &MockServer) -> CrawlerConfig {
    CrawlerConfig {
        base_url: format!("{}/serie/kaenguru", server.uri()),
        timeout_seconds: 5,
        ..CrawlerConfig::default()
    }
}

async fn crawl(config: &CrawlerConfig) -> kaenguru_crawler::Result<Vec<ComicRecord>> {
    let transport = ReqwestTransport::from_config(config)?;
    let coordinator =
        Coordinator::with_components(config, Arc::new(transport), Arc::new(FixedInspector))?;
    coordinator.crawl_all().await
}

fn assert_strictly_ascending(comics: &[ComicRecord]) {
    assert!(
        comics.windows(2).all(|w| w[0].id < w[1].id),
        "ids are not strictly ascending"
    );
}

#[tokio::test]
async fn test_full_crawl_collects_every_page() {
    let server = MockServer::start().await;
    mount_archive(&server, &[]).await;

    let comics = crawl(&test_config(&server)).await.unwrap();

    assert_eq!(comics.len(), TOTAL);
    assert_strictly_ascending(&comics);
    assert_eq!(comics.first().map(|c| c.id), Some(1));
    assert_eq!(comics.last().map(|c| c.id), Some(TOTAL as u64));

    let first = &comics[0];
    assert_eq!(first.title, "Comic 1");
    assert_eq!(first.publication_date, "2022-01-01T05:00:00+01:00");
    assert_eq!(
        first.image.source_url,
        format!("{}/img/1/original__ffffff", server.uri())
    );
    assert_eq!(first.image.width, 5613);
    assert_eq!(first.image.height, 2000);
    assert!((first.image.aspect_ratio - 2.8065).abs() < 1e-9);
}

#[tokio::test]
async fn test_timed_out_page_is_skipped() {
    let server = MockServer::start().await;
    mount_archive(&server, &[4]).await;

    let base = server.uri();
    Mock::given(method("GET"))
        .and(path("/serie/kaenguru"))
        .and(query_param("p", "4"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_string(listing_page(&base, 4))
                .set_delay(Duration::from_secs(10)),
        )
        .mount(&server)
        .await;

    let config = CrawlerConfig {
        timeout_seconds: 2,
        ..test_config(&server)
    };
    let comics = crawl(&config).await.unwrap();

    assert_eq!(comics.len(), TOTAL - PER_PAGE as usize);
    assert_strictly_ascending(&comics);
    for id in page_ids(4) {
        assert!(comics.iter().all(|c| c.id != id));
    }
}

#[tokio::test]
async fn test_failing_page_is_skipped() {
    let server = MockServer::start().await;
    mount_archive(&server, &[6]).await;

    Mock::given(method("GET"))
        .and(path("/serie/kaenguru"))
        .and(query_param("p", "6"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;

    let comics = crawl(&test_config(&server)).await.unwrap();

    assert_eq!(comics.len(), TOTAL - PER_PAGE as usize);
    assert_strictly_ascending(&comics);
}

#[tokio::test]
async fn test_bootstrap_failure_is_fatal() {
    let server = MockServer::start().await;
    mount_archive(&server, &[1]).await;

    Mock::given(method("GET"))
        .and(path("/serie/kaenguru"))
        .and(query_param("p", "1"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;

    let result = crawl(&test_config(&server)).await;
    assert!(result.is_err());
}

#[tokio::test]
async fn test_bootstrap_without_pagination_is_fatal() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/serie/kaenguru"))
        .respond_with(
            ResponseTemplate::new(200).set_body_string("<html><body>Wartungsarbeiten</body></html>"),
        )
        .mount(&server)
        .await;

    let result = crawl(&test_config(&server)).await;
    assert!(result.is_err());
}

#[tokio::test]
async fn test_bounded_worker_pool_gives_same_result() {
    let server = MockServer::start().await;
    mount_archive(&server, &[]).await;

    let config = CrawlerConfig {
        max_concurrent_pages: Some(2),
        ..test_config(&server)
    };
    let bounded = crawl(&config).await.unwrap();
    let unbounded = crawl(&test_config(&server)).await.unwrap();

    assert_eq!(bounded.len(), TOTAL);
    assert_eq!(bounded, unbounded);
}

#[tokio::test]
async fn test_crawl_result_survives_json_round_trip() {
    let server = MockServer::start().await;
    mount_archive(&server, &[]).await;

    let comics = crawl(&test_config(&server)).await.unwrap();
    let json = to_json(&comics).unwrap();

    let value: serde_json::Value = serde_json::from_str(&json).unwrap();
    assert_eq!(value.as_array().map(|a| a.len()), Some(TOTAL));
    assert_eq!(value[0]["img"]["width"], 5613);

    assert_eq!(from_json(&json).unwrap(), comics);
}

#[tokio::test]
async fn test_crawl_with_config_file_values() {
    let server = MockServer::start().await;
    mount_archive(&server, &[]).await;

    let toml = format!(
        r#"
[crawler]
base-url = "{}/serie/kaenguru"
timeout-seconds = 5
max-concurrent-pages = 3
"#,
        server.uri()
    );
    let config = parse_config(&toml).unwrap();

    let comics = crawl(&config.crawler).await.unwrap();
    assert_eq!(comics.len(), TOTAL);
}
