//! Page pipeline: fetch one listing page and fully extract its comics
//!
//! Dimension probes for the comics of a page run concurrently. Their results
//! are joined back to the record at the same position in the page, so the
//! page's document order is preserved regardless of which probe finishes
//! first.

use crate::comic::{ComicRecord, Dimensions};
use crate::crawler::dimensions::{DimensionInspector, DimensionResolver};
use crate::crawler::fetcher::PageFetcher;
use crate::crawler::parser::{extract, PageExtraction};
use crate::crawler::transport::Transport;
use crate::CrawlError;
use futures::future::join_all;
use std::sync::Arc;

/// Fetcher, extractor and dimension resolver combined
#[derive(Clone)]
pub struct PagePipeline {
    fetcher: PageFetcher,
    resolver: DimensionResolver,
}

impl PagePipeline {
    /// Creates a pipeline sharing one transport between page fetches and
    /// dimension probes
    pub fn new(
        transport: Arc<dyn Transport>,
        inspector: Arc<dyn DimensionInspector>,
        user_agent: impl Into<String>,
    ) -> Self {
        Self {
            fetcher: PageFetcher::new(Arc::clone(&transport), user_agent),
            resolver: DimensionResolver::new(transport, inspector),
        }
    }

    /// Fetches a page, extracts its comics and resolves their dimensions
    ///
    /// # Returns
    ///
    /// * `Ok(PageExtraction)` - Records with dimensions filled in where known
    /// * `Err(CrawlError::Fetch)` - The page could not be fetched
    /// * `Err(CrawlError::Extract)` - The page has no pagination anchors
    pub async fn run(&self, url: &str) -> Result<PageExtraction, CrawlError> {
        tracing::debug!("Fetch {} ...", url);

        let body = self.fetcher.fetch(url).await?;
        let extraction = extract(&body).map_err(|source| CrawlError::Extract {
            url: url.to_string(),
            source,
        })?;

        let records = self.resolve_dimensions(extraction.records).await;

        tracing::debug!("Finished fetching {} ({} comics)", url, records.len());

        Ok(PageExtraction {
            records,
            max_page_index: extraction.max_page_index,
        })
    }

    /// Probes every record's image and attaches the dimensions
    ///
    /// A failed probe leaves the record with zero-valued dimensions.
    async fn resolve_dimensions(&self, records: Vec<ComicRecord>) -> Vec<ComicRecord> {
        let probes = records
            .iter()
            .map(|record| self.resolver.resolve(&record.image.source_url));
        let results = join_all(probes).await;

        records
            .into_iter()
            .zip(results)
            .map(|(record, result)| {
                let dimensions = result.unwrap_or_else(|e| {
                    tracing::warn!(
                        "Could not determine width/height for image URL {}: {}",
                        record.image.source_url,
                        e
                    );
                    Dimensions::default()
                });
                record.with_dimensions(dimensions)
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{CrawlerConfig, DEFAULT_USER_AGENT};
    use crate::crawler::dimensions::DimensionError;
    use crate::crawler::transport::ReqwestTransport;
    use crate::ExtractError;
    use async_trait::async_trait;
    use std::time::Duration;
    use wiremock::matchers::{method, path, path_regex};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    /// Reports the sample's first byte as the image width
    struct FirstByteInspector;

    #[async_trait]
    impl DimensionInspector for FirstByteInspector {
        async fn inspect(&self, sample: &[u8]) -> Result<String, DimensionError> {
            Ok(format!("image data, {}x10", sample.first().copied().unwrap_or(0)))
        }
    }

    fn listing(base: &str, ids: &[u64]) -> String {
        let teasers: String = ids
            .iter()
            .map(|id| {
                format!(
                    r#"<img class="zon-teaser-standard__media-item" alt="Folge {id}: Nummer {id}" src="{base}/img/{id}/wide__300x200"><time datetime="2021-0{m}-01T05:00:00+01:00"></time>"#,
                    m = id % 9 + 1
                )
            })
            .collect();
        format!(
            r#"<main>{teasers}</main><li class="pager__page"><a href="?p=1">1</a></li><li class="pager__page"><a href="?p=2">2</a></li>"#
        )
    }

    fn pipeline() -> PagePipeline {
        let transport = ReqwestTransport::from_config(&CrawlerConfig::default()).unwrap();
        PagePipeline::new(
            Arc::new(transport),
            Arc::new(FirstByteInspector),
            DEFAULT_USER_AGENT,
        )
    }

    #[tokio::test]
    async fn test_run_resolves_dimensions_per_record() {
        let server = MockServer::start().await;
        let base = server.uri();

        Mock::given(method("GET"))
            .and(path("/archive"))
            .respond_with(ResponseTemplate::new(200).set_body_string(listing(&base, &[3, 2, 1])))
            .mount(&server)
            .await;

        // Later records answer first; each image encodes its own id
        for (id, delay_ms) in [(3u8, 150u64), (2, 75), (1, 0)] {
            Mock::given(method("GET"))
                .and(path(format!("/img/{}/original__ffffff", id)))
                .respond_with(
                    ResponseTemplate::new(206)
                        .set_body_bytes(vec![id * 10; 64])
                        .set_delay(Duration::from_millis(delay_ms)),
                )
                .mount(&server)
                .await;
        }

        let extraction = pipeline()
            .run(&format!("{}/archive", base))
            .await
            .unwrap();

        assert_eq!(extraction.max_page_index, 2);
        let got: Vec<(u64, u32)> = extraction
            .records
            .iter()
            .map(|r| (r.id, r.image.width))
            .collect();
        assert_eq!(got, vec![(3, 30), (2, 20), (1, 10)]);
        assert_eq!(extraction.records[0].image.height, 10);
        assert_eq!(extraction.records[0].image.aspect_ratio, 3.0);
    }

    #[tokio::test]
    async fn test_failed_probe_keeps_record() {
        let server = MockServer::start().await;
        let base = server.uri();

        Mock::given(method("GET"))
            .and(path("/archive"))
            .respond_with(ResponseTemplate::new(200).set_body_string(listing(&base, &[7])))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path_regex("^/img/"))
            .respond_with(ResponseTemplate::new(404))
            .mount(&server)
            .await;

        let extraction = pipeline()
            .run(&format!("{}/archive", base))
            .await
            .unwrap();

        assert_eq!(extraction.records.len(), 1);
        let comic = &extraction.records[0];
        assert_eq!(comic.id, 7);
        assert_eq!(
            comic.image.source_url,
            format!("{}/img/7/original__ffffff", base)
        );
        assert_eq!(comic.image.width, 0);
        assert_eq!(comic.image.height, 0);
        assert_eq!(comic.image.aspect_ratio, 0.0);
    }

    #[tokio::test]
    async fn test_page_without_pagination_fails() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_string("<html></html>"))
            .mount(&server)
            .await;

        let result = pipeline().run(&server.uri()).await;
        assert!(matches!(
            result,
            Err(CrawlError::Extract {
                source: ExtractError::NoPagination,
                ..
            })
        ));
    }

    #[tokio::test]
    async fn test_page_fetch_failure() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(503))
            .mount(&server)
            .await;

        let result = pipeline().run(&server.uri()).await;
        assert!(matches!(result, Err(CrawlError::Fetch(_))));
    }
}
